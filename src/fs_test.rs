use super::mock::MockFs;
use super::*;
use tempfile::TempDir;

#[test]
fn test_mock_fs_file_operations() {
    let fs = MockFs::new();

    // ファイル追加（親ディレクトリも登録される）
    fs.add_file("/mods/a/test.txt", "hello");
    assert!(fs.exists(Path::new("/mods/a/test.txt")));
    assert!(fs.is_dir(Path::new("/mods/a")));
    assert!(fs.is_dir(Path::new("/mods")));

    // 内容読み込み
    let content = fs.read_to_string(Path::new("/mods/a/test.txt")).unwrap();
    assert_eq!(content, "hello");

    // 移動
    fs.rename(Path::new("/mods/a/test.txt"), Path::new("/mods/b.txt"))
        .unwrap();
    assert!(!fs.exists(Path::new("/mods/a/test.txt")));
    assert!(fs.exists(Path::new("/mods/b.txt")));
}

#[test]
fn test_mock_fs_read_dir_lists_direct_children_only() {
    let fs = MockFs::new();
    fs.add_file("/root/a.png", "");
    fs.add_file("/root/sub/b.png", "");

    let mut names: Vec<String> = fs
        .read_dir(Path::new("/root"))
        .unwrap()
        .into_iter()
        .map(|e| e.path.to_string_lossy().to_string())
        .collect();
    names.sort();

    assert_eq!(names, vec!["/root/a.png", "/root/sub"]);
}

#[test]
fn test_mock_fs_remove_empty_dir_rejects_non_empty() {
    let fs = MockFs::new();
    fs.add_file("/root/sub/b.png", "");

    assert!(fs.remove_empty_dir(Path::new("/root/sub")).is_err());

    fs.remove_file(Path::new("/root/sub/b.png")).unwrap();
    fs.remove_empty_dir(Path::new("/root/sub")).unwrap();
    assert!(!fs.exists(Path::new("/root/sub")));
}

#[test]
fn test_real_fs_write_creates_parents() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("dir").join("file.json");

    RealFs.write(&path, b"{}").unwrap();

    assert_eq!(RealFs.read_to_string(&path).unwrap(), "{}");
}

#[test]
fn test_real_fs_remove_empty_dir() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("empty");
    std::fs::create_dir(&dir).unwrap();
    std::fs::write(temp_dir.path().join("keep.txt"), "x").unwrap();

    RealFs.remove_empty_dir(&dir).unwrap();
    assert!(!dir.exists());

    // 中身のあるディレクトリは削除できない
    assert!(RealFs.remove_empty_dir(temp_dir.path()).is_err());
}

#[test]
fn test_real_fs_copy_dir_into_itself_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("src");
    std::fs::create_dir_all(src.join("inner")).unwrap();

    assert!(RealFs.copy_dir(&src, &src.join("inner")).is_err());
}

#[cfg(unix)]
#[test]
fn test_real_fs_read_dir_follows_symlinked_folder() {
    let temp_dir = TempDir::new().unwrap();
    let real = temp_dir.path().join("real");
    std::fs::create_dir_all(&real).unwrap();
    let root = temp_dir.path().join("root");
    std::fs::create_dir_all(&root).unwrap();
    std::os::unix::fs::symlink(&real, root.join("linked")).unwrap();
    std::os::unix::fs::symlink(temp_dir.path().join("gone"), root.join("broken")).unwrap();

    let mut entries = RealFs.read_dir(&root).unwrap();
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    assert_eq!(entries[0].file_type, FsFileType::Symlink);
    assert_eq!(entries[1].file_type, FsFileType::Dir);
}
