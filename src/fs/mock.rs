//! テスト用モックファイルシステム

use super::*;
use std::collections::HashMap;
use std::sync::RwLock;

/// テスト用モックファイルシステム
pub struct MockFs {
    files: RwLock<HashMap<String, MockFile>>,
}

struct MockFile {
    content: Vec<u8>,
    mtime: SystemTime,
    file_type: FsFileType,
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

fn not_found() -> ModportError {
    ModportError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "not found",
    ))
}

impl MockFs {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
        }
    }

    /// ファイルを追加（親ディレクトリも登録）
    pub fn add_file(&self, path: &str, content: &str) {
        if let Some(parent) = Path::new(path).parent() {
            self.add_dir_all(parent);
        }
        self.files.write().unwrap().insert(
            path.to_string(),
            MockFile {
                content: content.as_bytes().to_vec(),
                mtime: SystemTime::now(),
                file_type: FsFileType::File,
            },
        );
    }

    /// ディレクトリを追加
    pub fn add_dir(&self, path: &str) {
        self.files
            .write()
            .unwrap()
            .entry(path.to_string())
            .or_insert_with(|| MockFile {
                content: Vec::new(),
                mtime: SystemTime::now(),
                file_type: FsFileType::Dir,
            });
    }

    fn add_dir_all(&self, path: &Path) {
        for ancestor in path.ancestors() {
            let s = key(ancestor);
            if s.is_empty() || s == "/" {
                continue;
            }
            self.add_dir(&s);
        }
    }

    /// 登録済みファイル（ディレクトリ以外）の一覧（ソート済み）
    pub fn file_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .files
            .read()
            .unwrap()
            .iter()
            .filter(|(_, f)| f.file_type == FsFileType::File)
            .map(|(k, _)| k.clone())
            .collect();
        paths.sort();
        paths
    }

    fn has_children(&self, path: &Path) -> bool {
        let prefix = format!("{}/", key(path).trim_end_matches('/'));
        self.files
            .read()
            .unwrap()
            .keys()
            .any(|k| k.starts_with(&prefix))
    }
}

impl Default for MockFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFs {
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        let content = {
            let files = self.files.read().unwrap();
            files.get(&key(src)).ok_or_else(not_found)?.content.clone()
        };

        if let Some(parent) = dst.parent() {
            self.add_dir_all(parent);
        }
        self.files.write().unwrap().insert(
            key(dst),
            MockFile {
                content,
                mtime: SystemTime::now(),
                file_type: FsFileType::File,
            },
        );
        Ok(())
    }

    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<()> {
        let src_str = key(src);
        let dst_str = key(dst);

        // 同一/子孫パスチェック
        if dst_str.starts_with(&src_str) {
            return Err(ModportError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Cannot copy directory into itself or its subdirectory",
            )));
        }

        let prefix = format!("{}/", src_str);
        let entries_to_copy: Vec<_> = {
            let files = self.files.read().unwrap();
            files
                .iter()
                .filter(|(path, _)| path.starts_with(&prefix))
                .map(|(path, file)| {
                    let relative = &path[src_str.len()..];
                    (
                        format!("{}{}", dst_str, relative),
                        file.content.clone(),
                        file.file_type,
                    )
                })
                .collect()
        };

        self.add_dir_all(dst);
        let mut files = self.files.write().unwrap();
        for (new_path, content, file_type) in entries_to_copy {
            files.insert(
                new_path,
                MockFile {
                    content,
                    mtime: SystemTime::now(),
                    file_type,
                },
            );
        }

        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let path_str = key(path);
        let prefix = format!("{}/", path_str);
        let mut files = self.files.write().unwrap();

        // パス自身と配下のエントリを削除（再帰削除）
        files.retain(|k, _| *k != path_str && !k.starts_with(&prefix));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let path_str = key(path);
        let mut files = self.files.write().unwrap();

        if let Some(file) = files.get(&path_str) {
            if file.file_type == FsFileType::Dir {
                return Err(ModportError::Io(std::io::Error::new(
                    std::io::ErrorKind::IsADirectory,
                    "Cannot remove directory with remove_file",
                )));
            }
        }

        files.remove(&path_str);
        Ok(())
    }

    fn remove_empty_dir(&self, path: &Path) -> Result<()> {
        if self.has_children(path) {
            return Err(ModportError::Io(std::io::Error::new(
                std::io::ErrorKind::DirectoryNotEmpty,
                "Directory not empty",
            )));
        }
        self.files.write().unwrap().remove(&key(path));
        Ok(())
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<()> {
        let mut files = self.files.write().unwrap();
        let file = files.remove(&key(src)).ok_or_else(not_found)?;
        files.insert(key(dst), file);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(&key(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .read()
            .unwrap()
            .get(&key(path))
            .map(|f| f.file_type == FsFileType::Dir)
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir_all(path);
        Ok(())
    }

    fn mtime(&self, path: &Path) -> Result<SystemTime> {
        self.files
            .read()
            .unwrap()
            .get(&key(path))
            .map(|f| f.mtime)
            .ok_or_else(not_found)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .read()
            .unwrap()
            .get(&key(path))
            .map(|f| String::from_utf8_lossy(&f.content).to_string())
            .ok_or_else(not_found)
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            self.add_dir_all(parent);
        }
        self.files.write().unwrap().insert(
            key(path),
            MockFile {
                content: content.to_vec(),
                mtime: SystemTime::now(),
                file_type: FsFileType::File,
            },
        );
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<FsDirEntry>> {
        let path_str = key(path);
        let files = self.files.read().unwrap();

        // パスがディレクトリとして存在するかチェック
        match files.get(&path_str) {
            Some(file) if file.file_type != FsFileType::Dir => {
                return Err(ModportError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotADirectory,
                    "Not a directory",
                )));
            }
            None => return Err(not_found()),
            _ => {}
        }

        let prefix = if path_str.ends_with('/') {
            path_str.clone()
        } else {
            format!("{}/", path_str)
        };

        let entries: Vec<_> = files
            .iter()
            .filter(|(k, _)| {
                if !k.starts_with(&prefix) {
                    return false;
                }
                // 直接の子のみ（サブディレクトリの中身は除外）
                let remainder = &k[prefix.len()..];
                !remainder.is_empty() && !remainder.contains('/')
            })
            .map(|(k, v)| FsDirEntry {
                path: PathBuf::from(k),
                file_type: v.file_type,
            })
            .collect();

        Ok(entries)
    }
}
