//! ファイルシステム抽象化
//!
//! インポートパイプライン・アーカイバ・ポーターが使用するファイル操作の抽象化レイヤー。
//! テスト時に MockFs を注入してファイル操作をモック化できる。

use crate::error::{ModportError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// ファイル種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsFileType {
    File,
    Dir,
    Symlink,
}

/// ファイルシステム抽象化のための独自 DirEntry
#[derive(Debug, Clone)]
pub struct FsDirEntry {
    pub path: PathBuf,
    pub file_type: FsFileType,
}

impl FsDirEntry {
    /// ディレクトリかどうか
    pub fn is_dir(&self) -> bool {
        self.file_type == FsFileType::Dir
    }

    /// ファイルかどうか
    pub fn is_file(&self) -> bool {
        self.file_type == FsFileType::File
    }
}

/// ファイルシステム操作を抽象化するトレイト
///
/// テスト時に MockFs を注入してファイル操作をモック化できる。
/// 本番コードでは RealFs を使用する。
pub trait FileSystem: Send + Sync {
    /// ファイルをコピー
    ///
    /// - 宛先が存在すれば上書き
    /// - 親ディレクトリは自動作成
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// ディレクトリを再帰的にコピー
    ///
    /// - 宛先ディレクトリにマージ（既存ファイルは上書き）
    /// - 同一/子孫パスへのコピーは Err
    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<()>;

    /// ファイルまたはディレクトリを削除
    ///
    /// - ファイルなら削除、ディレクトリなら再帰削除
    /// - 存在しない場合は Ok(())
    fn remove(&self, path: &Path) -> Result<()>;

    /// ファイルのみを削除
    ///
    /// - 存在しない場合は Ok(())
    /// - ディレクトリの場合は Err
    fn remove_file(&self, path: &Path) -> Result<()>;

    /// 空ディレクトリを削除
    ///
    /// - 中身がある場合は Err
    fn remove_empty_dir(&self, path: &Path) -> Result<()>;

    /// ファイルを移動（リネーム）
    ///
    /// - 宛先の親ディレクトリは呼び出し側で作成する
    fn rename(&self, src: &Path, dst: &Path) -> Result<()>;

    /// パスが存在するか（シンボリックリンク追従）
    fn exists(&self, path: &Path) -> bool;

    /// ディレクトリかどうか（シンボリックリンク追従）
    fn is_dir(&self, path: &Path) -> bool;

    /// ディレクトリを再帰的に作成
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// 最終更新時刻を取得
    fn mtime(&self, path: &Path) -> Result<SystemTime>;

    /// ファイル内容を読み込み
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// ファイルに書き込み
    ///
    /// - 親ディレクトリは自動作成
    /// - 既存ファイルは上書き
    fn write(&self, path: &Path, content: &[u8]) -> Result<()>;

    /// ディレクトリ内のエントリを取得
    ///
    /// - 順序は未定義（呼び出し側でソートする）
    /// - 引数がディレクトリでない場合は Err
    fn read_dir(&self, path: &Path) -> Result<Vec<FsDirEntry>>;
}

/// 本番用ファイルシステム実装
///
/// シンボリックリンクは参照先の種別として扱う（リンクした Mod フォルダも
/// 通常のフォルダとして取り込まれる）。
pub struct RealFs;

fn invalid_input(message: &str) -> ModportError {
    ModportError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidInput,
        message.to_string(),
    ))
}

impl FileSystem for RealFs {
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, dst)?;
        Ok(())
    }

    fn copy_dir(&self, src: &Path, dst: &Path) -> Result<()> {
        let src_real = src.canonicalize()?;
        let dst_real = dst.canonicalize().unwrap_or_else(|_| dst.to_path_buf());
        if dst_real.starts_with(&src_real) {
            return Err(invalid_input(
                "Cannot copy directory into itself or its subdirectory",
            ));
        }

        self.create_dir_all(dst)?;
        for entry in self.read_dir(src)? {
            let target = dst.join(entry.path.file_name().unwrap_or_default());
            match entry.file_type {
                FsFileType::Dir => self.copy_dir(&entry.path, &target)?,
                FsFileType::File => self.copy_file(&entry.path, &target)?,
                // リンク切れはコピーしない
                FsFileType::Symlink => {}
            }
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match std::fs::symlink_metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
            Ok(meta) if meta.is_dir() => Ok(std::fs::remove_dir_all(path)?),
            Ok(_) => Ok(std::fs::remove_file(path)?),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        match std::fs::symlink_metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
            Ok(meta) if meta.is_dir() => Err(ModportError::Io(std::io::Error::new(
                std::io::ErrorKind::IsADirectory,
                "Cannot remove directory with remove_file",
            ))),
            Ok(_) => Ok(std::fs::remove_file(path)?),
        }
    }

    fn remove_empty_dir(&self, path: &Path) -> Result<()> {
        Ok(std::fs::remove_dir(path)?)
    }

    fn rename(&self, src: &Path, dst: &Path) -> Result<()> {
        Ok(std::fs::rename(src, dst)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        Ok(std::fs::create_dir_all(path)?)
    }

    fn mtime(&self, path: &Path) -> Result<SystemTime> {
        Ok(std::fs::metadata(path)?.modified()?)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn write(&self, path: &Path, content: &[u8]) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent)?;

        let mut temp = NamedTempFile::new_in(parent)?;
        temp.write_all(content)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| ModportError::Io(e.error))?;
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<FsDirEntry>> {
        std::fs::read_dir(path)?
            .map(|entry| {
                let path = entry?.path();
                let file_type = match std::fs::metadata(&path) {
                    Ok(meta) if meta.is_dir() => FsFileType::Dir,
                    Ok(_) => FsFileType::File,
                    Err(_) => FsFileType::Symlink,
                };
                Ok(FsDirEntry { path, file_type })
            })
            .collect()
    }
}

#[cfg(test)]
pub mod mock;

#[cfg(test)]
#[path = "fs_test.rs"]
mod tests;
