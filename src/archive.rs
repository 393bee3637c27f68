//! 処理済みインポートのアーカイブ
//!
//! インポート後に、構築したリソースを mods フォルダへ書き出し、
//! 取り込んだ元ファイルを `__processed_imports/<package>/` へ移動する。
//! 移動で空になった受け取りフォルダ内のディレクトリは上へ向かって削除するが、
//! 受け取りフォルダ自体と mods フォルダは決して削除しない。
//!
//! 途中で失敗した場合はそこで停止し、移動済みのファイルはそのまま残す。
//! 既存のファイルは上書きしない。移動先が埋まっていれば ` (2)` のような
//! 番号を付け、同じバッチで書き出し先のフォルダが重なれば何も書かずに停止する。

use crate::error::{ModportError, Result};
use crate::fs::FileSystem;
use crate::layout::ModsLayout;
use crate::path_ext::PathExt;
use crate::pipeline::ConsumedFile;
use crate::porter::ArchetypePorter;
use crate::resource::BuiltResource;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// アーカイブ結果
#[derive(Debug, Default)]
pub struct ArchiveReport {
    /// 書き出したファイル
    pub serialized: Vec<PathBuf>,
    /// 移動したファイル (元, 先)
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// 削除した空ディレクトリ
    pub pruned: Vec<PathBuf>,
    /// アーカイブを停止させたエラー
    pub failure: Option<ModportError>,
}

impl ArchiveReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// 処理済みインポートのアーカイバ
pub struct FinishedImportArchiver<'a> {
    layout: &'a ModsLayout,
    fs: &'a dyn FileSystem,
}

impl<'a> FinishedImportArchiver<'a> {
    pub fn new(layout: &'a ModsLayout, fs: &'a dyn FileSystem) -> Self {
        Self { layout, fs }
    }

    /// 書き出し → 移動 → 空ディレクトリ削除
    pub fn archive(
        &self,
        porter: &dyn ArchetypePorter,
        resources: &[BuiltResource],
        consumed: &[ConsumedFile],
    ) -> ArchiveReport {
        let mut report = ArchiveReport::default();
        if let Err(error) = self.run(porter, resources, consumed, &mut report) {
            warn!(%error, moved = report.moved.len(), "archive stopped");
            report.failure = Some(error);
        } else {
            info!(
                serialized = report.serialized.len(),
                moved = report.moved.len(),
                pruned = report.pruned.len(),
                "archived finished imports"
            );
        }
        report
    }

    fn run(
        &self,
        porter: &dyn ArchetypePorter,
        resources: &[BuiltResource],
        consumed: &[ConsumedFile],
        report: &mut ArchiveReport,
    ) -> Result<()> {
        let mut folders: HashMap<PathBuf, &BuiltResource> = HashMap::new();
        for resource in resources {
            let folder = porter.locate_folder(self.layout, resource.key());
            if let Some(first) = folders.insert(folder, resource) {
                return Err(ModportError::Duplicate {
                    package: first.package().to_string(),
                    key: first.key().to_string(),
                });
            }
        }

        for resource in resources {
            let folder = porter.locate_folder(self.layout, resource.key());
            debug!(key = %resource.key(), folder = %folder.display(), "serializing resource");
            let written = porter.serialize_to_files(resource, &folder, self.fs)?;
            report.serialized.extend(written);
        }

        for file in consumed {
            let destination = self.free_destination(self.processed_destination(file));
            if let Some(parent) = destination.parent() {
                self.fs.create_dir_all(parent)?;
            }
            self.fs.rename(&file.path, &destination)?;
            debug!(
                from = %file.path.display(),
                to = %destination.display(),
                "moved imported file"
            );
            report.moved.push((file.path.clone(), destination));

            if let Some(parent) = file.path.parent() {
                self.prune_upward(parent, report)?;
            }
        }
        Ok(())
    }

    /// 移動先
    ///
    /// 受け取りフォルダ内のファイルは `__imports/<package>/` からの相対パスを
    /// 維持し、それ以外はファイル名のみ。
    pub fn processed_destination(&self, file: &ConsumedFile) -> PathBuf {
        let package_root = self.layout.processed_dir().join(&file.package);
        let inbox_package = self.layout.imports_dir().join(&file.package);

        match file.path.absolutize().strip_prefix(&inbox_package) {
            Ok(relative) if !relative.as_os_str().is_empty() => package_root.join(relative),
            _ => package_root.join(file.path.file_name_str()),
        }
    }

    /// 既存のファイルと重ならない移動先
    ///
    /// `a.png` が埋まっていれば `a (2).png`、`a (3).png` ... を試す。
    fn free_destination(&self, destination: PathBuf) -> PathBuf {
        if !self.fs.exists(&destination) {
            return destination;
        }

        let stem = destination.file_stem_str().to_string();
        let extension = destination
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let mut n = 2;
        loop {
            let candidate = destination.with_file_name(format!("{stem} ({n}){extension}"));
            if !self.fs.exists(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// 受け取りフォルダ内で空になったディレクトリを上へ向かって削除
    fn prune_upward(&self, start: &Path, report: &mut ArchiveReport) -> Result<()> {
        let inbox = self.layout.imports_dir();
        let start = start.absolutize();
        let mut current = start.as_path();

        while current.starts_with(inbox) && current != inbox {
            if !self.fs.is_dir(current) || !self.fs.read_dir(current)?.is_empty() {
                break;
            }
            self.remove_empty_dir(current)?;
            report.pruned.push(current.to_path_buf());

            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Ok(())
    }

    /// 空ディレクトリを削除
    ///
    /// 受け取りフォルダと mods フォルダは `UnsafeDeletion` で拒否する。
    pub fn remove_empty_dir(&self, path: &Path) -> Result<()> {
        if self.layout.is_protected(path) {
            return Err(ModportError::UnsafeDeletion(path.to_path_buf()));
        }
        self.fs.remove_empty_dir(path)
    }
}

#[cfg(test)]
#[path = "archive_test.rs"]
mod tests;
