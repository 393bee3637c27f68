//! プラグインの探索
//!
//! `mods/<package>/plugins/` 以下のファイルを決定的な順序で列挙し、
//! 単調増加する優先度を付けてホストのローダーに渡す。

use crate::error::{ModportError, Result};
use crate::fs::FileSystem;
use crate::layout::ModsLayout;
use crate::path_ext::{sort_by_name_then_path, PathExt};
use serde::Serialize;
use std::path::PathBuf;

/// 読み込み候補
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginCandidate {
    pub package: String,
    pub path: PathBuf,
    /// 0 から始まる読み込み順
    pub priority: usize,
}

/// ホスト側のプラグインローダー
pub trait PluginLoader {
    fn load(&self, candidate: &PluginCandidate) -> Result<()>;
}

/// 読み込み結果
#[derive(Debug, Default)]
pub struct PluginReport {
    pub loaded: Vec<PluginCandidate>,
    pub failures: Vec<(PluginCandidate, ModportError)>,
}

/// プラグインファイルを列挙
///
/// パッケージ名 → ファイル名の順にソートし、優先度を 0 から振る。
/// 無視ルールに該当するフォルダ（`__imports` など）とファイルは除外する。
pub fn discover_plugins(layout: &ModsLayout, fs: &dyn FileSystem) -> Result<Vec<PluginCandidate>> {
    if !fs.is_dir(layout.mods_dir()) {
        return Ok(Vec::new());
    }

    let mut packages: Vec<PathBuf> = fs
        .read_dir(layout.mods_dir())?
        .into_iter()
        .filter(|e| e.is_dir() && !e.path.is_ignored())
        .map(|e| e.path)
        .collect();
    packages.sort();

    let mut candidates = Vec::new();
    for package_dir in packages {
        let package = package_dir.file_name_str().to_string();
        let plugins_dir = layout.plugins_dir(&package);
        if !fs.is_dir(&plugins_dir) {
            continue;
        }

        let mut files: Vec<PathBuf> = fs
            .read_dir(&plugins_dir)?
            .into_iter()
            .filter(|e| !e.is_dir() && !e.path.is_ignored())
            .map(|e| e.path)
            .collect();
        sort_by_name_then_path(&mut files);

        for path in files {
            candidates.push(PluginCandidate {
                package: package.clone(),
                path,
                priority: candidates.len(),
            });
        }
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;

    #[test]
    fn test_discover_sorted_by_package_then_file_name() {
        let fs = MockFs::new();
        fs.add_file("/app/mods/Zeta/plugins/a.dll", "");
        fs.add_file("/app/mods/Acme/plugins/b.dll", "");
        fs.add_file("/app/mods/Acme/plugins/a.dll", "");
        fs.add_file("/app/mods/Acme/plugins/.cache", "");
        fs.add_file("/app/mods/__imports/Acme/plugins/x.dll", "");
        fs.add_dir("/app/mods/NoPlugins");

        let found = discover_plugins(&ModsLayout::new("/app"), &fs).unwrap();

        let summary: Vec<(String, String, usize)> = found
            .iter()
            .map(|c| {
                (
                    c.package.clone(),
                    c.path.file_name_str().to_string(),
                    c.priority,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Acme".to_string(), "a.dll".to_string(), 0),
                ("Acme".to_string(), "b.dll".to_string(), 1),
                ("Zeta".to_string(), "a.dll".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_discover_without_mods_folder_is_empty() {
        let fs = MockFs::new();
        assert!(discover_plugins(&ModsLayout::new("/app"), &fs)
            .unwrap()
            .is_empty());
    }
}
