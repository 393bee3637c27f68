//! 入力の分類
//!
//! 入力パスを設定ファイル・アセット・ディレクトリの3つの互いに素なプールに
//! 振り分ける。無視ルールに該当する名前はどのプールにも入らない。
//! 存在しないパスはどのプールにも入れず `missing` に残す。

use crate::fs::FileSystem;
use crate::path_ext::{sort_by_name_then_path, PathExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 分類済みのプール
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pools {
    pub configs: Vec<PathBuf>,
    pub assets: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
    /// 存在しない入力
    pub missing: Vec<PathBuf>,
}

impl Pools {
    /// すべてのプールからパスを取り除く
    pub fn remove(&mut self, path: &Path) {
        self.configs.retain(|p| p != path);
        self.assets.retain(|p| p != path);
        self.directories.retain(|p| p != path);
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty() && self.assets.is_empty() && self.directories.is_empty()
    }
}

/// 入力を分類
///
/// - `.json`（大文字小文字を区別しない）は設定ファイル
/// - ディレクトリ以外のその他はアセット
/// - 各プールはファイル名 → フルパスの順でソートし、重複を除く
pub fn classify(inputs: &[PathBuf], fs: &dyn FileSystem) -> Pools {
    let mut seen = HashSet::new();
    let mut pools = Pools::default();

    for input in inputs {
        if input.is_ignored() || !seen.insert(input.clone()) {
            continue;
        }
        if !fs.exists(input) {
            pools.missing.push(input.clone());
        } else if fs.is_dir(input) {
            pools.directories.push(input.clone());
        } else if input.is_json() {
            pools.configs.push(input.clone());
        } else {
            pools.assets.push(input.clone());
        }
    }

    sort_by_name_then_path(&mut pools.configs);
    sort_by_name_then_path(&mut pools.assets);
    sort_by_name_then_path(&mut pools.directories);
    sort_by_name_then_path(&mut pools.missing);
    pools
}

/// 設定ファイルに提示する候補を並べる
///
/// 設定と同じフォルダのアセットを先頭に、それ以外を後ろに並べる。
/// どちらのグループもファイル名 → フルパスの順。
pub fn order_candidates(config_path: &Path, assets: &[PathBuf]) -> Vec<PathBuf> {
    let config_dir = config_path.parent();
    let (mut same_dir, mut others): (Vec<PathBuf>, Vec<PathBuf>) = assets
        .iter()
        .cloned()
        .partition(|a| a.parent() == config_dir);

    sort_by_name_then_path(&mut same_dir);
    sort_by_name_then_path(&mut others);
    same_dir.extend(others);
    same_dir
}
