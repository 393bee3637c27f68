//! ディスク上のフォルダ規約
//!
//! ```text
//! <data_root>/mods/<package>/<subfolder>/<name...>    公開済みリソース
//! <data_root>/mods/__imports/<package>/<subfolder>/  受け取りフォルダ
//! <data_root>/mods/__processed_imports/<package>/    処理済みインポート
//! <data_root>/mods/<package>/plugins/*               プラグイン
//! <data_root>/data/<folder>/<key>/<name>.data.json   保存済みモデル
//! ```

use crate::path_ext::PathExt;
use std::path::{Path, PathBuf};

/// mods フォルダ名
pub const MODS_FOLDER: &str = "mods";
/// 受け取りフォルダ名
pub const IMPORTS_FOLDER: &str = "__imports";
/// 処理済みインポートフォルダ名
pub const PROCESSED_IMPORTS_FOLDER: &str = "__processed_imports";
/// プラグインフォルダ名
pub const PLUGINS_FOLDER: &str = "plugins";
/// モデルデータフォルダ名
pub const DATA_FOLDER: &str = "data";

/// フォルダ構成
///
/// ルートは絶対パスに正規化して保持する。入力パスとの比較も正規化後に行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModsLayout {
    mods_dir: PathBuf,
    imports_dir: PathBuf,
    processed_dir: PathBuf,
    data_dir: PathBuf,
}

impl ModsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into().absolutize();
        let mods_dir = root.join(MODS_FOLDER);
        Self {
            imports_dir: mods_dir.join(IMPORTS_FOLDER),
            processed_dir: mods_dir.join(PROCESSED_IMPORTS_FOLDER),
            data_dir: root.join(DATA_FOLDER),
            mods_dir,
        }
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    /// 受け取りフォルダ (`mods/__imports`)
    pub fn imports_dir(&self) -> &Path {
        &self.imports_dir
    }

    /// 処理済みフォルダ (`mods/__processed_imports`)
    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// パッケージのフォルダ (`mods/<package>`)
    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.mods_dir.join(package)
    }

    /// パッケージのプラグインフォルダ
    pub fn plugins_dir(&self, package: &str) -> PathBuf {
        self.package_dir(package).join(PLUGINS_FOLDER)
    }

    /// 保護対象フォルダ（削除してはならない）かどうか
    pub fn is_protected(&self, path: &Path) -> bool {
        let path = path.absolutize();
        path == self.imports_dir || path == self.mods_dir
    }

    /// パッケージ判定の境界となるフォルダかどうか
    ///
    /// レイアウト上のパス一致、またはフォルダ名の一致で判定する。
    pub fn is_sentinel(&self, path: &Path) -> bool {
        if self.is_protected(path) {
            return true;
        }
        matches!(
            path.file_name().and_then(|n| n.to_str()),
            Some(IMPORTS_FOLDER) | Some(MODS_FOLDER)
        )
    }
}
