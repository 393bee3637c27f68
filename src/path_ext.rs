//! Path 拡張トレイト
//!
//! 標準ライブラリの `Path` にインポート規約（無視ルール・設定ファイル判定）の
//! 便利メソッドを追加する。

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

/// 予約された設定ファイル名
pub const CONFIG_FILE_NAME: &str = "_config.json";

/// Path の拡張トレイト
pub trait PathExt {
    /// ファイル名を文字列で取得（取得できない場合は空文字列）
    fn file_name_str(&self) -> &str;

    /// 拡張子を除いたファイル名を取得（取得できない場合は空文字列）
    fn file_stem_str(&self) -> &str;

    /// インポート対象外の名前かどうか
    ///
    /// - `.` で始まる名前は常に無視
    /// - `_` で始まる名前は `_config.json` 以外無視
    fn is_ignored(&self) -> bool;

    /// JSON ファイルかどうか（拡張子の大文字小文字は区別しない）
    fn is_json(&self) -> bool;

    /// 予約された設定ファイル (`_config.json`) かどうか
    fn is_reserved_config(&self) -> bool;

    /// カレントディレクトリ基準の絶対パスにし、`.` と `..` を字句的に畳む
    ///
    /// シンボリックリンクは解決しない。存在しないパスにも使える。
    fn absolutize(&self) -> PathBuf;
}

impl PathExt for Path {
    fn file_name_str(&self) -> &str {
        self.file_name().and_then(|n| n.to_str()).unwrap_or("")
    }

    fn file_stem_str(&self) -> &str {
        self.file_stem().and_then(|n| n.to_str()).unwrap_or("")
    }

    fn is_ignored(&self) -> bool {
        let name = self.file_name_str();
        if name.starts_with('.') {
            return true;
        }
        name.starts_with('_') && name != CONFIG_FILE_NAME
    }

    fn is_json(&self) -> bool {
        self.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    fn is_reserved_config(&self) -> bool {
        self.file_name_str() == CONFIG_FILE_NAME
    }

    fn absolutize(&self) -> PathBuf {
        let absolute = std::path::absolute(self).unwrap_or_else(|_| self.to_path_buf());
        let mut normalized = PathBuf::new();
        for component in absolute.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other),
            }
        }
        normalized
    }
}

/// ファイル名 → フルパスの順で比較
pub fn cmp_by_name_then_path(a: &Path, b: &Path) -> Ordering {
    a.file_name_str()
        .cmp(b.file_name_str())
        .then_with(|| a.cmp(b))
}

/// ファイル名 → フルパスの順でソート
pub fn sort_by_name_then_path(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| cmp_by_name_then_path(a, b));
}

#[cfg(test)]
#[path = "path_ext_test.rs"]
mod tests;
