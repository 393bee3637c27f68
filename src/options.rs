//! インポートオプション
//!
//! 呼び出し側が渡すフラットなキー/値マップ。未知のキーは無視される。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// リソース名を明示指定するオプションキー
pub const OPTION_NAME: &str = "Name";
/// パッケージ名を明示指定するオプションキー
pub const OPTION_PACKAGE_NAME: &str = "PackageName";
/// 取り込み済みファイルを処理済みフォルダへ移動するオプションキー
pub const OPTION_MOVE_TO_FINISHED: &str = "MoveImportedFilesToFinished";

/// インポートオプション
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportOptions(BTreeMap<String, Value>);

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 値を設定（ビルダー形式）
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// 空でない文字列値を取得
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// 真偽値を取得（未設定・非真偽値は false）
    pub fn get_bool(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str(OPTION_NAME)
    }

    pub fn package_name(&self) -> Option<&str> {
        self.get_str(OPTION_PACKAGE_NAME)
    }

    pub fn move_to_finished(&self) -> bool {
        self.get_bool(OPTION_MOVE_TO_FINISHED)
    }

    /// 指定キー以外を除いたコピー
    pub fn without(&self, key: &str) -> Self {
        let mut copy = self.clone();
        copy.0.remove(key);
        copy
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}
