//! リソース設定ファイル
//!
//! `_config.json` などの JSON 設定を読み込む。すべてのキーは省略可能で、
//! 未知のキーは `extra` に保持して正規化時に書き戻す。

use crate::error::{ModportError, Result};
use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// リソース設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// 主アセットのファイル名
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceConfig {
    /// JSON 文字列からパース
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| ModportError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// ファイルから読み込み
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs.read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// 空でない名前
    pub fn name(&self) -> Option<&str> {
        non_empty(self.name.as_deref())
    }

    /// 空でないパッケージ名
    pub fn package_name(&self) -> Option<&str> {
        non_empty(self.package_name.as_deref())
    }

    /// 正規化した JSON を生成
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
