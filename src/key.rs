//! リソースキー
//!
//! パッケージ修飾されたリソースの識別子。
//!
//! ## ワイヤ形式
//!
//! - `<package>::<name>` - パッケージ修飾
//! - `<name>` - パッケージなし
//!
//! `::` は区切り文字として予約されており、パッケージ名・リソース名の
//! どちらにも含めることはできない。

use crate::error::{ModportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// パッケージ区切り文字
pub const SEPARATOR: &str = "::";

/// パッケージ修飾されたリソースキー
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey {
    package: Option<String>,
    name: String,
}

impl ResourceKey {
    /// パッケージ修飾キーを作成
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let package = package.into();
        let name = name.into();
        validate_part(&package)?;
        validate_part(&name)?;
        if package.is_empty() {
            return Err(ModportError::MalformedKey(format!("{}{}", SEPARATOR, name)));
        }
        if name.is_empty() {
            return Err(ModportError::MalformedKey(format!("{}{}", package, SEPARATOR)));
        }
        Ok(Self {
            package: Some(package),
            name,
        })
    }

    /// パッケージなしのキーを作成
    pub fn unqualified(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_part(&name)?;
        if name.is_empty() {
            return Err(ModportError::MalformedKey(name));
        }
        Ok(Self {
            package: None,
            name,
        })
    }

    /// ワイヤ形式からパース
    ///
    /// 区切り文字が2つ以上ある場合は `MalformedKey`。
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(SEPARATOR).collect();
        match parts.as_slice() {
            [name] => Self::unqualified(*name),
            [package, name] => Self::new(*package, *name),
            _ => Err(ModportError::MalformedKey(input.to_string())),
        }
    }

    /// パッケージ名
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// リソース名
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(package) => write!(f, "{}{}{}", package, SEPARATOR, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = ModportError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.to_string()
    }
}

/// 名前の一部として使用できるか検証
pub fn validate_part(part: &str) -> Result<()> {
    if part.contains(SEPARATOR) {
        return Err(ModportError::MalformedKey(part.to_string()));
    }
    Ok(())
}

/// パッケージキーまたはリソースキーからパッケージキー部分を取り出す
///
/// 区切り文字を含まない場合は入力全体がパッケージキー。
pub fn package_part(key: &str) -> &str {
    key.split_once(SEPARATOR)
        .map(|(package, _)| package)
        .unwrap_or(key)
}

/// `/` 区切りのリソース名から末尾セグメントを取得
pub fn leaf_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
#[path = "key_test.rs"]
mod tests;

#[cfg(test)]
#[path = "key_proptests.rs"]
mod proptests;
