//! リソースキーの解決
//!
//! 明示オプション・設定ファイル・フォルダ位置からパッケージ修飾された
//! リソースの識別子を決定する。
//!
//! ## リソース名の優先順位
//!
//! 1. オプション `Name`
//! 2. 設定の `name`
//! 3. 単体ファイル → ファイル名（拡張子なし）
//! 4. 単一リソースフォルダ → ポーターのサブフォルダからファイルのフォルダまでの相対パス
//!
//! ## パッケージ名の優先順位
//!
//! 1. オプション `PackageName`
//! 2. 設定の `packageName`
//! 3. 親が境界フォルダ（受け取りフォルダ / mods フォルダ）である祖先の名前
//! 4. `"<user>'s Custom Assets"`

use crate::config::ResourceConfig;
use crate::error::{ModportError, Result};
use crate::key::{self, ResourceKey};
use crate::layout::ModsLayout;
use crate::options::ImportOptions;
use crate::path_ext::PathExt;
use std::path::Path;
use tracing::debug;

/// リソース名として予約されている名前
pub const RESERVED_NAME: &str = "_config";

/// 解決済みの識別子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKeys {
    /// リソース名（`/` 区切りの末尾セグメント）
    pub resource_name: String,
    pub package_name: String,
    /// `package::resource_name`
    pub resource_key: ResourceKey,
    /// フォルダ位置から導出した完全な名前（`Blades/Sword` など）
    pub folder_path: String,
}

/// リソースキーリゾルバ
#[derive(Debug, Clone)]
pub struct KeyResolver {
    layout: ModsLayout,
    user_name: String,
}

impl KeyResolver {
    pub fn new(layout: ModsLayout, user_name: impl Into<String>) -> Self {
        Self {
            layout,
            user_name: user_name.into(),
        }
    }

    /// 既定のパッケージ名
    pub fn default_package_name(&self) -> String {
        format!("{}'s Custom Assets", self.user_name)
    }

    /// 識別子を解決
    pub fn resolve(
        &self,
        primary_file: &Path,
        single_resource_folder: bool,
        options: &ImportOptions,
        config: Option<&ResourceConfig>,
        subfolder: &str,
    ) -> Result<ResolvedKeys> {
        let full_name = options
            .name()
            .or_else(|| config.and_then(ResourceConfig::name))
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| derive_name(primary_file, single_resource_folder, subfolder));

        if full_name.is_empty() {
            return Err(ModportError::MissingName(primary_file.to_path_buf()));
        }

        let resource_name = key::leaf_name(&full_name).to_string();
        if resource_name == RESERVED_NAME {
            return Err(ModportError::ReservedName(resource_name));
        }

        let package_name = options
            .package_name()
            .or_else(|| config.and_then(ResourceConfig::package_name))
            .map(|p| p.trim().to_string())
            .or_else(|| self.package_from_location(primary_file, subfolder))
            .unwrap_or_else(|| self.default_package_name());

        key::validate_part(&full_name)?;
        let resource_key = ResourceKey::new(package_name.clone(), resource_name.clone())?;

        debug!(
            file = %primary_file.display(),
            key = %resource_key,
            "resolved resource key"
        );

        Ok(ResolvedKeys {
            resource_name,
            package_name,
            resource_key,
            folder_path: full_name,
        })
    }

    /// フォルダ位置からパッケージ名を導出
    ///
    /// 親が境界フォルダである祖先がパッケージフォルダ。ファイル自身や
    /// ポーターのサブフォルダがその位置にある場合はパッケージなし。
    fn package_from_location(&self, primary_file: &Path, subfolder: &str) -> Option<String> {
        let mut current = primary_file;
        while let Some(parent) = current.parent() {
            if self.layout.is_sentinel(parent) {
                if current == primary_file {
                    return None;
                }
                let name = current.file_name_str();
                if name.is_empty() || name == subfolder {
                    return None;
                }
                return Some(name.to_string());
            }
            current = parent;
        }
        None
    }
}

/// ファイル位置からリソース名を導出
fn derive_name(primary_file: &Path, single_resource_folder: bool, subfolder: &str) -> String {
    let stem = primary_file.file_stem_str().trim().to_string();
    if !single_resource_folder {
        return stem;
    }

    // ファイルのフォルダからサブフォルダまで遡る
    let mut segments = Vec::new();
    let mut current = primary_file.parent();
    while let Some(folder) = current {
        let name = folder.file_name_str();
        if name == subfolder {
            segments.reverse();
            let joined = segments.join("/");
            let trimmed = joined.trim_matches('/').trim();
            return if trimmed.is_empty() {
                stem
            } else {
                trimmed.to_string()
            };
        }
        if name.is_empty() {
            break;
        }
        segments.push(name.to_string());
        current = folder.parent();
    }

    // サブフォルダが見つからない場合はファイル名
    stem
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
