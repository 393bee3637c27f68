//! Mod パッケージレジストリ
//!
//! パッケージキーでパッケージを管理する。変更は `&mut self` 経由のみで、
//! 書き込みは常に1か所から行われる。

use super::{ModPackage, RemoveResult};
use crate::error::{ModportError, Result};
use crate::key;
use crate::resource::BuiltResource;
use crate::types::TypeTag;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Mod パッケージレジストリ
#[derive(Debug, Default)]
pub struct ModPackageRegistry {
    packages: BTreeMap<String, ModPackage>,
}

impl ModPackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// パッケージを取得（ない場合は `PackageNotFound`）
    ///
    /// パッケージキーとリソースキー (`package::name`) のどちらも受け付ける。
    pub fn package(&self, key: &str) -> Result<&ModPackage> {
        self.try_package(key)
            .ok_or_else(|| ModportError::PackageNotFound(key::package_part(key).to_string()))
    }

    /// パッケージを取得
    pub fn try_package(&self, key: &str) -> Option<&ModPackage> {
        self.packages.get(key::package_part(key))
    }

    /// パッケージ一覧（キー順）
    pub fn packages(&self) -> impl Iterator<Item = &ModPackage> {
        self.packages.values()
    }

    /// リソースを各パッケージに追加
    ///
    /// パッケージは初回使用時に作成する。重複があればそこで中断する。
    pub fn add_resources(
        &mut self,
        base_type: &TypeTag,
        resources: impl IntoIterator<Item = Arc<BuiltResource>>,
    ) -> Result<usize> {
        let mut added = 0;
        for resource in resources {
            let package = self
                .packages
                .entry(resource.package().to_string())
                .or_insert_with(|| ModPackage::new(resource.package()));
            package.add(base_type.clone(), resource.key().clone(), Arc::clone(&resource))?;
            debug!(package = %resource.package(), key = %resource.key(), "added resource");
            added += 1;
        }
        Ok(added)
    }

    /// ホストからのアンロード通知
    pub fn on_unload(&mut self, resource: &BuiltResource) -> RemoveResult {
        match self.packages.get_mut(resource.package()) {
            Some(package) => package.remove(resource),
            None => RemoveResult::NotFound,
        }
    }

    /// 読み込んだプラグインを記録
    pub fn record_plugin(&mut self, package: &str, path: &Path) {
        self.packages
            .entry(package.to_string())
            .or_insert_with(|| ModPackage::new(package))
            .record_plugin(path);
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
