//! Mod パッケージ
//!
//! パッケージごとに、構築済みリソースを (基底型, リソースキー) で索引する。
//! 同じリソースを同じ位置に二度登録することはできない。空になったキーや
//! 型のバケットは削除する。

mod plugin;
mod registry;

pub use plugin::{discover_plugins, PluginCandidate, PluginLoader, PluginReport};
pub use registry::ModPackageRegistry;

use crate::error::{ModportError, Result};
use crate::key::ResourceKey;
use crate::resource::{BuiltResource, ResourceId};
use crate::types::TypeTag;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 削除操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveResult {
    Removed,
    NotFound,
}

type KeySlot = BTreeMap<ResourceId, Arc<BuiltResource>>;
type TypeBucket = BTreeMap<ResourceKey, KeySlot>;

/// Mod パッケージ
#[derive(Debug, Clone)]
pub struct ModPackage {
    key: String,
    buckets: BTreeMap<TypeTag, TypeBucket>,
    plugins: Vec<PathBuf>,
}

impl ModPackage {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            buckets: BTreeMap::new(),
            plugins: Vec::new(),
        }
    }

    /// パッケージキー
    pub fn key(&self) -> &str {
        &self.key
    }

    /// リソースを追加
    ///
    /// 同じ (型, キー) に同じリソースがすでにある場合は `Duplicate`。
    /// 別のリソースは同じキーの下に蓄積される。
    pub fn add(
        &mut self,
        base_type: TypeTag,
        key: ResourceKey,
        resource: Arc<BuiltResource>,
    ) -> Result<()> {
        let slot = self
            .buckets
            .entry(base_type)
            .or_default()
            .entry(key.clone())
            .or_default();

        if slot.contains_key(&resource.id()) {
            return Err(ModportError::Duplicate {
                package: self.key.clone(),
                key: key.to_string(),
            });
        }
        slot.insert(resource.id(), resource);
        Ok(())
    }

    /// リソースを削除
    ///
    /// 指定したリソースのみを削除し、空になったキーと型のバケットを片付ける。
    pub fn remove(&mut self, resource: &BuiltResource) -> RemoveResult {
        let mut result = RemoveResult::NotFound;

        for bucket in self.buckets.values_mut() {
            if let Some(slot) = bucket.get_mut(resource.key()) {
                if slot.remove(&resource.id()).is_some() {
                    result = RemoveResult::Removed;
                }
                if slot.is_empty() {
                    bucket.remove(resource.key());
                }
            }
        }
        self.buckets.retain(|_, bucket| !bucket.is_empty());

        result
    }

    /// 型とキーでリソースを取得（ない場合は `ResourceNotFound`）
    pub fn get(&self, base_type: &TypeTag, key: &ResourceKey) -> Result<Vec<Arc<BuiltResource>>> {
        let found = self.try_get(base_type, key);
        if found.is_empty() {
            return Err(ModportError::ResourceNotFound {
                kind: base_type.to_string(),
                key: key.to_string(),
            });
        }
        Ok(found)
    }

    /// 型とキーでリソースを取得
    pub fn try_get(&self, base_type: &TypeTag, key: &ResourceKey) -> Vec<Arc<BuiltResource>> {
        self.buckets
            .get(base_type)
            .and_then(|bucket| bucket.get(key))
            .map(|slot| slot.values().cloned().collect())
            .unwrap_or_default()
    }

    /// すべての型からキーでリソースを取得（ない場合は `ResourceNotFound`）
    pub fn get_any(&self, key: &ResourceKey) -> Result<Vec<Arc<BuiltResource>>> {
        let found = self.try_get_any(key);
        if found.is_empty() {
            return Err(ModportError::ResourceNotFound {
                kind: "*".to_string(),
                key: key.to_string(),
            });
        }
        Ok(found)
    }

    /// すべての型からキーでリソースを取得
    pub fn try_get_any(&self, key: &ResourceKey) -> Vec<Arc<BuiltResource>> {
        self.buckets
            .values()
            .filter_map(|bucket| bucket.get(key))
            .flat_map(|slot| slot.values().cloned())
            .collect()
    }

    /// すべてのリソース（型 → キー → 登録順）
    pub fn resources(&self) -> Vec<(&TypeTag, Arc<BuiltResource>)> {
        self.buckets
            .iter()
            .flat_map(|(tag, bucket)| {
                bucket
                    .values()
                    .flat_map(move |slot| slot.values().map(move |r| (tag, Arc::clone(r))))
            })
            .collect()
    }

    /// リソース数
    pub fn len(&self) -> usize {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.values())
            .map(|slot| slot.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// 読み込まれたプラグインファイル
    pub fn plugins(&self) -> &[PathBuf] {
        &self.plugins
    }

    pub(crate) fn record_plugin(&mut self, path: &Path) {
        if !self.plugins.iter().any(|p| p == path) {
            self.plugins.push(path.to_path_buf());
        }
    }
}

#[cfg(test)]
#[path = "package_test.rs"]
mod tests;
