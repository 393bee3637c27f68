//! 構築済みリソース

use crate::config::ResourceConfig;
use crate::key::ResourceKey;
use crate::resolver::ResolvedKeys;
use crate::types::TypeTag;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// リソースの一意な識別番号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// ポーターが構築したリソース
#[derive(Debug, Clone, Serialize)]
pub struct BuiltResource {
    id: ResourceId,
    kind: TypeTag,
    key: ResourceKey,
    name: String,
    package: String,
    folder_path: String,
    config: ResourceConfig,
    primary_asset: Option<PathBuf>,
    sources: Vec<PathBuf>,
}

impl BuiltResource {
    /// 新しい識別番号でリソースを作成
    pub fn new(
        kind: TypeTag,
        keys: ResolvedKeys,
        config: ResourceConfig,
        primary_asset: Option<PathBuf>,
        sources: Vec<PathBuf>,
    ) -> Self {
        Self {
            id: ResourceId::next(),
            kind,
            key: keys.resource_key,
            name: keys.resource_name,
            package: keys.package_name,
            folder_path: keys.folder_path,
            config,
            primary_asset,
            sources,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// 要求された型
    pub fn kind(&self) -> &TypeTag {
        &self.kind
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn folder_path(&self) -> &str {
        &self.folder_path
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn primary_asset(&self) -> Option<&Path> {
        self.primary_asset.as_deref()
    }

    /// 構築に使用したファイル
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}
