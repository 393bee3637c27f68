//! 汎用アセットポーター
//!
//! 設定ファイル + 主アセット1つを1リソースとして扱う組み込みポーター。

use super::{ArchetypePorter, BuildContext, BuildOutput, Porter};
use crate::config::ResourceConfig;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::path_ext::{PathExt, CONFIG_FILE_NAME};
use crate::resource::BuiltResource;
use crate::types::TypeTag;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 汎用アセットポーター
#[derive(Debug, Clone)]
pub struct AssetPorter {
    base: TypeTag,
    subfolder: String,
}

impl AssetPorter {
    pub fn new(base: TypeTag, subfolder: impl Into<String>) -> Self {
        Self {
            base,
            subfolder: subfolder.into(),
        }
    }

    /// 設定に対応する主アセットを選ぶ
    ///
    /// `file` キーがあればその名前の候補、なければ設定と同じフォルダの先頭候補。
    fn primary_for_config<'a>(
        &self,
        config: &ResourceConfig,
        config_path: &Path,
        candidates: &'a [PathBuf],
    ) -> Option<&'a PathBuf> {
        if let Some(file) = config.file.as_deref() {
            let found = candidates.iter().find(|c| c.file_name_str() == file);
            if found.is_none() {
                warn!(
                    config = %config_path.display(),
                    file,
                    "asset named by config was not offered"
                );
            }
            return found;
        }

        let config_dir = config_path.parent();
        candidates.iter().find(|c| c.parent() == config_dir)
    }
}

impl Porter for AssetPorter {
    fn base_type(&self) -> &TypeTag {
        &self.base
    }
}

impl ArchetypePorter for AssetPorter {
    fn subfolder_name(&self) -> &str {
        &self.subfolder
    }

    fn build_from_config(
        &self,
        ctx: &BuildContext<'_>,
        config: ResourceConfig,
        config_path: &Path,
        candidates: &[PathBuf],
    ) -> Result<BuildOutput> {
        let primary = self
            .primary_for_config(&config, config_path, candidates)
            .cloned();
        let keys = ctx.resolve_keys(self, config_path, Some(&config))?;

        // 単一リソースフォルダでは同じフォルダのファイルをすべて取り込む
        let consumed: Vec<PathBuf> = if ctx.single_resource_folder {
            candidates.to_vec()
        } else {
            primary.iter().cloned().collect()
        };

        let mut sources = vec![config_path.to_path_buf()];
        sources.extend(consumed.iter().cloned());

        debug!(
            key = %keys.resource_key,
            primary = ?primary,
            "built resource from config"
        );

        let resource = BuiltResource::new(ctx.kind.clone(), keys, config, primary, sources);
        Ok(BuildOutput {
            resources: vec![resource],
            consumed,
        })
    }

    fn build_from_loose_assets(
        &self,
        ctx: &BuildContext<'_>,
        candidates: &[PathBuf],
    ) -> Result<BuildOutput> {
        let Some(primary) = candidates.first() else {
            return Ok(BuildOutput::default());
        };

        let keys = ctx.resolve_keys(self, primary, None)?;
        let consumed: Vec<PathBuf> = if ctx.single_resource_folder {
            candidates.to_vec()
        } else {
            vec![primary.clone()]
        };

        debug!(key = %keys.resource_key, "built resource from loose asset");

        let resource = BuiltResource::new(
            ctx.kind.clone(),
            keys,
            ResourceConfig::default(),
            Some(primary.clone()),
            consumed.clone(),
        );
        Ok(BuildOutput {
            resources: vec![resource],
            consumed,
        })
    }

    fn serialize_to_files(
        &self,
        resource: &BuiltResource,
        destination: &Path,
        fs: &dyn FileSystem,
    ) -> Result<Vec<PathBuf>> {
        fs.create_dir_all(destination)?;
        let mut written = Vec::new();

        // 設定ファイル以外のソースをコピー
        for source in resource.sources() {
            if source.is_json() {
                continue;
            }
            let target = destination.join(source.file_name_str());
            if target != *source {
                fs.copy_file(source, &target)?;
            }
            written.push(target);
        }

        let mut config = resource.config().clone();
        config.name = Some(resource.name().to_string());
        config.package_name = Some(resource.package().to_string());
        config.file = resource
            .primary_asset()
            .map(|p| p.file_name_str().to_string());

        let config_path = destination.join(CONFIG_FILE_NAME);
        fs.write(&config_path, config.to_pretty_json()?.as_bytes())?;
        written.push(config_path);

        Ok(written)
    }
}

#[cfg(test)]
#[path = "asset_test.rs"]
mod tests;
