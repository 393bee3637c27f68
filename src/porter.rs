//! ポーター（種類別のインポーター）
//!
//! ポーターは1つの基底型を担当し、その型の設定ファイルやアセットから
//! リソースを構築する。登録は `PorterRegistry` で行い、より具体的な
//! ポーターが登録されていない派生型も基底型のポーターが担当する。
//!
//! ## 種類
//!
//! - `ArchetypePorter` - 設定 + アセットからリソースを構築する trait
//! - `AssetPorter` - 組み込みの汎用アーキタイプポーター
//! - `ModelPorter` - `data/` 以下に JSON モデルを保存・読み込みする

mod asset;
mod model;
mod registry;

pub use asset::AssetPorter;
pub use model::{AutoPortFields, FieldShape, ModelMetadata, ModelPorter, PortableModel};
pub use registry::{PorterRegistry, RegisterResult};

use crate::config::ResourceConfig;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::key::ResourceKey;
use crate::layout::ModsLayout;
use crate::options::{ImportOptions, OPTION_MOVE_TO_FINISHED, OPTION_NAME, OPTION_PACKAGE_NAME};
use crate::resolver::{KeyResolver, ResolvedKeys};
use crate::resource::BuiltResource;
use crate::types::TypeTag;
use std::path::{Path, PathBuf};

/// 設定キー: リソース名
pub const CONFIG_KEY_NAME: &str = "name";
/// 設定キー: パッケージ名
pub const CONFIG_KEY_PACKAGE_NAME: &str = "packageName";
/// 設定キー: 説明
pub const CONFIG_KEY_DESCRIPTION: &str = "description";
/// 設定キー: タグ
pub const CONFIG_KEY_TAGS: &str = "tags";

const BASE_OPTION_KEYS: &[&str] = &[OPTION_NAME, OPTION_PACKAGE_NAME, OPTION_MOVE_TO_FINISHED];
const BASE_CONFIG_KEYS: &[&str] = &[
    CONFIG_KEY_NAME,
    CONFIG_KEY_PACKAGE_NAME,
    CONFIG_KEY_DESCRIPTION,
    CONFIG_KEY_TAGS,
];

/// すべてのポーターに共通する性質
pub trait Porter: Send + Sync {
    /// 担当する基底型
    fn base_type(&self) -> &TypeTag;
}

/// 構築時に渡されるコンテキスト
pub struct BuildContext<'a> {
    /// 要求された型
    pub kind: &'a TypeTag,
    pub options: &'a ImportOptions,
    pub resolver: &'a KeyResolver,
    pub fs: &'a dyn FileSystem,
    /// 候補が単一リソースフォルダから来たか
    pub single_resource_folder: bool,
}

impl BuildContext<'_> {
    /// ポーターのサブフォルダを基準に識別子を解決
    pub fn resolve_keys(
        &self,
        porter: &dyn ArchetypePorter,
        primary_file: &Path,
        config: Option<&ResourceConfig>,
    ) -> Result<ResolvedKeys> {
        self.resolver.resolve(
            primary_file,
            self.single_resource_folder,
            self.options,
            config,
            porter.subfolder_name(),
        )
    }
}

/// 構築結果
#[derive(Debug, Default)]
pub struct BuildOutput {
    pub resources: Vec<BuiltResource>,
    /// 取り込んだファイル（設定ファイル自体はパイプラインが追加する）
    pub consumed: Vec<PathBuf>,
}

/// 設定 + アセットからリソースを構築するポーター
pub trait ArchetypePorter: Porter {
    /// mods フォルダ内でこの種類が置かれるサブフォルダ名
    fn subfolder_name(&self) -> &str;

    /// 解釈するオプションキー
    fn valid_option_keys(&self) -> &[&str] {
        BASE_OPTION_KEYS
    }

    /// 解釈する設定キー
    fn valid_config_keys(&self) -> &[&str] {
        BASE_CONFIG_KEYS
    }

    /// 設定ファイルと候補アセットから構築
    ///
    /// 候補は同じフォルダのアセットが先頭に並ぶ。省略可能なキーがなくても
    /// 失敗してはならない。
    fn build_from_config(
        &self,
        ctx: &BuildContext<'_>,
        config: ResourceConfig,
        config_path: &Path,
        candidates: &[PathBuf],
    ) -> Result<BuildOutput>;

    /// 設定ファイルのないアセットから構築
    fn build_from_loose_assets(
        &self,
        ctx: &BuildContext<'_>,
        candidates: &[PathBuf],
    ) -> Result<BuildOutput>;

    /// リソースをフォルダへ書き出し、書き出したファイルを返す
    fn serialize_to_files(
        &self,
        resource: &BuiltResource,
        destination: &Path,
        fs: &dyn FileSystem,
    ) -> Result<Vec<PathBuf>>;

    /// キーに対応する mods フォルダ内の場所
    ///
    /// `mods/<package>/<subfolder>/<name>`。パッケージ名・リソース名の `.` は
    /// フォルダ区切りとして扱う。
    fn locate_folder(&self, layout: &ModsLayout, key: &ResourceKey) -> PathBuf {
        let name = key.name().replace('.', "/");
        match key.package() {
            Some(package) => layout
                .mods_dir()
                .join(package.replace('.', "/"))
                .join(self.subfolder_name())
                .join(name),
            None => layout.mods_dir().join(self.subfolder_name()).join(name),
        }
    }
}

#[cfg(test)]
#[path = "porter_test.rs"]
mod tests;
