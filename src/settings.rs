//! modport.toml の読み込み
//!
//! ```toml
//! data_root = "."
//! user_name = "meep"
//!
//! [[types]]
//! name = "Sword"
//! parent = "Weapon"
//!
//! [[porters]]
//! kind = "Weapon"
//! subfolder = "Weapons"
//!
//! [[models]]
//! kind = "Character"
//! folder = "characters"
//! ```

use crate::env::EnvVar;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::layout::ModsLayout;
use crate::porter::{AssetPorter, ModelPorter};
use crate::session::ModSession;
use crate::types::TypeTag;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// 既定の設定ファイル名
pub const DEFAULT_SETTINGS_FILE: &str = "modport.toml";
/// 設定ファイルのパスを指定する環境変数
pub const SETTINGS_ENV: &str = "MODPORT_CONFIG";

/// 型宣言
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

/// アセットポーターの登録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PorterDecl {
    pub kind: String,
    pub subfolder: String,
}

/// モデルポーターの登録
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDecl {
    pub kind: String,
    pub folder: String,
}

/// modport 設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub porters: Vec<PorterDecl>,
    #[serde(default)]
    pub models: Vec<ModelDecl>,
}

fn default_data_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            user_name: None,
            types: Vec::new(),
            porters: Vec::new(),
            models: Vec::new(),
        }
    }
}

impl Settings {
    /// 設定を読み込み
    ///
    /// パスは引数 > `$MODPORT_CONFIG` > `./modport.toml` の順。
    /// ファイルがなければ既定値。相対の `data_root` は設定ファイルの
    /// フォルダを基準にする。
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = explicit_path
            .map(PathBuf::from)
            .or_else(|| EnvVar::get(SETTINGS_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));

        if !path.exists() {
            debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        let mut settings = Self::parse(&raw)?;
        if settings.data_root.is_relative() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                settings.data_root = dir.join(&settings.data_root);
            }
        }
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// ユーザー名（未設定なら環境変数から）
    pub fn user_name(&self) -> String {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(EnvVar::current_user_name)
    }

    pub fn layout(&self) -> ModsLayout {
        ModsLayout::new(&self.data_root)
    }

    /// 型を宣言し、ポーターを登録したセッションを作成
    pub fn build_session(&self, fs: Arc<dyn FileSystem>) -> Result<ModSession> {
        let layout = self.layout();
        let data_dir = layout.data_dir().to_path_buf();
        let session = ModSession::new(layout, self.user_name(), Arc::clone(&fs));

        for decl in &self.types {
            session.declare_type(
                TypeTag::new(decl.name.as_str()),
                decl.parent.as_deref().map(TypeTag::new),
            )?;
        }
        for decl in &self.porters {
            session.register_archetype_porter(Arc::new(AssetPorter::new(
                TypeTag::new(decl.kind.as_str()),
                decl.subfolder.as_str(),
            )));
        }
        for decl in &self.models {
            session.register_model_porter(Arc::new(ModelPorter::new(
                TypeTag::new(decl.kind.as_str()),
                decl.folder.as_str(),
                data_dir.clone(),
                Arc::clone(&fs),
            )));
        }
        Ok(session)
    }
}
