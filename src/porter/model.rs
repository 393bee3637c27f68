//! モデルポーター
//!
//! モデルを `data/<folder>/<key>/<name>.data.json` に保存・読み込みする。
//! 宣言された自動ポートフィールドは、読み込み時に文字列キーを参照先モデルの
//! データに置き換える。

use super::{Porter, PorterRegistry};
use crate::error::{ModportError, Result};
use crate::fs::FileSystem;
use crate::path_ext::PathExt;
use crate::types::TypeTag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// 主データファイルの拡張子
pub const MAIN_DATA_FILE_EXTENSION: &str = ".data.json";

/// 保存・読み込み対象のモデル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortableModel {
    /// 保存フォルダ名になるキー
    pub key: String,
    /// 主データファイル名（拡張子なし）
    pub name: String,
    pub data: Value,
}

impl PortableModel {
    pub fn new(key: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            data,
        }
    }
}

/// ファイルを開かずに得られるモデルのメタデータ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelMetadata {
    pub name: String,
    pub folder: PathBuf,
    pub key: String,
    pub last_updated: DateTime<Utc>,
}

impl ModelMetadata {
    /// 主データファイルの場所
    pub fn main_data_file(&self) -> PathBuf {
        self.folder
            .join(format!("{}{}", self.name, MAIN_DATA_FILE_EXTENSION))
    }
}

/// 自動ポートフィールドの形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// キー1つ
    Single,
    /// キーの配列
    List,
    /// キーのマップ。`preserve_keys` が false の場合は参照先のキーで索引し直す
    Map { preserve_keys: bool },
}

/// 自動ポートフィールドの宣言
#[derive(Debug, Clone, Default)]
pub struct AutoPortFields(BTreeMap<String, (TypeTag, FieldShape)>);

impl AutoPortFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, kind: TypeTag, shape: FieldShape) -> Self {
        self.0.insert(field.into(), (kind, shape));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &(TypeTag, FieldShape))> {
        self.0.iter()
    }
}

/// モデルポーター
pub struct ModelPorter {
    base: TypeTag,
    folder_name: String,
    data_dir: PathBuf,
    auto_port: AutoPortFields,
    fs: Arc<dyn FileSystem>,
}

impl Porter for ModelPorter {
    fn base_type(&self) -> &TypeTag {
        &self.base
    }
}

impl ModelPorter {
    pub fn new(
        base: TypeTag,
        folder_name: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            base,
            folder_name: folder_name.into(),
            data_dir: data_dir.into(),
            auto_port: AutoPortFields::new(),
            fs,
        }
    }

    /// 自動ポートフィールドを設定
    pub fn with_auto_port(mut self, fields: AutoPortFields) -> Self {
        self.auto_port = fields;
        self
    }

    /// この型のモデルの保存先ルート
    pub fn save_root(&self) -> PathBuf {
        self.data_dir.join(&self.folder_name)
    }

    /// モデルの保存先フォルダ
    pub fn save_folder(&self, key: &str) -> PathBuf {
        self.save_root().join(key)
    }

    /// モデルを保存
    ///
    /// 保存先フォルダ直下のファイル（無視ルール対象外）を削除してから書き込む。
    /// サブフォルダはそのまま残す。
    pub fn save(&self, model: &PortableModel) -> Result<ModelMetadata> {
        let folder = self.save_folder(&model.key);

        if self.fs.is_dir(&folder) {
            for entry in self.fs.read_dir(&folder)? {
                if entry.is_file() && !entry.path.is_ignored() {
                    self.fs.remove_file(&entry.path)?;
                }
            }
        } else {
            self.fs.create_dir_all(&folder)?;
        }

        let metadata = ModelMetadata {
            name: model.name.clone(),
            folder,
            key: model.key.clone(),
            last_updated: Utc::now(),
        };

        let content = serde_json::to_string_pretty(&model.data)?;
        self.fs.write(&metadata.main_data_file(), content.as_bytes())?;
        debug!(kind = %self.base, key = %model.key, "saved model");

        Ok(metadata)
    }

    /// キーでモデルを読み込み（存在しない場合は `ModelNotFound`）
    pub fn load_by_key(
        &self,
        registry: &PorterRegistry<ModelPorter>,
        key: &str,
    ) -> Result<PortableModel> {
        self.try_load_by_key(registry, key)?
            .ok_or_else(|| ModportError::ModelNotFound(format!("{} ({})", key, self.base)))
    }

    /// キーでモデルを読み込み
    ///
    /// 保存フォルダやデータファイルがない場合は `None`。
    pub fn try_load_by_key(
        &self,
        registry: &PorterRegistry<ModelPorter>,
        key: &str,
    ) -> Result<Option<PortableModel>> {
        let mut stack = Vec::new();
        self.load_with_stack(registry, key, &mut stack)
    }

    fn load_with_stack(
        &self,
        registry: &PorterRegistry<ModelPorter>,
        key: &str,
        stack: &mut Vec<(TypeTag, String)>,
    ) -> Result<Option<PortableModel>> {
        let folder = self.save_folder(key);
        let Some(data_file) = self.main_data_file_in(&folder)? else {
            return Ok(None);
        };

        let content = self.fs.read_to_string(&data_file)?;
        let mut data: Value =
            serde_json::from_str(&content).map_err(|e| ModportError::InvalidConfig {
                path: data_file.clone(),
                message: e.to_string(),
            })?;

        stack.push((self.base.clone(), key.to_string()));
        let resolved = self.resolve_auto_port_fields(registry, &mut data, stack);
        stack.pop();
        resolved?;

        Ok(Some(PortableModel {
            key: key.to_string(),
            name: main_data_name(&data_file),
            data,
        }))
    }

    /// 保存済みのすべてのモデルのメタデータ（キー順）
    pub fn metadata_for_all(&self) -> Result<Vec<ModelMetadata>> {
        let root = self.save_root();
        if !self.fs.is_dir(&root) {
            return Ok(Vec::new());
        }

        let mut folders: Vec<PathBuf> = self
            .fs
            .read_dir(&root)?
            .into_iter()
            .filter(|e| e.is_dir() && !e.path.is_ignored())
            .map(|e| e.path)
            .collect();
        folders.sort();

        let mut metadata = Vec::new();
        for folder in folders {
            if let Some(data_file) = self.main_data_file_in(&folder)? {
                let modified = self.fs.mtime(&folder)?;
                metadata.push(ModelMetadata {
                    name: main_data_name(&data_file),
                    key: folder.file_name_str().to_string(),
                    last_updated: DateTime::<Utc>::from(modified),
                    folder,
                });
            }
        }
        Ok(metadata)
    }

    /// フォルダ内の主データファイル（名前順で最初のもの）
    fn main_data_file_in(&self, folder: &Path) -> Result<Option<PathBuf>> {
        if !self.fs.is_dir(folder) {
            return Ok(None);
        }
        let mut files: Vec<PathBuf> = self
            .fs
            .read_dir(folder)?
            .into_iter()
            .filter(|e| e.is_file() && !e.path.is_ignored())
            .map(|e| e.path)
            .filter(|p| {
                p.file_name_str()
                    .to_lowercase()
                    .ends_with(MAIN_DATA_FILE_EXTENSION)
            })
            .collect();
        files.sort();
        Ok(files.into_iter().next())
    }

    /// 自動ポートフィールドの文字列キーを参照先のデータに置き換える
    fn resolve_auto_port_fields(
        &self,
        registry: &PorterRegistry<ModelPorter>,
        data: &mut Value,
        stack: &mut Vec<(TypeTag, String)>,
    ) -> Result<()> {
        let Some(object) = data.as_object_mut() else {
            return Ok(());
        };

        for (field, (kind, shape)) in self.auto_port.iter() {
            let Some(value) = object.get_mut(field) else {
                continue;
            };
            let porter = registry.resolve(kind)?;
            let replaced = match shape {
                FieldShape::Single => match value {
                    Value::String(key) => porter.load_reference(registry, key, stack)?,
                    _ => None,
                },
                FieldShape::List => match value {
                    Value::Array(items) => {
                        let mut loaded = Vec::with_capacity(items.len());
                        for item in items.iter() {
                            loaded.push(porter.load_item(registry, item, stack)?);
                        }
                        Some(Value::Array(loaded))
                    }
                    _ => None,
                },
                FieldShape::Map { preserve_keys } => {
                    porter.load_map(registry, value, *preserve_keys, stack)?
                }
            };
            if let Some(replaced) = replaced {
                *value = replaced;
            }
        }
        Ok(())
    }

    /// 参照キーを読み込み（循環参照の場合は置き換えない）
    fn load_reference(
        &self,
        registry: &PorterRegistry<ModelPorter>,
        key: &str,
        stack: &mut Vec<(TypeTag, String)>,
    ) -> Result<Option<Value>> {
        if stack.iter().any(|(k, s)| *k == self.base && s == key) {
            warn!(kind = %self.base, key, "circular auto-port reference left unresolved");
            return Ok(None);
        }
        let model = self
            .load_with_stack(registry, key, stack)?
            .ok_or_else(|| ModportError::ModelNotFound(format!("{} ({})", key, self.base)))?;
        Ok(Some(model.data))
    }

    fn load_item(
        &self,
        registry: &PorterRegistry<ModelPorter>,
        item: &Value,
        stack: &mut Vec<(TypeTag, String)>,
    ) -> Result<Value> {
        match item {
            Value::String(key) => Ok(self
                .load_reference(registry, key, stack)?
                .unwrap_or_else(|| item.clone())),
            other => Ok(other.clone()),
        }
    }

    fn load_map(
        &self,
        registry: &PorterRegistry<ModelPorter>,
        value: &Value,
        preserve_keys: bool,
        stack: &mut Vec<(TypeTag, String)>,
    ) -> Result<Option<Value>> {
        let entries: Vec<(String, &Value)> = match value {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
            // キーを保持しない場合は配列も受け付ける
            Value::Array(items) if !preserve_keys => items
                .iter()
                .filter_map(|v| v.as_str().map(|s| (s.to_string(), v)))
                .collect(),
            _ => return Ok(None),
        };

        let mut result = Map::new();
        for (entry_key, item) in entries {
            let loaded = self.load_item(registry, item, stack)?;
            let key = match (preserve_keys, item) {
                (false, Value::String(model_key)) => model_key.clone(),
                _ => entry_key,
            };
            result.insert(key, loaded);
        }
        Ok(Some(Value::Object(result)))
    }
}

/// `<name>.data.json` から `<name>` を取り出す
fn main_data_name(data_file: &Path) -> String {
    let file_name = data_file.file_name_str();
    file_name
        .get(..file_name.len().saturating_sub(MAIN_DATA_FILE_EXTENSION.len()))
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
