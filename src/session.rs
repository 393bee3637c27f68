//! Mod セッション
//!
//! フォルダ構成・ユーザー名・ポーターレジストリ・パッケージレジストリを
//! まとめて保持する明示的なコンテキスト。インポート、検索、アンロード、
//! プラグイン探索はすべてセッション経由で行う。
//!
//! アーキタイプとモデルの2つのポーターレジストリは同じ型階層を共有する。

use crate::archive::{ArchiveReport, FinishedImportArchiver};
use crate::error::{ModportError, Result};
use crate::fs::FileSystem;
use crate::key::ResourceKey;
use crate::layout::ModsLayout;
use crate::options::{ImportOptions, OPTION_MOVE_TO_FINISHED};
use crate::package::{
    self, ModPackage, ModPackageRegistry, PluginLoader, PluginReport, RemoveResult,
};
use crate::path_ext::{sort_by_name_then_path, PathExt};
use crate::pipeline::{CancellationToken, ImportPipeline, PipelineOutput};
use crate::porter::{
    ArchetypePorter, ModelMetadata, ModelPorter, PortableModel, PorterRegistry, RegisterResult,
};
use crate::resolver::KeyResolver;
use crate::resource::BuiltResource;
use crate::types::{SharedHierarchy, TypeTag};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// インポート結果
#[derive(Debug)]
pub struct ImportReport {
    pub output: PipelineOutput,
    /// 移動を要求した場合のアーカイブ結果
    pub archive: Option<ArchiveReport>,
}

impl ImportReport {
    /// アーカイブを停止させたエラー
    pub fn archive_failure(&self) -> Option<&ModportError> {
        self.archive.as_ref().and_then(|a| a.failure.as_ref())
    }
}

/// Mod セッション
pub struct ModSession {
    layout: ModsLayout,
    user_name: String,
    fs: Arc<dyn FileSystem>,
    resolver: KeyResolver,
    archetypes: PorterRegistry<dyn ArchetypePorter>,
    models: PorterRegistry<ModelPorter>,
    packages: ModPackageRegistry,
}

impl ModSession {
    pub fn new(layout: ModsLayout, user_name: impl Into<String>, fs: Arc<dyn FileSystem>) -> Self {
        let user_name = user_name.into();
        let hierarchy = SharedHierarchy::new();
        Self {
            resolver: KeyResolver::new(layout.clone(), user_name.clone()),
            archetypes: PorterRegistry::new(hierarchy.clone()),
            models: PorterRegistry::new(hierarchy),
            packages: ModPackageRegistry::new(),
            layout,
            user_name,
            fs,
        }
    }

    pub fn layout(&self) -> &ModsLayout {
        &self.layout
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn archetype_porters(&self) -> &PorterRegistry<dyn ArchetypePorter> {
        &self.archetypes
    }

    pub fn model_porters(&self) -> &PorterRegistry<ModelPorter> {
        &self.models
    }

    pub fn packages(&self) -> &ModPackageRegistry {
        &self.packages
    }

    // ========================================================================
    // 登録
    // ========================================================================

    /// 両レジストリが共有する型階層に型を宣言
    pub fn declare_type(&self, tag: TypeTag, parent: Option<TypeTag>) -> Result<()> {
        self.archetypes.declare_type(tag, parent)
    }

    pub fn register_archetype_porter(&self, porter: Arc<dyn ArchetypePorter>) -> RegisterResult {
        self.archetypes.register(porter)
    }

    pub fn register_model_porter(&self, porter: Arc<ModelPorter>) -> RegisterResult {
        self.models.register(porter)
    }

    // ========================================================================
    // インポート
    // ========================================================================

    /// パスからインポート
    ///
    /// 入力は絶対パスに正規化してから扱う。構築したリソースをパッケージに登録し、
    /// `MoveImportedFilesToFinished` が有効でキャンセルされていなければアーカイブする。
    pub fn import(
        &mut self,
        kind: &TypeTag,
        paths: &[PathBuf],
        options: &ImportOptions,
        recursive: bool,
        cancel: Option<&CancellationToken>,
    ) -> Result<ImportReport> {
        let porter = self.archetypes.resolve(kind)?;

        let mut pipeline = ImportPipeline::new(
            porter.as_ref(),
            kind,
            &self.resolver,
            self.fs.as_ref(),
            options,
        )
        .recursive(recursive);
        if let Some(token) = cancel {
            pipeline = pipeline.with_cancellation(token);
        }
        let inputs: Vec<PathBuf> = paths.iter().map(|p| p.absolutize()).collect();
        let output = pipeline.run(&inputs);

        self.packages.add_resources(
            porter.base_type(),
            output.resources.iter().cloned().map(Arc::new),
        )?;

        let archive = if options.move_to_finished() && !output.cancelled {
            let archiver = FinishedImportArchiver::new(&self.layout, self.fs.as_ref());
            Some(archiver.archive(porter.as_ref(), &output.resources, &output.consumed))
        } else {
            None
        };

        Ok(ImportReport { output, archive })
    }

    /// 受け取りフォルダからインポート
    ///
    /// `__imports/<subfolder>/` と各 `__imports/<package>/<subfolder>/` の中身を対象にする。
    pub fn import_from_inbox(
        &mut self,
        kind: &TypeTag,
        options: &ImportOptions,
    ) -> Result<ImportReport> {
        let porter = self.archetypes.resolve(kind)?;
        let roots = self.subfolder_roots(self.layout.imports_dir(), porter.subfolder_name())?;
        let inputs = self.entries_of(&roots)?;
        info!(kind = %kind, inputs = inputs.len(), "importing from inbox");
        self.import(kind, &inputs, options, true, None)
    }

    /// mods フォルダの公開済みリソースを読み込み
    ///
    /// `mods/<subfolder>/` と各 `mods/<package>/<subfolder>/` が対象。アーカイブはしない。
    pub fn import_from_mods_folder(
        &mut self,
        kind: &TypeTag,
        options: &ImportOptions,
    ) -> Result<ImportReport> {
        let porter = self.archetypes.resolve(kind)?;
        let roots = self.subfolder_roots(self.layout.mods_dir(), porter.subfolder_name())?;
        let inputs = self.entries_of(&roots)?;
        info!(kind = %kind, inputs = inputs.len(), "loading from mods folder");
        self.import(
            kind,
            &inputs,
            &options.without(OPTION_MOVE_TO_FINISHED),
            true,
            None,
        )
    }

    /// キーに対応する mods フォルダを単一リソースとして読み込み
    pub fn load_from_mod_folder(
        &mut self,
        kind: &TypeTag,
        key: &ResourceKey,
        options: &ImportOptions,
    ) -> Result<ImportReport> {
        self.try_load_from_mod_folder(kind, key, options)?
            .ok_or_else(|| ModportError::ResourceNotFound {
                kind: kind.to_string(),
                key: key.to_string(),
            })
    }

    /// キーに対応する mods フォルダを読み込み（フォルダがなければ `None`）
    pub fn try_load_from_mod_folder(
        &mut self,
        kind: &TypeTag,
        key: &ResourceKey,
        options: &ImportOptions,
    ) -> Result<Option<ImportReport>> {
        let folder = self.locate_folder(kind, key)?;
        if !self.fs.is_dir(&folder) {
            debug!(folder = %folder.display(), "mod folder not found");
            return Ok(None);
        }
        self.import(
            kind,
            &[folder],
            &options.without(OPTION_MOVE_TO_FINISHED),
            true,
            None,
        )
        .map(Some)
    }

    /// キーに対応する mods フォルダ内の場所
    pub fn locate_folder(&self, kind: &TypeTag, key: &ResourceKey) -> Result<PathBuf> {
        let porter = self.archetypes.resolve(kind)?;
        Ok(porter.locate_folder(&self.layout, key))
    }

    /// `<base>/<subfolder>` と `<base>/<package>/<subfolder>` のうち存在するもの
    fn subfolder_roots(&self, base: &Path, subfolder: &str) -> Result<Vec<PathBuf>> {
        if !self.fs.is_dir(base) {
            return Ok(Vec::new());
        }

        let mut roots = Vec::new();
        let direct = base.join(subfolder);
        if self.fs.is_dir(&direct) {
            roots.push(direct);
        }

        let mut packages: Vec<PathBuf> = self
            .fs
            .read_dir(base)?
            .into_iter()
            .filter(|e| e.is_dir() && !e.path.is_ignored())
            .map(|e| e.path)
            .filter(|p| p.file_name_str() != subfolder)
            .collect();
        packages.sort();

        for package_dir in packages {
            let root = package_dir.join(subfolder);
            if self.fs.is_dir(&root) {
                roots.push(root);
            }
        }
        Ok(roots)
    }

    /// 各フォルダ直下のエントリ（ファイルは単体、フォルダは単一リソース）
    fn entries_of(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut inputs = Vec::new();
        for root in roots {
            let mut entries: Vec<PathBuf> = self
                .fs
                .read_dir(root)?
                .into_iter()
                .map(|e| e.path)
                .collect();
            sort_by_name_then_path(&mut entries);
            inputs.extend(entries);
        }
        Ok(inputs)
    }

    // ========================================================================
    // 検索
    // ========================================================================

    /// 型とキーでリソースを取得
    pub fn resources(&self, kind: &TypeTag, key: &str) -> Result<Vec<Arc<BuiltResource>>> {
        let parsed = ResourceKey::parse(key)?;
        let porter = self.archetypes.resolve(kind)?;
        self.packages.package(key)?.get(porter.base_type(), &parsed)
    }

    /// 型とキーでリソースを取得（見つからない場合は空）
    pub fn try_resources(&self, kind: &TypeTag, key: &str) -> Result<Vec<Arc<BuiltResource>>> {
        let parsed = ResourceKey::parse(key)?;
        let Some(porter) = self.archetypes.try_resolve(kind) else {
            return Ok(Vec::new());
        };
        Ok(self
            .packages
            .try_package(key)
            .map(|p| p.try_get(porter.base_type(), &parsed))
            .unwrap_or_default())
    }

    /// すべての型からキーでリソースを取得
    pub fn resources_of_any_type(&self, key: &str) -> Result<Vec<Arc<BuiltResource>>> {
        let parsed = ResourceKey::parse(key)?;
        self.packages.package(key)?.get_any(&parsed)
    }

    /// パッケージを取得（パッケージキーまたはリソースキー）
    pub fn package(&self, key: &str) -> Result<&ModPackage> {
        self.packages.package(key)
    }

    pub fn try_package(&self, key: &str) -> Option<&ModPackage> {
        self.packages.try_package(key)
    }

    // ========================================================================
    // 変更
    // ========================================================================

    /// ホストからのアンロード通知
    pub fn unload(&mut self, resource: &BuiltResource) -> RemoveResult {
        self.packages.on_unload(resource)
    }

    /// 名前が変わったリソースのフォルダを新しい場所へコピー
    ///
    /// 移動先がすでにある場合、`force` なしなら `false` を返し、
    /// `force` ありなら移動先を削除してからコピーする。
    pub fn move_renamed_resource(
        &self,
        kind: &TypeTag,
        old_name: &str,
        resource: &BuiltResource,
        force: bool,
    ) -> Result<bool> {
        let old_key = ResourceKey::new(resource.package(), old_name)?;
        let from = self.locate_folder(kind, &old_key)?;
        let to = self.locate_folder(kind, resource.key())?;

        if from == to {
            return Ok(true);
        }
        if !self.fs.is_dir(&from) {
            return Err(ModportError::ResourceNotFound {
                kind: kind.to_string(),
                key: old_key.to_string(),
            });
        }
        if self.fs.exists(&to) {
            if !force {
                debug!(to = %to.display(), "destination exists, not moving");
                return Ok(false);
            }
            self.fs.remove(&to)?;
        }

        self.fs.copy_dir(&from, &to)?;
        info!(from = %old_key, to = %resource.key(), "moved renamed resource");
        Ok(true)
    }

    // ========================================================================
    // モデル
    // ========================================================================

    /// モデルを保存
    pub fn save_model(&self, kind: &TypeTag, model: &PortableModel) -> Result<ModelMetadata> {
        self.models.resolve(kind)?.save(model)
    }

    /// モデルを読み込み（ない場合は `ModelNotFound`）
    pub fn load_model(&self, kind: &TypeTag, key: &str) -> Result<PortableModel> {
        self.models.resolve(kind)?.load_by_key(&self.models, key)
    }

    /// モデルを読み込み
    pub fn try_load_model(&self, kind: &TypeTag, key: &str) -> Result<Option<PortableModel>> {
        match self.models.try_resolve(kind) {
            Some(porter) => porter.try_load_by_key(&self.models, key),
            None => Ok(None),
        }
    }

    // ========================================================================
    // プラグイン
    // ========================================================================

    /// プラグインを探索し、優先度順にローダーへ渡す
    pub fn discover_plugins(&mut self, loader: &dyn PluginLoader) -> Result<PluginReport> {
        let candidates = package::discover_plugins(&self.layout, self.fs.as_ref())?;
        let mut report = PluginReport::default();

        for candidate in candidates {
            match loader.load(&candidate) {
                Ok(()) => {
                    debug!(
                        package = %candidate.package,
                        path = %candidate.path.display(),
                        priority = candidate.priority,
                        "loaded plugin"
                    );
                    self.packages
                        .record_plugin(&candidate.package, &candidate.path);
                    report.loaded.push(candidate);
                }
                Err(error) => {
                    warn!(path = %candidate.path.display(), %error, "plugin failed to load");
                    report.failures.push((candidate, error));
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
