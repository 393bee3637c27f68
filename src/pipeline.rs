//! インポートパイプライン
//!
//! 入力パスを分類し、決められた優先順位でポーターに渡してリソースを構築する。
//!
//! ## フェーズ
//!
//! 1. 分類 - 設定ファイル / アセット / ディレクトリ（互いに素）。存在しない入力は失敗に記録
//! 2. 設定パス - 設定ファイルごとに候補アセットを提示して構築
//! 3. ディレクトリパス - フォルダを単一リソースとして構築
//! 4. 単体パス - 残ったアセットを先頭から順に構築
//!
//! 各フェーズで取り込まれたファイルは後続フェーズのプールから取り除かれる。
//! 失敗した候補は記録してプールから外し、バッチは続行する。
//!
//! ## 使い方
//!
//! ```ignore
//! let output = ImportPipeline::new(porter.as_ref(), &kind, &resolver, &RealFs, &options)
//!     .recursive(true)
//!     .run(&inputs);
//! println!("{} built", output.success_count());
//! ```

mod classify;
mod result;

pub use classify::{classify, order_candidates, Pools};
pub use result::{ConsumedFile, ImportFailure, ImportPhase, PipelineOutput};

use crate::config::ResourceConfig;
use crate::error::ModportError;
use crate::fs::FileSystem;
use crate::options::ImportOptions;
use crate::path_ext::{sort_by_name_then_path, PathExt};
use crate::porter::{ArchetypePorter, BuildContext};
use crate::resolver::KeyResolver;
use crate::resource::BuiltResource;
use crate::types::TypeTag;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// キャンセル要求
///
/// フェーズの境界で確認される。
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// インポートパイプライン
pub struct ImportPipeline<'a> {
    porter: &'a dyn ArchetypePorter,
    kind: &'a TypeTag,
    resolver: &'a KeyResolver,
    fs: &'a dyn FileSystem,
    options: &'a ImportOptions,
    recursive: bool,
    cancel: Option<&'a CancellationToken>,
}

/// 実行中の状態
struct RunState {
    pools: Pools,
    consumed: HashSet<PathBuf>,
    output: PipelineOutput,
}

impl RunState {
    /// 構築結果を確定し、取り込んだファイルをプールから除く
    fn commit(
        &mut self,
        resources: Vec<BuiltResource>,
        files: Vec<PathBuf>,
        default_package: &str,
    ) {
        let package = resources
            .first()
            .map(|r| r.package().to_string())
            .unwrap_or_else(|| default_package.to_string());

        for file in files {
            self.pools.remove(&file);
            if self.consumed.insert(file.clone()) {
                self.output.consumed.push(ConsumedFile {
                    path: file,
                    package: package.clone(),
                });
            }
        }
        self.output.resources.extend(resources);
    }

    /// 失敗を記録し、対象ファイルをプールから除く
    fn fail(&mut self, phase: ImportPhase, files: Vec<PathBuf>, error: ModportError) {
        warn!(%phase, files = ?files, %error, "import candidate failed");
        for file in &files {
            self.pools.remove(file);
        }
        self.output.failures.push(ImportFailure {
            phase,
            files,
            error,
        });
    }
}

impl<'a> ImportPipeline<'a> {
    pub fn new(
        porter: &'a dyn ArchetypePorter,
        kind: &'a TypeTag,
        resolver: &'a KeyResolver,
        fs: &'a dyn FileSystem,
        options: &'a ImportOptions,
    ) -> Self {
        Self {
            porter,
            kind,
            resolver,
            fs,
            options,
            recursive: true,
            cancel: None,
        }
    }

    /// サブディレクトリも処理するか
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// パイプラインを実行
    pub fn run(&self, inputs: &[PathBuf]) -> PipelineOutput {
        let mut state = RunState {
            pools: classify(inputs, self.fs),
            consumed: HashSet::new(),
            output: PipelineOutput::default(),
        };
        debug!(
            kind = %self.kind,
            configs = state.pools.configs.len(),
            assets = state.pools.assets.len(),
            directories = state.pools.directories.len(),
            missing = state.pools.missing.len(),
            "classified inputs"
        );

        for path in std::mem::take(&mut state.pools.missing) {
            let error = ModportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("input does not exist: {}", path.display()),
            ));
            state.fail(ImportPhase::Classify, vec![path], error);
        }

        for phase in [ImportPhase::Config, ImportPhase::Directory, ImportPhase::Loose] {
            if self.is_cancelled() {
                info!(kind = %self.kind, before = %phase, "import cancelled");
                state.output.cancelled = true;
                return state.output;
            }
            match phase {
                ImportPhase::Config => self.config_pass(&mut state),
                ImportPhase::Directory => self.directory_pass(&mut state),
                ImportPhase::Loose => self.loose_pass(&mut state),
                ImportPhase::Classify => unreachable!("classify runs before the pass loop"),
            }
        }

        info!(
            kind = %self.kind,
            built = state.output.resources.len(),
            consumed = state.output.consumed.len(),
            failed = state.output.failures.len(),
            "import finished"
        );
        state.output
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.map(|c| c.is_cancelled()).unwrap_or(false)
    }

    fn context(&self, single_resource_folder: bool) -> BuildContext<'_> {
        BuildContext {
            kind: self.kind,
            options: self.options,
            resolver: self.resolver,
            fs: self.fs,
            single_resource_folder,
        }
    }

    /// 設定パス
    fn config_pass(&self, state: &mut RunState) {
        let default_package = self.resolver.default_package_name();
        let configs = state.pools.configs.clone();

        for config_path in configs {
            debug!(config = %config_path.display(), "config pass");
            let ctx = self.context(false);
            let candidates = order_candidates(&config_path, &state.pools.assets);

            let result = ResourceConfig::load(self.fs, &config_path).and_then(|config| {
                self.porter
                    .build_from_config(&ctx, config, &config_path, &candidates)
            });

            match result {
                Ok(build) => {
                    let mut files = vec![config_path.clone()];
                    files.extend(
                        build
                            .consumed
                            .into_iter()
                            .filter(|p| candidates.contains(p)),
                    );
                    state.commit(build.resources, files, &default_package);
                    self.drop_consumed_directories(state);
                }
                Err(error) => state.fail(ImportPhase::Config, vec![config_path], error),
            }
        }
    }

    /// 中身がすべて取り込まれたディレクトリを保留中のプールから除く
    fn drop_consumed_directories(&self, state: &mut RunState) {
        let consumed = &state.consumed;
        let fs = self.fs;
        state.pools.directories.retain(|dir| {
            let files: Vec<PathBuf> = fs
                .read_dir(dir)
                .map(|entries| {
                    entries
                        .into_iter()
                        .filter(|e| !e.is_dir() && !e.path.is_ignored())
                        .map(|e| e.path)
                        .collect()
                })
                .unwrap_or_default();
            files.is_empty() || !files.iter().all(|f| consumed.contains(f))
        });
    }

    /// ディレクトリパス
    fn directory_pass(&self, state: &mut RunState) {
        let directories = std::mem::take(&mut state.pools.directories);
        for dir in directories {
            self.import_directory(&dir, state);
        }
    }

    fn import_directory(&self, dir: &Path, state: &mut RunState) {
        debug!(dir = %dir.display(), "directory pass");
        let entries = match self.fs.read_dir(dir) {
            Ok(entries) => entries,
            Err(error) => {
                state.fail(ImportPhase::Directory, vec![dir.to_path_buf()], error);
                return;
            }
        };

        let mut files: Vec<PathBuf> = Vec::new();
        let mut subdirs: Vec<PathBuf> = Vec::new();
        for entry in entries {
            if entry.path.is_ignored() {
                continue;
            }
            if entry.is_dir() {
                subdirs.push(entry.path);
            } else if !state.consumed.contains(&entry.path) {
                files.push(entry.path);
            }
        }
        sort_by_name_then_path(&mut files);
        sort_by_name_then_path(&mut subdirs);

        if !files.is_empty() {
            self.import_folder_files(files, state);
        }

        if self.recursive {
            for sub in subdirs {
                self.import_directory(&sub, state);
            }
        }
    }

    /// フォルダ直下のファイルを1リソースとして構築
    fn import_folder_files(&self, files: Vec<PathBuf>, state: &mut RunState) {
        let default_package = self.resolver.default_package_name();
        let ctx = self.context(true);

        // `_config.json` を優先し、なければ最初の JSON
        let config_path = files
            .iter()
            .find(|f| f.is_reserved_config())
            .or_else(|| files.iter().find(|f| f.is_json()))
            .cloned();

        let result = match &config_path {
            Some(config_path) => {
                let candidates: Vec<PathBuf> =
                    files.iter().filter(|f| *f != config_path).cloned().collect();
                ResourceConfig::load(self.fs, config_path)
                    .and_then(|config| {
                        self.porter
                            .build_from_config(&ctx, config, config_path, &candidates)
                    })
                    .map(|build| {
                        let mut consumed = vec![config_path.clone()];
                        consumed.extend(
                            build
                                .consumed
                                .into_iter()
                                .filter(|p| candidates.contains(p)),
                        );
                        (build.resources, consumed)
                    })
            }
            None => self
                .porter
                .build_from_loose_assets(&ctx, &files)
                .map(|build| {
                    let consumed: Vec<PathBuf> = build
                        .consumed
                        .into_iter()
                        .filter(|p| files.contains(p))
                        .collect();
                    (build.resources, consumed)
                }),
        };

        match result {
            Ok((resources, consumed)) => state.commit(resources, consumed, &default_package),
            Err(error) => state.fail(ImportPhase::Directory, files, error),
        }
    }

    /// 単体パス
    fn loose_pass(&self, state: &mut RunState) {
        let default_package = self.resolver.default_package_name();

        while let Some(head) = state.pools.assets.first().cloned() {
            debug!(asset = %head.display(), "loose pass");
            let candidates = state.pools.assets.clone();
            let ctx = self.context(false);

            match self.porter.build_from_loose_assets(&ctx, &candidates) {
                Ok(build) => {
                    let mut files = vec![head.clone()];
                    files.extend(
                        build
                            .consumed
                            .into_iter()
                            .filter(|p| *p != head && candidates.contains(p)),
                    );
                    state.commit(build.resources, files, &default_package);
                }
                Err(error) => state.fail(ImportPhase::Loose, vec![head.clone()], error),
            }

            // 先頭は結果にかかわらず取り除く
            state.pools.remove(&head);
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
