//! インポート結果の定義

use crate::error::ModportError;
use crate::resource::BuiltResource;
use std::fmt;
use std::path::{Path, PathBuf};

/// パイプラインのフェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Classify,
    Config,
    Directory,
    Loose,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::Classify => "classify",
            ImportPhase::Config => "config",
            ImportPhase::Directory => "directory",
            ImportPhase::Loose => "loose",
        }
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 取り込まれたファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedFile {
    pub path: PathBuf,
    /// 取り込んだリソースのパッケージ名
    pub package: String,
}

/// 失敗した候補
#[derive(Debug)]
pub struct ImportFailure {
    pub phase: ImportPhase,
    /// 失敗した候補のファイル
    pub files: Vec<PathBuf>,
    pub error: ModportError,
}

/// パイプライン結果
#[derive(Debug, Default)]
pub struct PipelineOutput {
    /// 構築されたリソース
    pub resources: Vec<BuiltResource>,
    /// 取り込まれたファイル（重複なし）
    pub consumed: Vec<ConsumedFile>,
    /// 候補ごとの失敗
    pub failures: Vec<ImportFailure>,
    /// キャンセルで中断したか
    pub cancelled: bool,
}

impl PipelineOutput {
    /// 取り込まれたか
    pub fn is_consumed(&self, path: &Path) -> bool {
        self.consumed.iter().any(|c| c.path == path)
    }

    /// 構築数
    pub fn success_count(&self) -> usize {
        self.resources.len()
    }

    /// 失敗数
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
}
