pub mod code;

use std::path::PathBuf;
use thiserror::Error;

pub use code::ErrorCode;

/// modport 統一エラー型
#[derive(Debug, Error)]
pub enum ModportError {
    #[error("Malformed resource key: {0}. '::' is reserved as the package separator")]
    MalformedKey(String),

    #[error("Could not resolve a resource name for: {}", .0.display())]
    MissingName(PathBuf),

    #[error("'{0}' cannot be the name of a resource. Provide a name under the 'name' property in the config")]
    ReservedName(String),

    #[error("No porter registered for type: {0}")]
    PorterNotFound(String),

    #[error("Mod package not found: {0}")]
    PackageNotFound(String),

    #[error("Resource not found: {key} (type: {kind})")]
    ResourceNotFound { kind: String, key: String },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Resource {key} has already been added to the mod package: {package}")]
    Duplicate { package: String, key: String },

    #[error("Refusing to delete protected folder: {}", .0.display())]
    UnsafeDeletion(PathBuf),

    #[error("Invalid config {}: {message}", .path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Invalid type declaration: {0}")]
    InvalidType(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ModportError>;

impl ModportError {
    /// 不変条件違反（致命的）かどうか
    pub fn is_fatal(&self) -> bool {
        matches!(self, ModportError::UnsafeDeletion(_))
    }

    /// 「見つからない」系のエラーかどうか
    ///
    /// `try_*` 系 API はこれらを返さず、戻り値で不在を表現する。
    pub fn is_not_found(&self) -> bool {
        match self {
            ModportError::PorterNotFound(_)
            | ModportError::PackageNotFound(_)
            | ModportError::ResourceNotFound { .. }
            | ModportError::ModelNotFound(_) => true,
            ModportError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// エラーコードを取得
    pub fn code(&self) -> ErrorCode {
        match self {
            ModportError::MalformedKey(_) => ErrorCode::Key001,
            ModportError::MissingName(_) => ErrorCode::Key002,
            ModportError::ReservedName(_) => ErrorCode::Key003,
            ModportError::PorterNotFound(_) => ErrorCode::Prt001,
            ModportError::InvalidType(_) => ErrorCode::Prt002,
            ModportError::PackageNotFound(_) => ErrorCode::Pkg001,
            ModportError::ResourceNotFound { .. } => ErrorCode::Pkg002,
            ModportError::ModelNotFound(_) => ErrorCode::Pkg002,
            ModportError::Duplicate { .. } => ErrorCode::Pkg003,
            ModportError::Plugin(_) => ErrorCode::Pkg004,
            ModportError::UnsafeDeletion(_) => ErrorCode::Arc001,
            ModportError::InvalidConfig { .. } | ModportError::Json(_) => ErrorCode::Cfg001,
            ModportError::Settings(_) | ModportError::Toml(_) => ErrorCode::Cfg002,
            ModportError::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::Io001,
                std::io::ErrorKind::PermissionDenied => ErrorCode::Io002,
                _ => ErrorCode::Io003,
            },
        }
    }
}
