//! modport
//!
//! ゲームの Mod アセットを取り込み、パッケージ修飾されたリソースとして
//! 管理するライブラリ。
//!
//! - `porter` - 種類別のインポーター（ポーター）とレジストリ
//! - `pipeline` - 入力パスを分類してポーターに渡すインポートパイプライン
//! - `package` - パッケージ単位のリソース索引とプラグイン探索
//! - `archive` - 処理済みファイルの移動
//! - `session` - 上記をまとめる明示的なコンテキスト

pub mod archive;
pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod key;
pub mod layout;
pub mod options;
pub mod package;
pub mod path_ext;
pub mod pipeline;
pub mod porter;
pub mod resolver;
pub mod resource;
pub mod session;
pub mod settings;
pub mod types;

pub use error::{ModportError, Result};
pub use key::ResourceKey;
pub use session::{ImportReport, ModSession};
pub use types::TypeTag;
