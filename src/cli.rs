use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{import, list, locate, plugins};

#[derive(Debug, Parser)]
#[command(name = "modport")]
#[command(about = "Mod asset importer", long_about = None)]
pub struct Cli {
    /// Path to modport.toml (defaults to $MODPORT_CONFIG, then ./modport.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 受け取りフォルダまたは指定パスからインポート
    Import(import::Args),

    /// mods フォルダのリソース一覧
    List(list::Args),

    /// リソースキーに対応するフォルダを表示
    Locate(locate::Args),

    /// プラグインファイルの一覧
    Plugins(plugins::Args),
}
