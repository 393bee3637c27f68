use crate::cli::{Cli, Command};
use modport::error::{ModportError, Result};
use modport::fs::RealFs;
use modport::settings::Settings;
use modport::{ModSession, TypeTag};
use std::sync::Arc;

pub mod import;
pub mod list;
pub mod locate;
pub mod plugins;

pub fn dispatch(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    match cli.command {
        Command::Import(args) => import::run(args, &settings),
        Command::List(args) => list::run(args, &settings),
        Command::Locate(args) => locate::run(args, &settings),
        Command::Plugins(args) => plugins::run(args, &settings),
    }
}

/// 実ファイルシステム上のセッションを作成
fn open_session(settings: &Settings) -> Result<ModSession> {
    settings.build_session(Arc::new(RealFs))
}

/// 対象の型（指定がなければ登録済みのすべて）
fn target_kinds(session: &ModSession, kind: Option<&str>) -> Result<Vec<TypeTag>> {
    if let Some(kind) = kind {
        return Ok(vec![TypeTag::new(kind)]);
    }
    let kinds = session.archetype_porters().registered_types();
    if kinds.is_empty() {
        return Err(ModportError::Settings(
            "no [[porters]] configured in modport.toml".to_string(),
        ));
    }
    Ok(kinds)
}
