//! modport list コマンド
//!
//! mods フォルダの公開済みリソースを読み込み、パッケージごとに一覧表示する。

use super::{open_session, target_kinds};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Table};
use modport::error::{ModportError, Result};
use modport::options::ImportOptions;
use modport::settings::Settings;
use modport::ModSession;
use serde::Serialize;

#[derive(Debug, Parser)]
pub struct Args {
    /// Only list resources of this type
    #[arg(long)]
    pub kind: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// 一覧の1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRow {
    pub package: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
    pub sources: usize,
}

pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let mut session = open_session(settings)?;
    let kinds = target_kinds(&session, args.kind.as_deref())?;

    let mut failures = 0;
    for kind in &kinds {
        let report = session.import_from_mods_folder(kind, &ImportOptions::new())?;
        failures += report.output.failure_count();
    }

    let rows = collect_rows(&session);
    if args.json {
        print_json(&rows)?;
    } else {
        print_table(&rows);
    }
    if failures > 0 {
        eprintln!("{} resource folder(s) could not be read (use --verbose for details)", failures);
    }
    Ok(())
}

/// パッケージ → 型 → キーの順に行を作る
pub fn collect_rows(session: &ModSession) -> Vec<ResourceRow> {
    session
        .packages()
        .packages()
        .flat_map(|package| {
            package
                .resources()
                .into_iter()
                .map(|(base, resource)| ResourceRow {
                    package: package.key().to_string(),
                    kind: base.to_string(),
                    key: resource.key().to_string(),
                    sources: resource.sources().len(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn print_json(rows: &[ResourceRow]) -> Result<()> {
    let json = serde_json::to_string_pretty(rows).map_err(ModportError::from)?;
    println!("{json}");
    Ok(())
}

fn print_table(rows: &[ResourceRow]) {
    if rows.is_empty() {
        println!("No resources found");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Package", "Type", "Key", "Sources"]);
    for row in rows {
        table.add_row(vec![
            row.package.clone(),
            row.kind.clone(),
            row.key.clone(),
            row.sources.to_string(),
        ]);
    }
    println!("{table}");
    println!("{} resource(s)", rows.len());
}

#[cfg(test)]
#[path = "list_test.rs"]
mod tests;
