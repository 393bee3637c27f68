//! modport plugins コマンド
//!
//! 各パッケージの `plugins/` フォルダにあるファイルを読み込み順に表示する。

use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Table};
use modport::error::{ModportError, Result};
use modport::fs::RealFs;
use modport::package::discover_plugins;
use modport::settings::Settings;

#[derive(Debug, Parser)]
pub struct Args {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let candidates = discover_plugins(&settings.layout(), &RealFs)?;

    if args.json {
        let json = serde_json::to_string_pretty(&candidates).map_err(ModportError::from)?;
        println!("{json}");
        return Ok(());
    }

    if candidates.is_empty() {
        println!("No plugins found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Priority", "Package", "Path"]);
    for candidate in &candidates {
        table.add_row(vec![
            candidate.priority.to_string(),
            candidate.package.clone(),
            candidate.path.display().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
