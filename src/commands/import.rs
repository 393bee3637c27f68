//! modport import コマンド
//!
//! パス指定がなければ受け取りフォルダ (`mods/__imports`) から取り込む。

use super::{open_session, target_kinds};
use crate::output::CommandSummary;
use clap::Parser;
use modport::error::{ModportError, Result};
use modport::options::{
    ImportOptions, OPTION_MOVE_TO_FINISHED, OPTION_NAME, OPTION_PACKAGE_NAME,
};
use modport::settings::Settings;
use modport::{ImportReport, TypeTag};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
pub struct Args {
    /// Files or folders to import (defaults to the inbox)
    pub paths: Vec<PathBuf>,

    /// Resource type to import as (defaults to every configured porter; required
    /// with explicit paths when more than one porter is configured)
    #[arg(long)]
    pub kind: Option<String>,

    /// Override the resource name
    #[arg(long)]
    pub name: Option<String>,

    /// Override the package name
    #[arg(long)]
    pub package: Option<String>,

    /// Leave imported files in place instead of moving them to __processed_imports
    #[arg(long)]
    pub keep: bool,

    /// Do not descend into subfolders
    #[arg(long)]
    pub no_recursive: bool,
}

impl Args {
    fn options(&self) -> ImportOptions {
        let mut options = ImportOptions::new().with(OPTION_MOVE_TO_FINISHED, !self.keep);
        if let Some(name) = &self.name {
            options.set(OPTION_NAME, name.as_str());
        }
        if let Some(package) = &self.package {
            options.set(OPTION_PACKAGE_NAME, package.as_str());
        }
        options
    }
}

pub fn run(args: Args, settings: &Settings) -> Result<()> {
    let mut session = open_session(settings)?;
    let kinds = target_kinds(&session, args.kind.as_deref())?;
    check_explicit_paths(&args, &kinds)?;
    let options = args.options();

    let mut success = 0;
    let mut failure = 0;
    for kind in &kinds {
        let report = if args.paths.is_empty() {
            session.import_from_inbox(kind, &options)?
        } else {
            session.import(kind, &args.paths, &options, !args.no_recursive, None)?
        };
        print_report(kind.as_str(), &report);
        success += report.output.success_count();
        failure += report.output.failure_count();
    }

    let summary = CommandSummary::format(success, failure);
    println!("{} {}", summary.prefix, summary.message);
    Ok(())
}

/// 明示したパスは1つの型でのみ取り込む
///
/// 最初の型で元ファイルが移動されるため、同じパスを複数の型に渡さない。
fn check_explicit_paths(args: &Args, kinds: &[TypeTag]) -> Result<()> {
    if args.paths.is_empty() || kinds.len() <= 1 {
        return Ok(());
    }
    let names: Vec<&str> = kinds.iter().map(TypeTag::as_str).collect();
    Err(ModportError::Settings(format!(
        "several porters are configured ({}); pass --kind to import explicit paths",
        names.join(", ")
    )))
}

fn print_report(kind: &str, report: &ImportReport) {
    for resource in &report.output.resources {
        println!("  {} {} ({})", "+".green(), resource.key(), kind);
    }
    for failure in &report.output.failures {
        let files: Vec<String> = failure
            .files
            .iter()
            .map(|f| f.display().to_string())
            .collect();
        println!(
            "  {} [{}] {}: {}",
            "✗".red(),
            failure.phase,
            files.join(", "),
            failure.error
        );
    }
    if let Some(error) = report.archive_failure() {
        if error.is_fatal() {
            println!("  {} archive refused: {}", "✗".red(), error);
        } else {
            println!("  {} archive stopped: {}", "!".yellow(), error);
        }
    }
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
