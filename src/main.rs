mod cli;
mod commands;
mod output;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

/// ログレベルを指定する環境変数
const LOG_ENV: &str = "MODPORT_LOG";

fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = commands::dispatch(cli) {
        let code = err.code();
        eprintln!("{} {}", format!("error[{}]:", code.as_str()).red(), err);
        eprintln!("  {} {}", "hint:".cyan(), code.remediation());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
