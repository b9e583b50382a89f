// ABOUTME: Entry point for the kubeship CLI application.
// ABOUTME: Parses arguments, sets up logging and output, and maps results to exit codes.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use kubeship::output::{Output, OutputMode};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let color = !cli.no_color
        && std::env::var_os("NO_COLOR").is_none()
        && std::io::stdout().is_terminal();
    let output = Output::new(mode).with_color(color);

    let code = match commands::run(cli, output.clone()).await {
        Ok(verdict) => verdict.exit_code(),
        Err(e) => {
            output.error(&e.to_string());
            e.exit_code()
        }
    };

    std::process::exit(code);
}
