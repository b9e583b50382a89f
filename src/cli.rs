// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines global flags, all subcommands, and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kubeship")]
#[command(about = "Tiered Kubernetes manifest deployment and cluster health monitoring")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: discovered in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Namespace to deploy to and check
    #[arg(short, long, global = true)]
    pub namespace: Option<String>,

    /// Kubeconfig passed to kubectl
    #[arg(long, global = true)]
    pub kubeconfig: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply middleware, then service manifests
    Deploy {
        /// Apply services one at a time
        #[arg(long)]
        sequential: bool,

        /// Attempts per component
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_retries: Option<u32>,

        /// Directory holding one manifest directory per component
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Run one health check (services, pods, and endpoint probes by default)
    Check(CheckArgs),

    /// Check pods and endpoints, printing only summary lines
    Quick,

    /// Run health checks continuously until interrupted
    Watch {
        /// Delay between cycles (e.g. 30s, 2m); defaults to poll_interval
        #[arg(short, long, value_parser = parse_interval)]
        interval: Option<Duration>,

        /// Stop after this many cycles
        #[arg(long)]
        count: Option<u64>,
    },

    /// Write a starter kubeship.yml
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
#[group(multiple = false)]
pub struct CheckArgs {
    /// Only check pod status
    #[arg(long)]
    pub pods_only: bool,

    /// Only probe service endpoints
    #[arg(long)]
    pub api_only: bool,

    /// Only list cluster services
    #[arg(long)]
    pub services_only: bool,
}

fn parse_interval(value: &str) -> Result<Duration, String> {
    let interval = humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())?;
    if interval.is_zero() {
        return Err("interval must be greater than zero".to_string());
    }
    Ok(interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_modes_are_exclusive() {
        assert!(Cli::try_parse_from(["kubeship", "check", "--pods-only", "--api-only"]).is_err());
        assert!(Cli::try_parse_from(["kubeship", "check", "--services-only"]).is_ok());
    }

    #[test]
    fn watch_interval_parses_humantime() {
        let cli = Cli::try_parse_from(["kubeship", "watch", "--interval", "30s", "--count", "2"]).unwrap();
        match cli.command {
            Commands::Watch { interval, count } => {
                assert_eq!(interval, Some(Duration::from_secs(30)));
                assert_eq!(count, Some(2));
            }
            _ => panic!("expected watch"),
        }
        assert!(Cli::try_parse_from(["kubeship", "watch", "--interval", "0s"]).is_err());
    }

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from(["kubeship", "deploy", "--namespace", "shop", "--sequential"]).unwrap();
        assert_eq!(cli.namespace.as_deref(), Some("shop"));
        assert!(matches!(cli.command, Commands::Deploy { sequential: true, .. }));
    }

    #[test]
    fn max_retries_must_be_positive() {
        assert!(Cli::try_parse_from(["kubeship", "deploy", "--max-retries", "0"]).is_err());
    }
}
