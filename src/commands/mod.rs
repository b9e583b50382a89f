// ABOUTME: Command module aggregator for the kubeship CLI.
// ABOUTME: Dispatches parsed arguments to the deploy, check, watch, and init handlers.

mod check;
mod context;
mod deploy;
mod init;
mod watch;

use crate::cli::{Cli, Commands};
use context::load_config;
use kubeship::config::Overrides;
use kubeship::error::Result;
use kubeship::monitor::CheckScope;
use kubeship::output::Output;
use kubeship::report::Verdict;

/// Run the selected command, returning the verdict that decides the exit code.
pub async fn run(cli: Cli, mut output: Output) -> Result<Verdict> {
    let mut overrides = Overrides {
        namespace: cli.namespace,
        kubeconfig: cli.kubeconfig,
        ..Overrides::default()
    };
    let config_path = cli.config;

    match cli.command {
        Commands::Init { force } => init::init(force, &output),
        Commands::Deploy {
            sequential,
            max_retries,
            base_dir,
        } => {
            overrides.sequential = sequential;
            overrides.max_retries = max_retries;
            overrides.base_dir = base_dir;
            let config = load_config(config_path.as_deref(), &overrides)?;
            deploy::deploy(config, &mut output).await
        }
        Commands::Check(args) => {
            let scope = if args.pods_only {
                CheckScope::pods_only()
            } else if args.api_only {
                CheckScope::probes_only()
            } else if args.services_only {
                CheckScope::services_only()
            } else {
                CheckScope::full()
            };
            let config = load_config(config_path.as_deref(), &overrides)?;
            check::check(config, scope, false, &output).await
        }
        Commands::Quick => {
            let config = load_config(config_path.as_deref(), &overrides)?;
            check::check(config, CheckScope::quick(), true, &output).await
        }
        Commands::Watch { interval, count } => {
            let config = load_config(config_path.as_deref(), &overrides)?;
            watch::watch(config, interval, count, &output).await
        }
    }
}
