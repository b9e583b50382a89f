// ABOUTME: Watch command implementation.
// ABOUTME: Repeats full health checks on an interval until Ctrl-C or a cycle limit.

use super::check::print_report;
use super::context::connect;
use kubeship::config::Config;
use kubeship::error::{EXIT_FATAL, Result};
use kubeship::monitor::{CheckScope, Monitor};
use kubeship::output::Output;
use kubeship::report::{ServiceRoles, Verdict};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Exit verdict is the verdict of the last completed cycle.
pub async fn watch(
    config: Config,
    interval: Option<Duration>,
    count: Option<u64>,
    output: &Output,
) -> Result<Verdict> {
    let kubectl = connect(&config).await?;
    let interval = interval.unwrap_or(config.poll_interval);
    let roles = ServiceRoles::from_config(&config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if relay_interrupts(tokio::signal::ctrl_c, &shutdown_tx).await {
            tracing::warn!("second interrupt received, exiting without finishing the cycle");
            std::process::exit(EXIT_FATAL);
        }
    });

    output.progress(&format!(
        "Watching namespace {} every {}s (Ctrl-C to stop)",
        config.namespace,
        interval.as_secs_f64()
    ));

    let monitor = Monitor::new(&kubectl, &kubectl, &config);
    let mut last = Verdict::Healthy;
    let cycles = monitor
        .run_continuous(CheckScope::full(), interval, count, shutdown_rx, |report| {
            last = report.verdict();
            print_report(report, &roles, false, output);
        })
        .await;

    output.progress(&format!("Stopped after {cycles} cycle(s)"));
    Ok(last)
}

/// The first interrupt requests a graceful stop. Returns true once a second
/// one arrives, false if interrupts cannot be received at all.
async fn relay_interrupts<F, Fut>(mut interrupt: F, shutdown: &watch::Sender<bool>) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = interrupt().await {
        tracing::warn!("cannot listen for Ctrl-C: {}", e);
        return false;
    }
    tracing::info!("interrupt received, stopping after the current cycle (Ctrl-C again to force)");
    let _ = shutdown.send(true);
    interrupt().await.is_ok()
}
