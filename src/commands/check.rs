// ABOUTME: Check and quick command implementations.
// ABOUTME: Runs one health cycle and prints the report or its summary lines.

use super::context::connect;
use kubeship::config::Config;
use kubeship::error::Result;
use kubeship::monitor::{CheckScope, Monitor};
use kubeship::output::Output;
use kubeship::report::{HealthReport, ServiceRoles, Verdict, render_quick, render_report};

pub async fn check(
    config: Config,
    scope: CheckScope,
    quick: bool,
    output: &Output,
) -> Result<Verdict> {
    let kubectl = connect(&config).await?;
    let monitor = Monitor::new(&kubectl, &kubectl, &config);

    output.progress(&format!("Checking namespace {}...", config.namespace));
    let report = monitor.run_cycle(scope).await;
    print_report(&report, &ServiceRoles::from_config(&config), quick, output);

    Ok(report.verdict())
}

pub fn print_report(report: &HealthReport, roles: &ServiceRoles, quick: bool, output: &Output) {
    let opts = output.render_options();
    output.result("report", report, || {
        if quick {
            render_quick(report, opts)
        } else {
            render_report(report, roles, opts)
        }
    });
    output.warnings(report.warnings());
}
