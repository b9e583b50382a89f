// ABOUTME: Deploy command implementation.
// ABOUTME: Runs the tiered deployment and prints per-component progress and a summary.

use kubeship::cluster::Kubectl;
use kubeship::config::Config;
use kubeship::deploy::{ComponentOutcome, DeployPlan, Deployer, DeploymentTracker};
use kubeship::diagnostics::Diagnostics;
use kubeship::error::Result;
use kubeship::output::Output;
use kubeship::report::{Verdict, render_deployment};
use std::sync::Arc;

pub async fn deploy(config: Config, output: &mut Output) -> Result<Verdict> {
    output.start_timer();
    let kubectl = Arc::new(Kubectl::from_config(&config)?);
    let plan = DeployPlan::from_config(&config);
    let mut diag = Diagnostics::default();

    output.progress(&format!(
        "Deploying to namespace {} from {}",
        plan.namespace,
        plan.base_dir.display()
    ));

    let progress = output.clone();
    let tracker = DeploymentTracker::new()
        .with_observer(move |outcome: &ComponentOutcome| progress.component_finished(outcome));
    let summary = Deployer::new(kubectl).deploy(&plan, tracker, &mut diag).await?;

    output.warnings(diag.warnings());
    let opts = output.render_options();
    output.result("deployment", &summary, || render_deployment(&summary, opts));

    let verdict = summary.verdict();
    if verdict.is_healthy() {
        output.success("Deployment complete!");
    } else {
        let failed: Vec<_> = summary
            .failed()
            .map(|o| o.component.name.to_string())
            .collect();
        output.error(&format!("deployment failed: {}", failed.join(", ")));
    }
    Ok(verdict)
}
