// ABOUTME: Manifest deployer: applies middleware, then services, with per-component retries.
// ABOUTME: Services run as one spawned task each, bounded by a semaphore when parallel.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info};

use super::attempt::{RetryPolicy, run_with_retry};
use super::component::{Component, Tier, resolve_components};
use super::error::AttemptError;
use super::summary::{ComponentOutcome, DeploymentSummary};
use super::tracker::DeploymentTracker;
use crate::cluster::{ApplyRequest, ClusterOps};
use crate::config::Config;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{Error, Result};
use crate::types::ResourceName;

/// Everything one deployment run needs, resolved from configuration.
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub base_dir: PathBuf,
    pub namespace: String,
    pub middleware: Vec<ResourceName>,
    pub services: Vec<ResourceName>,
    pub parallel: bool,
    pub max_parallel: usize,
    pub recursive: bool,
    pub policy: RetryPolicy,
}

impl DeployPlan {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_dir: config.base_dir(),
            namespace: config.namespace.clone(),
            middleware: config.deploy.middleware.clone(),
            services: config.deploy.services.clone(),
            parallel: config.deploy.parallel,
            max_parallel: config.deploy.max_parallel.max(1),
            recursive: config.deploy.recursive,
            policy: RetryPolicy::new(config.max_retries, config.deploy.retry_delay),
        }
    }
}

/// Applies a plan's components through a cluster client.
pub struct Deployer<C: ClusterOps + 'static> {
    cluster: Arc<C>,
}

impl<C: ClusterOps + 'static> Deployer<C> {
    pub fn new(cluster: Arc<C>) -> Self {
        Self { cluster }
    }

    /// Run the whole deployment.
    ///
    /// Only a missing base directory or an unusable cluster CLI return `Err`;
    /// component failures end up in the summary.
    pub async fn deploy(
        &self,
        plan: &DeployPlan,
        mut tracker: DeploymentTracker<'_>,
        diagnostics: &mut Diagnostics,
    ) -> Result<DeploymentSummary> {
        if !plan.base_dir.is_dir() {
            return Err(Error::Configuration(format!(
                "deployment directory not found: {}",
                plan.base_dir.display()
            )));
        }

        let version = self
            .cluster
            .client_version()
            .await
            .map_err(Error::Environment)?;
        debug!("cluster client: {}", version);

        let resolved = resolve_components(&plan.base_dir, &plan.middleware, &plan.services);
        for component in &resolved.skipped {
            diagnostics.warn(Warning::skipped_component(
                &component.name,
                &component.manifest_path,
            ));
        }
        for (tier, configured) in [
            (Tier::Middleware, &plan.middleware),
            (Tier::Service, &plan.services),
        ] {
            if !configured.is_empty() && resolved.tier(tier).next().is_none() {
                diagnostics.warn(Warning::empty_tier(tier));
            }
        }

        for component in &resolved.components {
            tracker.register(component);
        }

        let middleware: Vec<_> = resolved.tier(Tier::Middleware).cloned().collect();
        info!("applying {} middleware component(s)", middleware.len());
        for component in middleware {
            tracker.mark_deploying(&component.name);
            let outcome = ApplyJob::new(plan, component).run(&*self.cluster).await;
            tracker.record(outcome);
        }

        let services: Vec<_> = resolved.tier(Tier::Service).cloned().collect();
        info!(
            "applying {} service component(s) {}",
            services.len(),
            if plan.parallel { "in parallel" } else { "sequentially" }
        );
        if plan.parallel {
            let permits = Arc::new(Semaphore::new(plan.max_parallel));
            let (started_tx, started_rx) = mpsc::unbounded_channel();
            let mut tasks = Vec::with_capacity(services.len());
            for component in services {
                let job = ApplyJob::new(plan, component.clone());
                let cluster = Arc::clone(&self.cluster);
                let permits = Arc::clone(&permits);
                let started = started_tx.clone();
                let handle = tokio::spawn(async move {
                    // The semaphore is never closed.
                    let _permit = permits.acquire_owned().await.ok();
                    let _ = started.send(job.component.name.clone());
                    job.run(&*cluster).await
                });
                tasks.push((component, handle));
            }
            drop(started_tx);
            tracker.await_all_with_starts(tasks, started_rx).await;
        } else {
            for component in services {
                tracker.mark_deploying(&component.name);
                let outcome = ApplyJob::new(plan, component).run(&*self.cluster).await;
                tracker.record(outcome);
            }
        }

        Ok(tracker.finish(resolved.skipped))
    }
}

/// One component's retry loop, owning what it needs so it can be spawned.
struct ApplyJob {
    component: Component,
    namespace: String,
    recursive: bool,
    policy: RetryPolicy,
}

impl ApplyJob {
    fn new(plan: &DeployPlan, component: Component) -> Self {
        Self {
            component,
            namespace: plan.namespace.clone(),
            recursive: plan.recursive,
            policy: plan.policy,
        }
    }

    async fn run<C: ClusterOps + ?Sized>(&self, cluster: &C) -> ComponentOutcome {
        let job = self;
        run_with_retry(&self.component, self.policy, move |_| async move {
            let request = ApplyRequest {
                component: &job.component.name,
                manifest_dir: &job.component.manifest_path,
                namespace: &job.namespace,
                recursive: job.recursive,
            };
            cluster
                .apply(&request)
                .await
                .map(|stdout| debug!("{}: {}", job.component.name, stdout.trim()))
                .map_err(AttemptError::from)
        })
        .await
    }
}
