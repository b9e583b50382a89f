// ABOUTME: Health cycles: services info, pod status, and endpoint probes in one report.
// ABOUTME: Continuous mode repeats cycles on an interval until told to stop.

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use crate::cluster::{ClusterError, ClusterOps, TunnelOps};
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::health::{HealthChecker, PodRecord};
use crate::probe::{ProbeTarget, Prober};
use crate::report::{HealthReport, Section};

/// Which parts of a health cycle to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckScope {
    pub services: bool,
    pub pods: bool,
    pub probes: bool,
}

impl CheckScope {
    pub const fn full() -> Self {
        Self {
            services: true,
            pods: true,
            probes: true,
        }
    }

    pub const fn quick() -> Self {
        Self {
            services: false,
            pods: true,
            probes: true,
        }
    }

    pub const fn pods_only() -> Self {
        Self {
            services: false,
            pods: true,
            probes: false,
        }
    }

    pub const fn probes_only() -> Self {
        Self {
            services: false,
            pods: false,
            probes: true,
        }
    }

    pub const fn services_only() -> Self {
        Self {
            services: true,
            pods: false,
            probes: false,
        }
    }
}

/// Runs health cycles against one namespace.
pub struct Monitor<'a, C: ClusterOps + ?Sized, T: TunnelOps + ?Sized> {
    cluster: &'a C,
    tunnels: &'a T,
    namespace: String,
    targets: Vec<ProbeTarget>,
    concurrency: usize,
    tunnel_ready_timeout: Duration,
    skip_when_pods_unhealthy: bool,
}

impl<'a, C: ClusterOps + ?Sized, T: TunnelOps + ?Sized> Monitor<'a, C, T> {
    pub fn new(cluster: &'a C, tunnels: &'a T, config: &Config) -> Self {
        Self {
            cluster,
            tunnels,
            namespace: config.namespace.clone(),
            targets: config.probe_targets(),
            concurrency: config.probe.concurrency,
            tunnel_ready_timeout: config.probe.tunnel_ready_timeout,
            skip_when_pods_unhealthy: config.probe.skip_when_pods_unhealthy,
        }
    }

    /// One health cycle. Never fails: connectivity problems become `Unavailable` sections.
    pub async fn run_cycle(&self, scope: CheckScope) -> HealthReport {
        let checked_at = Utc::now();
        let checker = HealthChecker::new(self.cluster, &self.namespace);
        let mut diagnostics = Diagnostics::default();

        let services = if scope.services {
            fetched(checker.list_services().await)
        } else {
            Section::NotRequested
        };

        let pods = if scope.pods {
            fetched(checker.check_pods().await)
        } else {
            Section::NotRequested
        };

        let probes = if !scope.probes {
            Section::NotRequested
        } else if let Some(reason) = self.skip_reason(&pods) {
            tracing::warn!("skipping endpoint probes: {}", reason);
            Section::Skipped(reason.to_string())
        } else {
            let prober = Prober::new(self.tunnels, &self.namespace)
                .concurrency(self.concurrency)
                .tunnel_ready_timeout(self.tunnel_ready_timeout);
            Section::Ready(prober.probe_all(&self.targets, &mut diagnostics).await)
        };

        HealthReport::new(checked_at, services, pods, probes)
            .with_warnings(diagnostics.into_warnings())
    }

    fn skip_reason(&self, pods: &Section<Vec<PodRecord>>) -> Option<&'static str> {
        if !self.skip_when_pods_unhealthy {
            return None;
        }
        match pods {
            Section::Ready(pods) if !pods.iter().all(PodRecord::healthy) => {
                Some("pods are not all healthy")
            }
            Section::Unavailable(_) => Some("pod status unavailable"),
            _ => None,
        }
    }

    /// Repeat health cycles every `interval` until `max_cycles` have run or
    /// `shutdown` flips to true. A cycle in progress always completes.
    ///
    /// Returns the number of cycles run.
    pub async fn run_continuous(
        &self,
        scope: CheckScope,
        interval: Duration,
        max_cycles: Option<u64>,
        mut shutdown: watch::Receiver<bool>,
        mut on_report: impl FnMut(&HealthReport),
    ) -> u64 {
        let mut cycles = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_cycle(scope).await;
            cycles += 1;
            tracing::info!("cycle {} complete: {}", cycles, report.verdict());
            on_report(&report);

            if max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }
            if wait_or_shutdown(interval, &mut shutdown).await {
                break;
            }
        }

        cycles
    }
}

fn fetched<T>(result: Result<T, ClusterError>) -> Section<T> {
    match result {
        Ok(value) => Section::Ready(value),
        Err(e) => {
            let err = Error::Connectivity(e);
            tracing::warn!("{}", err);
            Section::Unavailable(err.to_string())
        }
    }
}

/// Sleep for `interval`. Returns true if shutdown was requested meanwhile.
async fn wait_or_shutdown(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow() => return true,
                Ok(()) => continue,
                // Nobody can request shutdown any more.
                Err(_) => {
                    (&mut sleep).await;
                    return false;
                }
            },
        }
    }
}
