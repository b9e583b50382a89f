// ABOUTME: Endpoint prober: tunnel, check, release, for each service.
// ABOUTME: Services are probed concurrently up to a fixed pool size, each on its own local port.

use super::http::check_endpoint;
use super::target::{ProbeResult, ProbeTarget};
use crate::cluster::{TunnelOps, TunnelRequest};
use crate::diagnostics::{Diagnostics, Warning};
use futures::stream::{self, StreamExt};
use std::time::{Duration, Instant};

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_TUNNEL_READY_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes service endpoints through port-forward tunnels.
pub struct Prober<'a, T: TunnelOps + ?Sized> {
    tunnels: &'a T,
    namespace: &'a str,
    concurrency: usize,
    tunnel_ready_timeout: Duration,
}

impl<'a, T: TunnelOps + ?Sized> Prober<'a, T> {
    pub fn new(tunnels: &'a T, namespace: &'a str) -> Self {
        Self {
            tunnels,
            namespace,
            concurrency: DEFAULT_CONCURRENCY,
            tunnel_ready_timeout: DEFAULT_TUNNEL_READY_TIMEOUT,
        }
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn tunnel_ready_timeout(mut self, timeout: Duration) -> Self {
        self.tunnel_ready_timeout = timeout;
        self
    }

    /// Probe one service. Never fails: every problem ends up in the result,
    /// or in `diagnostics` when it does not affect the result.
    pub async fn probe(&self, target: &ProbeTarget, diagnostics: &mut Diagnostics) -> ProbeResult {
        let (result, warning) = self.probe_once(target).await;
        if let Some(warning) = warning {
            diagnostics.warn(warning);
        }
        result
    }

    async fn probe_once(&self, target: &ProbeTarget) -> (ProbeResult, Option<Warning>) {
        let started = Instant::now();
        let request = TunnelRequest {
            namespace: self.namespace,
            service: &target.name,
            local_port: target.local_port,
            remote_port: target.remote_port,
            ready_timeout: self.tunnel_ready_timeout,
        };

        let tunnel = match self.tunnels.open_tunnel(&request).await {
            Ok(tunnel) => tunnel,
            Err(e) => {
                tracing::warn!("tunnel to {} failed: {}", target.name, e);
                let result = ProbeResult::failed(target, started.elapsed(), format!("tunnel: {e}"));
                return (result, None);
            }
        };

        let check = check_endpoint(
            target.kind,
            tunnel.local_port(),
            &target.path,
            target.timeout,
        )
        .await;

        let warning = self
            .tunnels
            .close_tunnel(tunnel)
            .await
            .err()
            .map(|e| Warning::tunnel_shutdown(&target.name, e));

        let result = match check.error {
            Some(error) => ProbeResult::failed(target, check.latency, error),
            None => ProbeResult::answered(target, check.http_status, check.latency),
        };
        tracing::info!(
            "probe {} {} in {:.3}s",
            target.name,
            if result.passed { "passed" } else { "failed" },
            result.latency_seconds()
        );
        (result, warning)
    }

    /// Probe every target, returning results in target order.
    pub async fn probe_all(
        &self,
        targets: &[ProbeTarget],
        diagnostics: &mut Diagnostics,
    ) -> Vec<ProbeResult> {
        let mut results: Vec<(usize, (ProbeResult, Option<Warning>))> =
            stream::iter(targets.iter().enumerate())
                .map(|(index, target)| async move { (index, self.probe_once(target).await) })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        results.sort_by_key(|(index, _)| *index);
        results
            .into_iter()
            .map(|(_, (result, warning))| {
                if let Some(warning) = warning {
                    diagnostics.warn(warning);
                }
                result
            })
            .collect()
    }
}
