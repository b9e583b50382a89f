// ABOUTME: Endpoint probe configuration.
// ABOUTME: Per-service tunnel ports and health paths plus global probe timing.

use super::ProbeKind;
use crate::types::ResourceName;
use serde::Deserialize;
use std::time::Duration;

/// One monitored service reached through a port-forward tunnel.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: ResourceName,

    /// Local end of the tunnel. Must be unique across services.
    pub local_port: u16,

    /// Service port inside the cluster.
    pub remote_port: u16,

    #[serde(default)]
    pub kind: ProbeKind,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Overrides `probe.timeout` for this service.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

fn default_health_path() -> String {
    "/".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Maximum number of tunnels open at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_tunnel_ready_timeout", with = "humantime_serde")]
    pub tunnel_ready_timeout: Duration,

    /// Skip probes in a health cycle when any pod is unhealthy.
    #[serde(default = "default_skip_when_pods_unhealthy")]
    pub skip_when_pods_unhealthy: bool,
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_concurrency() -> usize {
    4
}

fn default_tunnel_ready_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_skip_when_pods_unhealthy() -> bool {
    true
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            timeout: default_timeout(),
            concurrency: default_concurrency(),
            tunnel_ready_timeout: default_tunnel_ready_timeout(),
            skip_when_pods_unhealthy: default_skip_when_pods_unhealthy(),
        }
    }
}
