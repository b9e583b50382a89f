// ABOUTME: Capability traits for talking to a cluster.
// ABOUTME: ClusterOps covers apply and listing, TunnelOps covers port-forward tunnels.

use super::error::{ClusterError, TunnelShutdownSnafu};
use super::services::ServiceInfo;
use super::tunnel::Tunnel;
use crate::health::PodRecord;
use crate::types::ResourceName;
use async_trait::async_trait;
use snafu::ResultExt;
use std::path::Path;
use std::time::Duration;

/// Apply and query operations against the cluster-management API.
#[async_trait]
pub trait ClusterOps: Send + Sync {
    /// Check the CLI can run at all, returning its client version string.
    async fn client_version(&self) -> Result<String, ClusterError>;

    /// Apply every manifest in a directory. Returns the CLI's stdout.
    async fn apply(&self, request: &ApplyRequest<'_>) -> Result<String, ClusterError>;

    /// Snapshot every pod in a namespace.
    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, ClusterError>;

    /// List services in a namespace, excluding the API server's own service.
    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>, ClusterError>;
}

/// One `apply` call.
#[derive(Debug, Clone, Copy)]
pub struct ApplyRequest<'a> {
    pub component: &'a ResourceName,
    pub manifest_dir: &'a Path,
    pub namespace: &'a str,
    pub recursive: bool,
}

/// Local-to-cluster port tunnels.
#[async_trait]
pub trait TunnelOps: Send + Sync {
    /// Open a tunnel and wait until the local port accepts connections.
    async fn open_tunnel(&self, request: &TunnelRequest<'_>) -> Result<Tunnel, ClusterError>;

    /// Stop a tunnel's forwarder.
    async fn close_tunnel(&self, tunnel: Tunnel) -> Result<(), ClusterError> {
        let service = tunnel.service().to_string();
        tunnel.close().await.context(TunnelShutdownSnafu { service })
    }
}

/// One port-forward to a cluster service.
#[derive(Debug, Clone, Copy)]
pub struct TunnelRequest<'a> {
    pub namespace: &'a str,
    pub service: &'a ResourceName,
    pub local_port: u16,
    pub remote_port: u16,
    pub ready_timeout: Duration,
}
