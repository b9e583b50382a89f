// ABOUTME: Cluster health checker: one pod listing per call, no caching.
// ABOUTME: Also lists services for the services info view.

use crate::cluster::{ClusterError, ClusterOps, ServiceInfo};

use super::PodRecord;

/// Polls pod and service state through a cluster client.
pub struct HealthChecker<'a, C: ClusterOps + ?Sized> {
    cluster: &'a C,
    namespace: &'a str,
}

impl<'a, C: ClusterOps + ?Sized> HealthChecker<'a, C> {
    pub fn new(cluster: &'a C, namespace: &'a str) -> Self {
        Self { cluster, namespace }
    }

    /// Snapshot every pod in the namespace.
    ///
    /// Failures are returned to the caller, never retried here. An empty
    /// namespace is a valid (and healthy) answer.
    pub async fn check_pods(&self) -> Result<Vec<PodRecord>, ClusterError> {
        let pods = self.cluster.list_pods(self.namespace).await?;
        let healthy = pods.iter().filter(|p| p.healthy()).count();
        tracing::info!(
            "{}/{} pods healthy in namespace {}",
            healthy,
            pods.len(),
            self.namespace
        );
        Ok(pods)
    }

    pub async fn list_services(&self) -> Result<Vec<ServiceInfo>, ClusterError> {
        self.cluster.list_services(self.namespace).await
    }
}
