// ABOUTME: Cluster access layer: capability traits and the kubectl implementation.
// ABOUTME: Everything that talks to the cluster-management CLI lives here.

mod error;
mod kubectl;
mod pods;
mod services;
mod traits;
mod tunnel;

pub use error::{ClusterError, ClusterErrorKind};
pub use kubectl::{CommandOutput, Kubectl};
pub use pods::parse_pod_list;
pub use services::{ServiceInfo, parse_service_list};
pub use traits::{ApplyRequest, ClusterOps, TunnelOps, TunnelRequest};
pub use tunnel::Tunnel;
