// ABOUTME: Cluster health checking: pod snapshots and their classification.
// ABOUTME: Stateless per call; every check re-queries the cluster.

mod checker;
mod pod;

pub use checker::HealthChecker;
pub use pod::{PodPhase, PodRecord, RestartSeverity, format_age};
