// ABOUTME: Parsing of `kubectl get pods -o json` output.
// ABOUTME: Converts the pod list document into PodRecord snapshots.

use crate::health::{PodPhase, PodRecord};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::IgnoredAny;

#[derive(Debug, Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    metadata: Metadata,
    #[serde(default)]
    spec: PodSpec,
    #[serde(default)]
    status: PodStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    name: String,
    #[serde(default)]
    creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    deletion_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct PodSpec {
    #[serde(default)]
    containers: Vec<IgnoredAny>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodStatus {
    #[serde(default)]
    phase: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContainerStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    restart_count: u32,
    #[serde(default)]
    state: ContainerState,
}

#[derive(Debug, Default, Deserialize)]
struct ContainerState {
    #[serde(default)]
    waiting: Option<StateDetail>,
    #[serde(default)]
    terminated: Option<StateDetail>,
}

#[derive(Debug, Deserialize)]
struct StateDetail {
    #[serde(default)]
    reason: Option<String>,
}

/// Parse a pod list JSON document.
pub fn parse_pod_list(json: &str) -> Result<Vec<PodRecord>, serde_json::Error> {
    let list: PodList = serde_json::from_str(json)?;
    Ok(list.items.into_iter().map(into_record).collect())
}

fn into_record(pod: Pod) -> PodRecord {
    let statuses = &pod.status.container_statuses;

    let total = pod.spec.containers.len().max(statuses.len()) as u32;
    let ready = statuses.iter().filter(|c| c.ready).count() as u32;
    let restarts = statuses.iter().map(|c| c.restart_count).sum();

    // The first container-level reason is what `kubectl get pods` shows as STATUS.
    let container_reason = statuses.iter().find_map(|c| {
        c.state
            .waiting
            .as_ref()
            .or(c.state.terminated.as_ref())
            .and_then(|detail| detail.reason.clone())
    });

    let reason = if pod.metadata.deletion_timestamp.is_some() {
        Some("Terminating".to_string())
    } else {
        container_reason.or(pod.status.reason)
    };

    PodRecord {
        name: pod.metadata.name,
        phase: pod
            .status
            .phase
            .as_deref()
            .map(PodPhase::from_api)
            .unwrap_or(PodPhase::Unknown),
        ready_containers: ready,
        total_containers: total,
        restart_count: restarts,
        created_at: pod.metadata.creation_timestamp,
        reason,
    }
}
