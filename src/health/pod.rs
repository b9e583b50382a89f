// ABOUTME: Pod snapshot types and health classification.
// ABOUTME: A pod is healthy when Running with every container ready; restarts only warn.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Pod lifecycle phase as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    /// Map the API's phase string. Anything unrecognised is `Unknown`.
    pub fn from_api(phase: &str) -> Self {
        match phase {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PodPhase::Pending => "Pending",
            PodPhase::Running => "Running",
            PodPhase::Succeeded => "Succeeded",
            PodPhase::Failed => "Failed",
            PodPhase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Snapshot of one pod at check time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PodRecord {
    pub name: String,
    pub phase: PodPhase,
    pub ready_containers: u32,
    pub total_containers: u32,
    pub restart_count: u32,
    pub created_at: Option<DateTime<Utc>>,
    /// Container-level status such as `CrashLoopBackOff`, when there is one.
    pub reason: Option<String>,
}

/// How worrying a pod's restart count is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RestartSeverity {
    None,
    Warning,
    Critical,
}

/// Restart counts above this are critical.
const CRITICAL_RESTARTS: u32 = 5;

impl PodRecord {
    pub fn healthy(&self) -> bool {
        self.phase == PodPhase::Running && self.ready_containers == self.total_containers
    }

    /// Ready column in `ready/total` form.
    pub fn ready(&self) -> String {
        format!("{}/{}", self.ready_containers, self.total_containers)
    }

    pub fn restart_severity(&self) -> RestartSeverity {
        match self.restart_count {
            0 => RestartSeverity::None,
            n if n <= CRITICAL_RESTARTS => RestartSeverity::Warning,
            _ => RestartSeverity::Critical,
        }
    }

    /// Age relative to `now`, or `None` when the creation time is unknown.
    pub fn age(&self, now: DateTime<Utc>) -> Option<String> {
        self.created_at.map(|created| format_age(now - created))
    }
}

/// Format a duration the way `kubectl get` does for the AGE column.
pub fn format_age(age: chrono::TimeDelta) -> String {
    let secs = age.num_seconds().max(0);
    match secs {
        s if s < 120 => format!("{s}s"),
        s if s < 2 * 3600 => format!("{}m", s / 60),
        s if s < 48 * 3600 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86400),
    }
}
