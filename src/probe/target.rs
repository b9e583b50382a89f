// ABOUTME: Probe targets and probe results.
// ABOUTME: Any 2xx or 3xx status counts as reachable; these are liveness checks.

use crate::config::ProbeKind;
use crate::types::ResourceName;
use serde::{Serialize, Serializer};
use std::ops::RangeInclusive;
use std::time::Duration;

/// HTTP statuses that count as a passing probe.
pub const PASSING_STATUSES: RangeInclusive<u16> = 200..=399;

pub fn is_passing_status(status: u16) -> bool {
    PASSING_STATUSES.contains(&status)
}

/// A service endpoint to probe through its own tunnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub name: ResourceName,
    pub local_port: u16,
    pub remote_port: u16,
    pub kind: ProbeKind,
    pub path: String,
    pub timeout: Duration,
}

/// Outcome of probing one service once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub service_name: ResourceName,
    pub endpoint_path: String,
    pub local_port: u16,
    pub remote_port: u16,
    pub kind: ProbeKind,
    pub http_status: Option<u16>,
    #[serde(rename = "latency_seconds", serialize_with = "serialize_secs")]
    pub latency: Duration,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn serialize_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

impl ProbeResult {
    /// Result for a probe that got an answer (or, for TCP, a connection).
    pub fn answered(target: &ProbeTarget, http_status: Option<u16>, latency: Duration) -> Self {
        let passed = match target.kind {
            ProbeKind::Http => http_status.is_some_and(is_passing_status),
            ProbeKind::Tcp => true,
        };
        let error = match (passed, http_status) {
            (false, Some(status)) => Some(format!("HTTP {status}")),
            _ => None,
        };
        Self::build(target, http_status, latency, passed, error)
    }

    /// Result for a probe that never got an answer.
    pub fn failed(target: &ProbeTarget, latency: Duration, error: impl Into<String>) -> Self {
        Self::build(target, None, latency, false, Some(error.into()))
    }

    fn build(
        target: &ProbeTarget,
        http_status: Option<u16>,
        latency: Duration,
        passed: bool,
        error: Option<String>,
    ) -> Self {
        Self {
            service_name: target.name.clone(),
            endpoint_path: target.path.clone(),
            local_port: target.local_port,
            remote_port: target.remote_port,
            kind: target.kind,
            http_status,
            latency,
            passed,
            error,
        }
    }

    pub fn latency_seconds(&self) -> f64 {
        self.latency.as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(kind: ProbeKind) -> ProbeTarget {
        ProbeTarget {
            name: ResourceName::new("frontend").unwrap(),
            local_port: 18080,
            remote_port: 8080,
            kind,
            path: "/".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn redirects_and_successes_pass() {
        for status in [200, 204, 301, 399] {
            let result = ProbeResult::answered(&target(ProbeKind::Http), Some(status), Duration::ZERO);
            assert!(result.passed, "{status} should pass");
            assert!(result.error.is_none());
        }
    }

    #[test]
    fn client_and_server_errors_fail() {
        for status in [199, 400, 404, 500, 503] {
            let result = ProbeResult::answered(&target(ProbeKind::Http), Some(status), Duration::ZERO);
            assert!(!result.passed, "{status} should fail");
            assert_eq!(result.http_status, Some(status));
        }
    }

    #[test]
    fn tcp_answer_passes_without_status() {
        let result = ProbeResult::answered(&target(ProbeKind::Tcp), None, Duration::from_millis(3));
        assert!(result.passed);
        assert_eq!(result.http_status, None);
    }

    #[test]
    fn failed_probe_has_no_status() {
        let result = ProbeResult::failed(&target(ProbeKind::Http), Duration::from_secs(5), "timed out");
        assert!(!result.passed);
        assert_eq!(result.http_status, None);
        assert_eq!(result.latency_seconds(), 5.0);
    }

    #[test]
    fn serializes_latency_in_seconds() {
        let result = ProbeResult::answered(&target(ProbeKind::Http), Some(200), Duration::from_millis(1500));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["latency_seconds"], 1.5);
        assert_eq!(json["service_name"], "frontend");
        assert_eq!(json["kind"], "http");
        assert!(json.get("error").is_none());
    }
}
