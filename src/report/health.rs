// ABOUTME: HealthReport: the immutable result of one health cycle.
// ABOUTME: Each part is a Section so "not asked for", "failed to fetch" and "skipped" stay distinct.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Verdict;
use crate::cluster::ServiceInfo;
use crate::diagnostics::Warning;
use crate::health::PodRecord;
use crate::probe::ProbeResult;

/// One part of a health report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    /// Not part of this check's scope.
    NotRequested,
    /// Fetching failed; carries the error message.
    Unavailable(String),
    /// Deliberately not run; carries the reason.
    Skipped(String),
    Ready(T),
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_requested(&self) -> bool {
        !matches!(self, Section::NotRequested)
    }

    /// Whether this section lets the report pass, given a check for ready data.
    fn passes(&self, check: impl FnOnce(&T) -> bool) -> bool {
        match self {
            Section::NotRequested => true,
            Section::Unavailable(_) | Section::Skipped(_) => false,
            Section::Ready(value) => check(value),
        }
    }
}

/// Aggregate of one health cycle. Built once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    checked_at: DateTime<Utc>,
    services: Section<Vec<ServiceInfo>>,
    pods: Section<Vec<PodRecord>>,
    probes: Section<Vec<ProbeResult>>,
    all_healthy: bool,
    /// Non-fatal problems met during the cycle; they never change the verdict.
    warnings: Vec<Warning>,
}

impl HealthReport {
    pub fn new(
        checked_at: DateTime<Utc>,
        services: Section<Vec<ServiceInfo>>,
        pods: Section<Vec<PodRecord>>,
        probes: Section<Vec<ProbeResult>>,
    ) -> Self {
        let all_healthy = services.passes(|_| true)
            && pods.passes(|pods| pods.iter().all(PodRecord::healthy))
            && probes.passes(|probes| probes.iter().all(|p| p.passed));
        Self {
            checked_at,
            services,
            pods,
            probes,
            all_healthy,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<Warning>) -> Self {
        self.warnings = warnings;
        self
    }

    pub fn checked_at(&self) -> DateTime<Utc> {
        self.checked_at
    }

    pub fn services(&self) -> &Section<Vec<ServiceInfo>> {
        &self.services
    }

    pub fn pods(&self) -> &Section<Vec<PodRecord>> {
        &self.pods
    }

    pub fn probes(&self) -> &Section<Vec<ProbeResult>> {
        &self.probes
    }

    pub fn all_healthy(&self) -> bool {
        self.all_healthy
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_success(self.all_healthy)
    }

    /// `(healthy, total)` pods, when pods were fetched.
    pub fn pod_counts(&self) -> Option<(usize, usize)> {
        self.pods
            .ready()
            .map(|pods| (pods.iter().filter(|p| p.healthy()).count(), pods.len()))
    }

    /// `(passed, total)` probes, when probes ran.
    pub fn probe_counts(&self) -> Option<(usize, usize)> {
        self.probes
            .ready()
            .map(|probes| (probes.iter().filter(|p| p.passed).count(), probes.len()))
    }
}
