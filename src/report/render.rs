// ABOUTME: Text rendering of health reports and deployment summaries.
// ABOUTME: Pure functions producing tables with status glyphs and aggregate summary lines.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::health::{HealthReport, Section};
use crate::cluster::ServiceInfo;
use crate::config::{Config, ProbeKind};
use crate::deploy::{DeploymentSummary, Outcome};
use crate::health::{PodRecord, RestartSeverity};
use crate::probe::ProbeResult;

const MAX_ERROR_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub color: bool,
}

impl RenderOptions {
    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn colored() -> Self {
        Self { color: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Pass,
    Fail,
    Warn,
}

fn glyph(mark: Mark, opts: RenderOptions) -> String {
    let symbol = match mark {
        Mark::Pass => "✓",
        Mark::Fail => "✗",
        Mark::Warn => "⚠",
    };
    paint(symbol, mark, opts)
}

fn paint(text: &str, mark: Mark, opts: RenderOptions) -> String {
    if !opts.color {
        return text.to_string();
    }
    match mark {
        Mark::Pass => text.green().to_string(),
        Mark::Fail => text.red().to_string(),
        Mark::Warn => text.yellow().to_string(),
    }
}

fn pass_or_fail(passed: bool) -> Mark {
    if passed { Mark::Pass } else { Mark::Fail }
}

fn truncate(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= width {
        line.to_string()
    } else {
        let cut: String = line.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn table<T: Tabled>(rows: Vec<T>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn summary_line(passed: usize, total: usize, noun: &str, opts: RenderOptions) -> String {
    format!(
        "{} {}/{} {}",
        glyph(pass_or_fail(passed == total), opts),
        passed,
        total,
        noun
    )
}

fn section_notice<T>(title: &str, section: &Section<T>, opts: RenderOptions) -> Option<String> {
    match section {
        Section::Unavailable(err) => {
            Some(format!("{} {title} unavailable: {err}", glyph(Mark::Fail, opts)))
        }
        Section::Skipped(reason) => {
            Some(format!("{} {title} skipped: {reason}", glyph(Mark::Warn, opts)))
        }
        Section::NotRequested | Section::Ready(_) => None,
    }
}

// =============================================================================
// Pods
// =============================================================================

#[derive(Tabled)]
struct PodRow {
    #[tabled(rename = "")]
    mark: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "READY")]
    ready: String,
    #[tabled(rename = "RESTARTS")]
    restarts: String,
    #[tabled(rename = "AGE")]
    age: String,
}

fn pod_row(pod: &PodRecord, now: DateTime<Utc>, opts: RenderOptions) -> PodRow {
    let restarts = pod.restart_count.to_string();
    let restarts = match pod.restart_severity() {
        RestartSeverity::None => restarts,
        RestartSeverity::Warning => format!("{} {}", paint(&restarts, Mark::Warn, opts), glyph(Mark::Warn, opts)),
        RestartSeverity::Critical => format!("{} {}", paint(&restarts, Mark::Fail, opts), glyph(Mark::Warn, opts)),
    };

    PodRow {
        mark: glyph(pass_or_fail(pod.healthy()), opts),
        name: pod.name.clone(),
        status: pod
            .reason
            .clone()
            .unwrap_or_else(|| pod.phase.to_string()),
        ready: pod.ready(),
        restarts,
        age: pod.age(now).unwrap_or_else(|| "-".to_string()),
    }
}

/// Pods table followed by the `N/M pods healthy` line.
pub fn render_pods(pods: &[PodRecord], now: DateTime<Utc>, opts: RenderOptions) -> String {
    let healthy = pods.iter().filter(|p| p.healthy()).count();
    let summary = summary_line(healthy, pods.len(), "pods healthy", opts);
    if pods.is_empty() {
        return summary;
    }
    let rows = pods.iter().map(|p| pod_row(p, now, opts)).collect();
    format!("{}\n{}", table(rows), summary)
}

// =============================================================================
// Probes
// =============================================================================

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "")]
    mark: String,
    #[tabled(rename = "SERVICE")]
    service: String,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "ENDPOINT")]
    endpoint: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "LATENCY")]
    latency: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

fn probe_row(result: &ProbeResult, opts: RenderOptions) -> ProbeRow {
    let endpoint = match result.kind {
        ProbeKind::Http => format!("localhost:{}{}", result.local_port, result.endpoint_path),
        ProbeKind::Tcp => format!("localhost:{}", result.local_port),
    };
    let status = match (result.http_status, result.kind) {
        (Some(code), _) => code.to_string(),
        (None, ProbeKind::Tcp) if result.passed => "open".to_string(),
        (None, _) => "-".to_string(),
    };

    ProbeRow {
        mark: glyph(pass_or_fail(result.passed), opts),
        service: result.service_name.to_string(),
        kind: result.kind.to_string(),
        endpoint,
        status,
        latency: format!("{:.3}s", result.latency_seconds()),
        error: result
            .error
            .as_deref()
            .map(|e| truncate(e, MAX_ERROR_WIDTH))
            .unwrap_or_default(),
    }
}

/// Probe table followed by the `N/M probes passed` line.
pub fn render_probes(results: &[ProbeResult], opts: RenderOptions) -> String {
    let passed = results.iter().filter(|r| r.passed).count();
    let summary = summary_line(passed, results.len(), "probes passed", opts);
    if results.is_empty() {
        return summary;
    }
    let rows = results.iter().map(|r| probe_row(r, opts)).collect();
    format!("{}\n{}", table(rows), summary)
}

// =============================================================================
// Services
// =============================================================================

/// What a cluster service is, from the configuration's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    Middleware,
    Http,
    Tcp,
    Other,
}

impl std::fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceRole::Middleware => write!(f, "Middleware"),
            ServiceRole::Http => write!(f, "HTTP"),
            ServiceRole::Tcp => write!(f, "TCP/gRPC"),
            ServiceRole::Other => write!(f, "-"),
        }
    }
}

/// Classifies cluster services by name.
#[derive(Debug, Clone, Default)]
pub struct ServiceRoles {
    middleware: HashSet<String>,
    kinds: HashMap<String, ProbeKind>,
}

impl ServiceRoles {
    pub fn from_config(config: &Config) -> Self {
        Self {
            middleware: config
                .deploy
                .middleware
                .iter()
                .map(|m| m.to_string())
                .collect(),
            kinds: config
                .services
                .iter()
                .map(|s| (s.name.to_string(), s.kind))
                .collect(),
        }
    }

    pub fn classify(&self, name: &str) -> ServiceRole {
        if self.middleware.contains(name) {
            return ServiceRole::Middleware;
        }
        match self.kinds.get(name) {
            Some(ProbeKind::Http) => ServiceRole::Http,
            Some(ProbeKind::Tcp) => ServiceRole::Tcp,
            None => ServiceRole::Other,
        }
    }
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ROLE")]
    role: String,
    #[tabled(rename = "TYPE")]
    service_type: String,
    #[tabled(rename = "CLUSTER-IP")]
    cluster_ip: String,
    #[tabled(rename = "EXTERNAL-IP")]
    external_ip: String,
    #[tabled(rename = "PORTS")]
    ports: String,
}

pub fn render_services(services: &[ServiceInfo], roles: &ServiceRoles) -> String {
    let count = format!("{} services", services.len());
    if services.is_empty() {
        return count;
    }
    let rows = services
        .iter()
        .map(|s| ServiceRow {
            name: s.name.clone(),
            role: roles.classify(&s.name).to_string(),
            service_type: s.service_type.clone(),
            cluster_ip: s.cluster_ip.clone(),
            external_ip: s.external_ip.clone(),
            ports: s.ports.join(","),
        })
        .collect();
    format!("{}\n{}", table(rows), count)
}

// =============================================================================
// Reports
// =============================================================================

/// Full report: every requested section, then the verdict line.
pub fn render_report(report: &HealthReport, roles: &ServiceRoles, opts: RenderOptions) -> String {
    let mut parts = Vec::new();

    if let Some(notice) = section_notice("services", report.services(), opts) {
        parts.push(notice);
    } else if let Some(services) = report.services().ready() {
        parts.push(format!("Services\n{}", render_services(services, roles)));
    }

    if let Some(notice) = section_notice("pods", report.pods(), opts) {
        parts.push(notice);
    } else if let Some(pods) = report.pods().ready() {
        parts.push(format!(
            "Pods\n{}",
            render_pods(pods, report.checked_at(), opts)
        ));
    }

    if let Some(notice) = section_notice("probes", report.probes(), opts) {
        parts.push(notice);
    } else if let Some(probes) = report.probes().ready() {
        parts.push(format!("Endpoints\n{}", render_probes(probes, opts)));
    }

    parts.push(verdict_line(report, opts));
    parts.join("\n\n")
}

/// Summary lines only, for quick checks.
pub fn render_quick(report: &HealthReport, opts: RenderOptions) -> String {
    let mut lines = Vec::new();

    match report.pod_counts() {
        Some((healthy, total)) => lines.push(summary_line(healthy, total, "pods healthy", opts)),
        None => lines.extend(section_notice("pods", report.pods(), opts)),
    }
    match report.probe_counts() {
        Some((passed, total)) => lines.push(summary_line(passed, total, "probes passed", opts)),
        None => lines.extend(section_notice("probes", report.probes(), opts)),
    }
    lines.push(verdict_line(report, opts));
    lines.join("\n")
}

fn verdict_line(report: &HealthReport, opts: RenderOptions) -> String {
    let stamp = report.checked_at().format("%Y-%m-%d %H:%M:%S UTC");
    if report.all_healthy() {
        format!("{} all checks passed ({stamp})", glyph(Mark::Pass, opts))
    } else {
        format!("{} cluster unhealthy ({stamp})", glyph(Mark::Fail, opts))
    }
}

// =============================================================================
// Deployment
// =============================================================================

#[derive(Tabled)]
struct DeployRow {
    #[tabled(rename = "")]
    mark: String,
    #[tabled(rename = "COMPONENT")]
    component: String,
    #[tabled(rename = "TIER")]
    tier: String,
    #[tabled(rename = "RESULT")]
    result: String,
    #[tabled(rename = "ATTEMPTS")]
    attempts: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

/// Per-component outcome table, skipped components, then `N/M components deployed`.
pub fn render_deployment(summary: &DeploymentSummary, opts: RenderOptions) -> String {
    let mut parts = Vec::new();

    if !summary.outcomes.is_empty() {
        let rows = summary
            .outcomes
            .iter()
            .map(|o| DeployRow {
                mark: glyph(pass_or_fail(o.status == Outcome::Succeeded), opts),
                component: o.component.name.to_string(),
                tier: o.component.tier.to_string(),
                result: match o.status {
                    Outcome::Succeeded => "succeeded".to_string(),
                    Outcome::Failed => "failed".to_string(),
                },
                attempts: o.attempts.len().to_string(),
                error: match o.status {
                    Outcome::Succeeded => String::new(),
                    Outcome::Failed => o
                        .last_error()
                        .map(|e| truncate(e, MAX_ERROR_WIDTH))
                        .unwrap_or_default(),
                },
            })
            .collect();
        parts.push(table(rows));
    }

    for skipped in &summary.skipped {
        parts.push(format!(
            "{} skipped {} ({} not found)",
            glyph(Mark::Warn, opts),
            skipped.name,
            skipped.manifest_path.display()
        ));
    }

    parts.push(summary_line(
        summary.succeeded_count(),
        summary.outcomes.len(),
        "components deployed",
        opts,
    ));
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{AttemptRecord, Component, ComponentOutcome, Tier};
    use crate::health::PodPhase;
    use crate::probe::ProbeTarget;
    use crate::types::ResourceName;
    use chrono::TimeZone;
    use std::path::PathBuf;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn pod(name: &str, phase: PodPhase, ready: u32, restarts: u32) -> PodRecord {
        PodRecord {
            name: name.to_string(),
            phase,
            ready_containers: ready,
            total_containers: 1,
            restart_count: restarts,
            created_at: Some(now() - chrono::TimeDelta::minutes(12)),
            reason: None,
        }
    }

    fn target(name: &str, kind: ProbeKind) -> ProbeTarget {
        ProbeTarget {
            name: ResourceName::new(name).unwrap(),
            local_port: 18080,
            remote_port: 8080,
            kind,
            path: "/".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn pods_table_has_summary_and_glyphs() {
        let pods = vec![
            pod("frontend-7d9", PodPhase::Running, 1, 0),
            pod("cart-5c4", PodPhase::Pending, 0, 7),
        ];
        let text = render_pods(&pods, now(), RenderOptions::plain());

        assert!(text.contains("frontend-7d9"));
        assert!(text.contains("12m"));
        assert!(text.contains("✓"));
        assert!(text.contains("✗"));
        assert!(text.contains("7 ⚠"));
        assert!(text.ends_with("✗ 1/2 pods healthy"));
    }

    #[test]
    fn no_pods_renders_only_the_summary() {
        let text = render_pods(&[], now(), RenderOptions::plain());
        assert_eq!(text, "✓ 0/0 pods healthy");
    }

    #[test]
    fn probe_table_shows_status_and_error() {
        let results = vec![
            ProbeResult::answered(&target("frontend", ProbeKind::Http), Some(301), Duration::from_millis(42)),
            ProbeResult::failed(
                &target("cart", ProbeKind::Tcp),
                Duration::from_secs(5),
                "timed out after 5.0s",
            ),
        ];
        let text = render_probes(&results, RenderOptions::plain());

        assert!(text.contains("301"));
        assert!(text.contains("0.042s"));
        assert!(text.contains("timed out after 5.0s"));
        assert!(text.contains("localhost:18080/"));
        assert!(text.ends_with("✗ 1/2 probes passed"));
    }

    #[test]
    fn colored_output_contains_escape_codes() {
        let text = render_pods(&[], now(), RenderOptions::colored());
        assert!(text.contains("\u{1b}["));
        let plain = render_pods(&[], now(), RenderOptions::plain());
        assert!(!plain.contains("\u{1b}["));
    }

    #[test]
    fn services_are_classified_by_role() {
        let config = Config::from_yaml(
            r#"
deploy:
  middleware: [gomall-mysql]
  services: [frontend, cart]
services:
  - { name: frontend, local_port: 18080, remote_port: 8080, kind: http }
  - { name: cart, local_port: 16883, remote_port: 8883, kind: tcp }
"#,
        )
        .unwrap();
        let roles = ServiceRoles::from_config(&config);

        assert_eq!(roles.classify("gomall-mysql"), ServiceRole::Middleware);
        assert_eq!(roles.classify("frontend"), ServiceRole::Http);
        assert_eq!(roles.classify("cart"), ServiceRole::Tcp);
        assert_eq!(roles.classify("grafana"), ServiceRole::Other);

        let services = vec![ServiceInfo {
            name: "gomall-mysql".to_string(),
            service_type: "ClusterIP".to_string(),
            cluster_ip: "10.96.0.12".to_string(),
            external_ip: "<none>".to_string(),
            ports: vec!["3306/TCP".to_string()],
        }];
        let text = render_services(&services, &roles);
        assert!(text.contains("Middleware"));
        assert!(text.contains("3306/TCP"));
        assert!(text.ends_with("1 services"));
    }

    #[test]
    fn report_shows_unavailable_and_skipped_sections() {
        let report = HealthReport::new(
            now(),
            Section::NotRequested,
            Section::Unavailable("connection refused".to_string()),
            Section::Skipped("pods are not all healthy".to_string()),
        );
        let text = render_report(&report, &ServiceRoles::default(), RenderOptions::plain());

        assert!(text.contains("✗ pods unavailable: connection refused"));
        assert!(text.contains("⚠ probes skipped: pods are not all healthy"));
        assert!(text.contains("✗ cluster unhealthy (2025-03-01 12:00:00 UTC)"));
        assert!(!text.contains("Services"));
    }

    #[test]
    fn quick_render_is_summary_only() {
        let report = HealthReport::new(
            now(),
            Section::NotRequested,
            Section::Ready(vec![pod("cart-1", PodPhase::Running, 1, 0)]),
            Section::Ready(vec![]),
        );
        let text = render_quick(&report, RenderOptions::plain());
        assert_eq!(
            text,
            "✓ 1/1 pods healthy\n✓ 0/0 probes passed\n✓ all checks passed (2025-03-01 12:00:00 UTC)"
        );
    }

    #[test]
    fn deployment_summary_lists_failures_and_skips() {
        let component = |name: &str, tier| Component {
            name: ResourceName::new(name).unwrap(),
            tier,
            manifest_path: PathBuf::from(format!("deploy/{name}")),
        };
        let summary = DeploymentSummary {
            outcomes: vec![
                ComponentOutcome::succeeded(
                    component("gomall-mysql", Tier::Middleware),
                    vec![],
                ),
                ComponentOutcome::failed(
                    component("cart", Tier::Service),
                    vec![AttemptRecord {
                        number: 1,
                        exit_code: Some(1),
                        error_output: "error: unable to recognize \"deploy/cart\"".to_string(),
                    }],
                ),
            ],
            skipped: vec![component("email", Tier::Service)],
        };
        let text = render_deployment(&summary, RenderOptions::plain());

        assert!(text.contains("gomall-mysql"));
        assert!(text.contains("middleware"));
        assert!(text.contains("unable to recognize"));
        assert!(text.contains("⚠ skipped email (deploy/email not found)"));
        assert!(text.ends_with("✗ 1/2 components deployed"));
    }
}
