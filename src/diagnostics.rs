// ABOUTME: Diagnostics accumulator for non-fatal warnings during a run.
// ABOUTME: Collects problems that must not fail a deployment or check but should be shown to users.

use serde::Serialize;

/// Collects non-fatal warnings during deploy and check operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A configured component has no manifest directory.
    pub fn skipped_component(name: impl std::fmt::Display, path: &std::path::Path) -> Self {
        Self {
            kind: WarningKind::SkippedComponent,
            message: format!("skipping {}: {} not found", name, path.display()),
        }
    }

    /// A configured tier ended up with nothing to apply.
    pub fn empty_tier(tier: impl std::fmt::Display) -> Self {
        Self {
            kind: WarningKind::EmptyTier,
            message: format!("no {tier} manifests found, tier skipped"),
        }
    }

    /// A port-forward could not be stopped after its probe.
    pub fn tunnel_shutdown(service: impl std::fmt::Display, error: impl std::fmt::Display) -> Self {
        Self {
            kind: WarningKind::TunnelShutdown,
            message: format!("tunnel for {service} was not shut down cleanly: {error}"),
        }
    }
}

/// Categories of non-fatal warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Manifest directory missing; the component is not deployed.
    SkippedComponent,
    /// Every component of a tier was skipped.
    EmptyTier,
    /// A probe's tunnel did not stop cleanly; the probe result still stands.
    TunnelShutdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::skipped_component("email", Path::new("deploy/email")));
        diag.warn(Warning::empty_tier("middleware"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
        assert_eq!(diag.of_kind(WarningKind::SkippedComponent).count(), 1);
    }

    #[test]
    fn warning_messages_name_the_component() {
        let warning = Warning::skipped_component("email", Path::new("deploy/email"));
        assert_eq!(warning.kind, WarningKind::SkippedComponent);
        assert_eq!(warning.message, "skipping email: deploy/email not found");

        let tier = Warning::empty_tier("service");
        assert_eq!(tier.kind, WarningKind::EmptyTier);
        assert!(tier.message.contains("no service manifests"));

        let tunnel = Warning::tunnel_shutdown("cart", "permission denied");
        assert_eq!(tunnel.kind, WarningKind::TunnelShutdown);
        assert!(tunnel.message.starts_with("tunnel for cart"));
        assert!(tunnel.message.ends_with("permission denied"));
    }

    #[test]
    fn warnings_serialize_with_snake_case_kind() {
        let json = serde_json::to_value(Warning::tunnel_shutdown("cart", "boom")).unwrap();
        assert_eq!(json["kind"], "tunnel_shutdown");
        assert!(json["message"].as_str().unwrap().contains("cart"));
    }
}
