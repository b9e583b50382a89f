// ABOUTME: Terminal outcomes of a deployment run.
// ABOUTME: DeploymentSummary is the immutable result handed to the renderer.

use serde::Serialize;

use super::attempt::AttemptRecord;
use super::component::{Component, ComponentStatus};
use crate::report::Verdict;

/// Terminal result for one component. There is no partial or unknown value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl From<Outcome> for ComponentStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Succeeded => ComponentStatus::Succeeded,
            Outcome::Failed => ComponentStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentOutcome {
    pub component: Component,
    pub status: Outcome,
    pub attempts: Vec<AttemptRecord>,
    /// Set when the component's task died before reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl ComponentOutcome {
    pub fn succeeded(component: Component, attempts: Vec<AttemptRecord>) -> Self {
        Self {
            component,
            status: Outcome::Succeeded,
            attempts,
            aborted: None,
        }
    }

    pub fn failed(component: Component, attempts: Vec<AttemptRecord>) -> Self {
        Self {
            component,
            status: Outcome::Failed,
            attempts,
            aborted: None,
        }
    }

    pub fn aborted(component: Component, reason: impl Into<String>) -> Self {
        Self {
            component,
            status: Outcome::Failed,
            attempts: Vec::new(),
            aborted: Some(reason.into()),
        }
    }

    pub fn succeeded_ok(&self) -> bool {
        self.status == Outcome::Succeeded
    }

    /// Error output of the last failed attempt, for display.
    pub fn last_error(&self) -> Option<&str> {
        if let Some(reason) = &self.aborted {
            return Some(reason);
        }
        self.attempts
            .iter()
            .rev()
            .find(|a| !a.succeeded())
            .map(|a| a.error_output.as_str())
    }
}

/// Every attempted component's outcome, in deployment order, plus what was skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploymentSummary {
    pub outcomes: Vec<ComponentOutcome>,
    /// Components whose manifest directory was missing. Not failures.
    pub skipped: Vec<Component>,
}

impl DeploymentSummary {
    /// True iff every attempted component succeeded.
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(ComponentOutcome::succeeded_ok)
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ComponentOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded_ok())
    }

    pub fn outcome(&self, name: &str) -> Option<&ComponentOutcome> {
        self.outcomes.iter().find(|o| o.component.name.as_str() == name)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_success(self.success())
    }
}
