// ABOUTME: Per-component retry loop expressed as a type state machine.
// ABOUTME: Attempt<Pending> -> Attempt<Attempting> -> Succeeded | Exhausted | back to Pending.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use super::component::Component;
use super::error::AttemptError;
use super::state::{Attempting, Exhausted, Pending, Succeeded};
use super::summary::ComponentOutcome;

/// How many times a component is applied and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// A policy allowing `max_retries` attempts in total. Zero is treated as one.
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// One apply attempt for a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub number: u32,
    pub exit_code: Option<i32>,
    pub error_output: String,
}

impl AttemptRecord {
    fn success(number: u32) -> Self {
        Self {
            number,
            exit_code: Some(0),
            error_output: String::new(),
        }
    }

    fn failure(number: u32, err: &AttemptError) -> Self {
        Self {
            number,
            exit_code: err.exit_code(),
            error_output: err.error_output(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && self.error_output.is_empty()
    }
}

/// The retry loop for one component, parameterized by its current state.
#[derive(Debug)]
pub struct Attempt<S> {
    policy: RetryPolicy,
    history: Vec<AttemptRecord>,
    state: S,
}

/// Where the machine goes after an attempt has been recorded.
#[derive(Debug)]
pub enum Step {
    Succeeded(Attempt<Succeeded>),
    Retry(Attempt<Pending>),
    Exhausted(Attempt<Exhausted>),
}

impl<S> Attempt<S> {
    fn transition<T>(self, state: T) -> Attempt<T> {
        Attempt {
            policy: self.policy,
            history: self.history,
            state,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Attempts made so far.
    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

impl Attempt<Pending> {
    pub fn new(policy: RetryPolicy) -> Self {
        Attempt {
            policy,
            history: Vec::new(),
            state: Pending,
        }
    }

    pub fn begin(self) -> Attempt<Attempting> {
        self.transition(Attempting)
    }
}

impl Attempt<Attempting> {
    /// Number of the attempt in flight.
    pub fn number(&self) -> u32 {
        self.history.len() as u32 + 1
    }

    pub fn succeed(mut self) -> Attempt<Succeeded> {
        let record = AttemptRecord::success(self.number());
        self.history.push(record);
        self.transition(Succeeded)
    }

    pub fn fail(mut self, err: &AttemptError) -> Step {
        let record = AttemptRecord::failure(self.number(), err);
        self.history.push(record);
        if self.history.len() as u32 >= self.policy.max_retries {
            Step::Exhausted(self.transition(Exhausted))
        } else {
            Step::Retry(self.transition(Pending))
        }
    }

    pub fn record(self, result: Result<(), AttemptError>) -> Step {
        match result {
            Ok(()) => Step::Succeeded(self.succeed()),
            Err(err) => self.fail(&err),
        }
    }
}

impl Attempt<Succeeded> {
    pub fn into_history(self) -> Vec<AttemptRecord> {
        self.history
    }
}

impl Attempt<Exhausted> {
    pub fn last_failure(&self) -> Option<&AttemptRecord> {
        self.history.last()
    }

    pub fn into_history(self) -> Vec<AttemptRecord> {
        self.history
    }
}

/// Drive `apply` through the retry machine until it succeeds or the policy runs out.
///
/// `apply` receives the attempt number. The delay is only slept between attempts.
pub async fn run_with_retry<F, Fut>(
    component: &Component,
    policy: RetryPolicy,
    mut apply: F,
) -> ComponentOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(), AttemptError>>,
{
    let mut pending = Attempt::new(policy);

    loop {
        let attempt = pending.begin();
        let number = attempt.number();
        info!(
            component = %component.name,
            attempt = number,
            max = policy.max_retries(),
            "applying manifests"
        );

        let result = apply(number).await;
        match attempt.record(result) {
            Step::Succeeded(done) => {
                info!(component = %component.name, attempt = number, "deployed");
                return ComponentOutcome::succeeded(component.clone(), done.into_history());
            }
            Step::Exhausted(done) => {
                if let Some(last) = done.last_failure() {
                    warn!(
                        component = %component.name,
                        attempts = number,
                        error = %last.error_output,
                        "giving up"
                    );
                }
                return ComponentOutcome::failed(component.clone(), done.into_history());
            }
            Step::Retry(next) => {
                warn!(
                    component = %component.name,
                    attempt = number,
                    delay = ?policy.delay(),
                    "attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay()).await;
                pending = next;
            }
        }
    }
}
