// ABOUTME: Deployment tracker: status board and outcome collection for in-flight components.
// ABOUTME: Joins spawned tasks as they finish instead of polling them on a timer.

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::component::{Component, ComponentStatus};
use super::error::AttemptError;
use super::summary::{ComponentOutcome, DeploymentSummary};
use crate::types::ResourceName;

/// Called once per component, as soon as its outcome is known.
pub type Observer<'a> = Box<dyn Fn(&ComponentOutcome) + Send + 'a>;

/// Tracks each registered component from pending to a terminal outcome.
#[derive(Default)]
pub struct DeploymentTracker<'a> {
    board: Vec<(Component, ComponentStatus)>,
    outcomes: Vec<ComponentOutcome>,
    observer: Option<Observer<'a>>,
}

impl<'a> DeploymentTracker<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: impl Fn(&ComponentOutcome) + Send + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Add a component to the board as pending. Registration order is report order.
    pub fn register(&mut self, component: &Component) {
        if self.position(&component.name).is_none() {
            self.board.push((component.clone(), ComponentStatus::Pending));
        }
    }

    /// Move a pending component to deploying. Terminal statuses are kept.
    pub fn mark_deploying(&mut self, name: &ResourceName) {
        if let Some(i) = self.position(name)
            && self.board[i].1 == ComponentStatus::Pending
        {
            self.board[i].1 = ComponentStatus::Deploying;
        }
    }

    /// Record a terminal outcome and notify the observer.
    pub fn record(&mut self, outcome: ComponentOutcome) {
        self.register(&outcome.component);
        self.set_status(&outcome.component.name, outcome.status.into());
        if let Some(observer) = &self.observer {
            observer(&outcome);
        }
        self.outcomes.push(outcome);
    }

    pub fn status(&self, name: &str) -> Option<ComponentStatus> {
        self.board
            .iter()
            .find(|(c, _)| c.name.as_str() == name)
            .map(|(_, status)| *status)
    }

    /// Components that have not reached a terminal state.
    pub fn in_flight(&self) -> usize {
        self.board
            .iter()
            .filter(|(_, s)| matches!(s, ComponentStatus::Pending | ComponentStatus::Deploying))
            .count()
    }

    /// Wait for every task, recording each outcome the moment its task finishes.
    ///
    /// A task that panics or is cancelled is recorded as failed for its component.
    pub async fn await_all(&mut self, tasks: Vec<(Component, JoinHandle<ComponentOutcome>)>) {
        let (_, started) = mpsc::unbounded_channel();
        self.await_all_with_starts(tasks, started).await;
    }

    /// Like [`await_all`](Self::await_all), and also marks a component as
    /// deploying when its task reports on `started` that it has begun work.
    pub async fn await_all_with_starts(
        &mut self,
        tasks: Vec<(Component, JoinHandle<ComponentOutcome>)>,
        mut started: mpsc::UnboundedReceiver<ResourceName>,
    ) {
        let mut running: FuturesUnordered<_> = tasks
            .into_iter()
            .map(|(component, handle)| async move { (component, handle.await) })
            .collect();
        let mut listening = true;

        while !running.is_empty() {
            tokio::select! {
                // A start is always sent before its task can finish.
                biased;
                name = started.recv(), if listening => match name {
                    Some(name) => self.mark_deploying(&name),
                    None => listening = false,
                },
                Some((component, joined)) = running.next() => {
                    let outcome = match joined {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            let err = AttemptError::from(e);
                            tracing::warn!("{}: {}", component.name, err);
                            ComponentOutcome::aborted(component, err.error_output())
                        }
                    };
                    self.record(outcome);
                }
            }
        }
    }

    /// Freeze the collected outcomes into a summary, in registration order.
    pub fn finish(mut self, skipped: Vec<Component>) -> DeploymentSummary {
        let board = &self.board;
        self.outcomes.sort_by_key(|o| {
            board
                .iter()
                .position(|(c, _)| c.name == o.component.name)
                .unwrap_or(usize::MAX)
        });
        DeploymentSummary {
            outcomes: self.outcomes,
            skipped,
        }
    }

    fn position(&self, name: &ResourceName) -> Option<usize> {
        self.board.iter().position(|(c, _)| &c.name == name)
    }

    fn set_status(&mut self, name: &ResourceName, status: ComponentStatus) {
        if let Some(i) = self.position(name) {
            self.board[i].1 = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::{Outcome, Tier};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    fn component(name: &str) -> Component {
        Component {
            name: ResourceName::new(name).unwrap(),
            tier: Tier::Service,
            manifest_path: PathBuf::from(format!("deploy/{name}")),
        }
    }

    #[test]
    fn status_moves_from_pending_to_terminal() {
        let cart = component("cart");
        let mut tracker = DeploymentTracker::new();
        tracker.register(&cart);
        assert_eq!(tracker.status("cart"), Some(ComponentStatus::Pending));

        tracker.mark_deploying(&cart.name);
        assert_eq!(tracker.status("cart"), Some(ComponentStatus::Deploying));
        assert_eq!(tracker.in_flight(), 1);

        tracker.record(ComponentOutcome::failed(cart, vec![]));
        assert_eq!(tracker.status("cart"), Some(ComponentStatus::Failed));
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn outcomes_are_reported_as_tasks_finish() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut tracker = DeploymentTracker::new().with_observer(move |o: &ComponentOutcome| {
            sink.lock().unwrap().push(o.component.name.to_string());
        });

        let (slow, fast) = (component("slow"), component("fast"));
        tracker.register(&slow);
        tracker.register(&fast);

        let (release, gate) = tokio::sync::oneshot::channel::<()>();
        let slow_task = {
            let slow = slow.clone();
            tokio::spawn(async move {
                let _ = gate.await;
                ComponentOutcome::succeeded(slow, vec![])
            })
        };
        let fast_task = {
            let fast = fast.clone();
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                // The slow task is only released once the fast one has been recorded.
                tokio::spawn(async move {
                    while seen.lock().unwrap().is_empty() {
                        tokio::task::yield_now().await;
                    }
                    let _ = release.send(());
                });
                ComponentOutcome::succeeded(fast, vec![])
            })
        };

        tracker
            .await_all(vec![(slow, slow_task), (fast, fast_task)])
            .await;

        assert_eq!(*seen.lock().unwrap(), vec!["fast", "slow"]);
        let summary = tracker.finish(vec![]);
        let order: Vec<_> = summary.outcomes.iter().map(|o| o.component.name.as_str()).collect();
        assert_eq!(order, vec!["slow", "fast"]);
    }

    async fn explode() -> ComponentOutcome {
        panic!("apply exploded")
    }

    #[tokio::test]
    async fn panicked_task_is_recorded_as_failed() {
        let cart = component("cart");
        let mut tracker = DeploymentTracker::new();
        tracker.register(&cart);

        let task = tokio::spawn(explode());
        tracker.await_all(vec![(cart, task)]).await;

        assert_eq!(tracker.status("cart"), Some(ComponentStatus::Failed));
        let summary = tracker.finish(vec![]);
        assert_eq!(summary.outcomes[0].status, Outcome::Failed);
        assert!(
            summary.outcomes[0]
                .aborted
                .as_deref()
                .unwrap()
                .starts_with("deploy task aborted")
        );
    }

    #[tokio::test]
    async fn queued_tasks_stay_pending_until_they_start() {
        let (running, queued) = (component("running"), component("queued"));
        let mut tracker = DeploymentTracker::new();
        tracker.register(&running);
        tracker.register(&queued);

        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let (_hold, gate) = tokio::sync::watch::channel(());
        let park = |component: Component| {
            let mut gate = gate.clone();
            tokio::spawn(async move {
                let _ = gate.changed().await;
                ComponentOutcome::succeeded(component, vec![])
            })
        };
        let tasks = vec![
            (running.clone(), park(running.clone())),
            (queued.clone(), park(queued.clone())),
        ];
        started_tx.send(running.name.clone()).unwrap();

        let waited = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            tracker.await_all_with_starts(tasks, started_rx),
        )
        .await;

        assert!(waited.is_err());
        assert_eq!(tracker.status("running"), Some(ComponentStatus::Deploying));
        assert_eq!(tracker.status("queued"), Some(ComponentStatus::Pending));
    }

    #[test]
    fn late_start_does_not_reopen_a_finished_component() {
        let cart = component("cart");
        let mut tracker = DeploymentTracker::new();
        tracker.register(&cart);
        tracker.record(ComponentOutcome::succeeded(cart.clone(), vec![]));

        tracker.mark_deploying(&cart.name);
        assert_eq!(tracker.status("cart"), Some(ComponentStatus::Succeeded));
    }
}
