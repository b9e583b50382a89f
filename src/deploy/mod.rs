// ABOUTME: Manifest deployment with per-component retry state machines.
// ABOUTME: Exports components, the retry machine, the tracker, and the deployer.

mod attempt;
mod component;
mod deployer;
mod error;
mod state;
mod summary;
mod tracker;

pub use attempt::{Attempt, AttemptRecord, RetryPolicy, Step, run_with_retry};
pub use component::{Component, ComponentStatus, ResolvedComponents, Tier, resolve_components};
pub use deployer::{DeployPlan, Deployer};
pub use error::AttemptError;
pub use state::{Attempting, Exhausted, Pending, Succeeded};
pub use summary::{ComponentOutcome, DeploymentSummary, Outcome};
pub use tracker::{DeploymentTracker, Observer};
