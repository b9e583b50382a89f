// ABOUTME: Endpoint probing through port-forward tunnels.
// ABOUTME: Exposes probe targets, results, and the concurrent prober.

mod http;
mod prober;
mod target;

pub use http::{EndpointCheck, check_endpoint};
pub use prober::Prober;
pub use target::{PASSING_STATUSES, ProbeResult, ProbeTarget, is_passing_status};
