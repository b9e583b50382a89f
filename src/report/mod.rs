// ABOUTME: Health reports, verdicts, and their text rendering.
// ABOUTME: The renderer is pure: the same report always renders to the same text.

mod health;
mod render;
mod verdict;

pub use health::{HealthReport, Section};
pub use render::{
    RenderOptions, ServiceRole, ServiceRoles, render_deployment, render_pods, render_probes,
    render_quick, render_report, render_services,
};
pub use verdict::Verdict;
