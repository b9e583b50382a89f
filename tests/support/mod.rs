// ABOUTME: Test support utilities.
// ABOUTME: Provides cluster and tunnel doubles, an HTTP responder, and manifest tree helpers.

use std::path::Path;
use std::sync::Once;

// Each test binary only uses some of these modules, so allow dead_code.
#[allow(dead_code)]
pub mod fake_cluster;
#[allow(dead_code)]
pub mod http;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("kubeship=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Create `<base>/<name>/deployment.yaml` for each name.
#[allow(dead_code)]
pub fn manifest_tree(base: &Path, names: &[&str]) {
    for name in names {
        let dir = base.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("deployment.yaml"),
            format!("apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: {name}\n"),
        )
        .unwrap();
    }
}
