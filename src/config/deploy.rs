// ABOUTME: Manifest deployment configuration.
// ABOUTME: Lists the middleware and service tiers plus retry and parallelism settings.

use crate::types::ResourceName;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
    /// Directory holding one manifest directory per component.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Applied first, strictly in order.
    #[serde(default)]
    pub middleware: Vec<ResourceName>,

    /// Applied after every middleware component has been applied.
    #[serde(default)]
    pub services: Vec<ResourceName>,

    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    #[serde(default = "default_retry_delay", with = "humantime_serde")]
    pub retry_delay: Duration,

    /// Pass `-R` to `kubectl apply` so nested directories are applied too.
    #[serde(default)]
    pub recursive: bool,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from("deploy")
}

fn default_parallel() -> bool {
    true
}

fn default_max_parallel() -> usize {
    8
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(5)
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            base_dir: default_base_dir(),
            middleware: Vec::new(),
            services: Vec::new(),
            parallel: default_parallel(),
            max_parallel: default_max_parallel(),
            retry_delay: default_retry_delay(),
            recursive: false,
        }
    }
}
