// ABOUTME: Configuration types and parsing for kubeship.yml.
// ABOUTME: Handles YAML parsing, validation at load time, discovery, and CLI overrides.

mod deploy;
mod deserialize;
mod env_value;
mod probe;
mod probe_kind;

pub use deploy::DeployConfig;
pub use env_value::EnvValue;
pub use probe::{ProbeConfig, ServiceConfig};
pub use probe_kind::ProbeKind;

use crate::error::{Error, Result};
use crate::probe::ProbeTarget;
use crate::types::ResourceName;
use deserialize::deserialize_services;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "kubeship.yml";
pub const CONFIG_FILENAME_ALT: &str = "kubeship.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".kubeship/config.yml";
pub const CONFIG_FILENAME_LEGACY: &str = "monitor_config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Cluster CLI binary.
    #[serde(default = "default_kubectl")]
    pub kubectl: String,

    #[serde(default)]
    pub kubeconfig: Option<EnvValue>,

    /// Delay between health cycles in continuous mode.
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Apply attempts per component.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub deploy: DeployConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(deserialize_with = "deserialize_services")]
    pub services: NonEmpty<ServiceConfig>,

    /// Per-service override of `health_path`.
    #[serde(default)]
    pub health_paths: HashMap<ResourceName, String>,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub source_dir: PathBuf,
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_max_retries() -> u32 {
    3
}

/// Values supplied on the command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub namespace: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub max_retries: Option<u32>,
    pub base_dir: Option<PathBuf>,
    pub sequential: bool,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.source_dir = config_root(path);
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
            dir.join(CONFIG_FILENAME_LEGACY),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Check every cross-field rule serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.namespace.trim().is_empty() {
            return Err(invalid("namespace cannot be empty"));
        }
        if self.max_retries == 0 {
            return Err(invalid("max_retries must be at least 1"));
        }
        if self.probe.concurrency == 0 {
            return Err(invalid("probe.concurrency must be at least 1"));
        }
        if self.deploy.max_parallel == 0 {
            return Err(invalid("deploy.max_parallel must be at least 1"));
        }

        let mut names = HashSet::new();
        let mut ports = HashMap::new();
        for service in &self.services {
            if !service.name.is_service_name() {
                return Err(invalid(format!(
                    "service name {} must start with a letter",
                    service.name
                )));
            }
            if !names.insert(&service.name) {
                return Err(invalid(format!("duplicate service: {}", service.name)));
            }
            if let Some(other) = ports.insert(service.local_port, &service.name) {
                return Err(invalid(format!(
                    "local port {} is used by both {} and {}",
                    service.local_port, other, service.name
                )));
            }
            check_health_path(&service.name, &service.health_path)?;
        }

        for (name, path) in &self.health_paths {
            if !names.contains(name) {
                return Err(invalid(format!(
                    "health_paths refers to unknown service: {}",
                    name
                )));
            }
            check_health_path(name, path)?;
        }

        let middleware: HashSet<_> = self.deploy.middleware.iter().collect();
        if let Some(both) = self
            .deploy
            .services
            .iter()
            .find(|name| middleware.contains(name))
        {
            return Err(invalid(format!(
                "component {} is listed as both middleware and service",
                both
            )));
        }

        Ok(())
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Config> {
        if let Some(ref ns) = overrides.namespace {
            self.namespace = ns.clone();
        }
        if let Some(ref path) = overrides.kubeconfig {
            self.kubeconfig = Some(EnvValue::Literal(path.display().to_string()));
        }
        if let Some(retries) = overrides.max_retries {
            self.max_retries = retries;
        }
        if let Some(ref dir) = overrides.base_dir {
            self.deploy.base_dir = dir.clone();
        }
        if overrides.sequential {
            self.deploy.parallel = false;
        }
        self.validate()?;
        Ok(self)
    }

    /// Resolved kubeconfig path, if one is configured.
    pub fn kubeconfig_path(&self) -> Result<Option<PathBuf>> {
        self.kubeconfig
            .as_ref()
            .map(|value| value.resolve_path(&self.source_dir))
            .transpose()
    }

    /// Resolved manifest base directory.
    pub fn base_dir(&self) -> PathBuf {
        if self.deploy.base_dir.is_absolute() {
            self.deploy.base_dir.clone()
        } else {
            self.source_dir.join(&self.deploy.base_dir)
        }
    }

    /// Probe targets in configuration order, with overrides applied.
    pub fn probe_targets(&self) -> Vec<ProbeTarget> {
        self.services
            .iter()
            .map(|service| ProbeTarget {
                name: service.name.clone(),
                local_port: service.local_port,
                remote_port: service.remote_port,
                kind: service.kind,
                path: self
                    .health_paths
                    .get(&service.name)
                    .cloned()
                    .unwrap_or_else(|| service.health_path.clone()),
                timeout: service.timeout.unwrap_or(self.probe.timeout),
            })
            .collect()
    }

    /// Whether the named component belongs to the middleware tier.
    pub fn is_middleware(&self, name: &str) -> bool {
        self.deploy.middleware.iter().any(|m| m.as_str() == name)
    }

    /// Configured probe kind for a service, if it is monitored.
    pub fn probe_kind(&self, name: &str) -> Option<ProbeKind> {
        self.services
            .iter()
            .find(|s| s.name.as_str() == name)
            .map(|s| s.kind)
    }
}

fn config_root(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    // `.kubeship/config.yml` lives one level below the project root.
    if parent.file_name().is_some_and(|name| name == ".kubeship") {
        parent.parent().unwrap_or(parent).to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

fn check_health_path(service: &ResourceName, path: &str) -> Result<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(invalid(format!(
            "health path for {} must start with '/': {}",
            service, path
        )))
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig(message.into())
}

/// Write a starter configuration for the Gomall demo layout.
pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE)?;
    Ok(config_path)
}

const TEMPLATE: &str = r#"namespace: default
kubeconfig:
  env: KUBECONFIG
  default: kind-kubeconfig.yaml
poll_interval: 60s
max_retries: 3

deploy:
  base_dir: deploy
  middleware: [gomall-mysql, gomall-redis, gomall-consul]
  services: [product, user, cart, checkout, payment, order, email, frontend]
  parallel: true
  retry_delay: 5s

probe:
  timeout: 5s
  concurrency: 4

services:
  - { name: frontend, local_port: 18080, remote_port: 8080, kind: http, health_path: / }
  - { name: product, local_port: 16881, remote_port: 8881, kind: tcp }
  - { name: user, local_port: 16882, remote_port: 8882, kind: tcp }
  - { name: cart, local_port: 16883, remote_port: 8883, kind: tcp }
  - { name: checkout, local_port: 16884, remote_port: 8884, kind: tcp }
  - { name: email, local_port: 16885, remote_port: 8885, kind: tcp }
  - { name: payment, local_port: 16886, remote_port: 8886, kind: tcp }
  - { name: order, local_port: 16887, remote_port: 8885, kind: tcp }
"#;
