// ABOUTME: Shared setup for commands that talk to the cluster.
// ABOUTME: Loads configuration with CLI overrides and verifies kubectl can run.

use kubeship::cluster::{ClusterOps, Kubectl};
use kubeship::config::{Config, Overrides};
use kubeship::error::{Error, Result};
use std::env;
use std::path::Path;

/// Load the given config file, or discover one in the working directory.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<Config> {
    let config = match path {
        Some(path) if !path.is_file() => return Err(Error::ConfigNotFound(path.to_path_buf())),
        Some(path) => Config::load(path)?,
        None => Config::discover(&env::current_dir()?)?,
    };
    config.with_overrides(overrides)
}

/// Build a kubectl client and make sure the binary runs.
pub async fn connect(config: &Config) -> Result<Kubectl> {
    let kubectl = Kubectl::from_config(config)?;
    let version = kubectl.client_version().await.map_err(Error::Environment)?;
    tracing::debug!("kubectl client: {}", version);
    Ok(kubectl)
}
