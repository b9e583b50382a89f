// ABOUTME: Application-wide error types for kubeship.
// ABOUTME: Uses thiserror for ergonomic error handling and maps fatal errors to exit codes.

use std::path::PathBuf;
use thiserror::Error;

use crate::cluster::ClusterError;

/// Exit code for a run that completed but whose verdict is unhealthy or failed.
pub const EXIT_UNHEALTHY: i32 = 1;

/// Exit code for a run aborted by a fatal error.
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Deployment inputs are missing or unusable (e.g. no manifest directory).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The cluster CLI cannot be used at all.
    #[error("environment error: {0}")]
    Environment(#[source] ClusterError),

    /// The cluster API could not be reached during a check.
    #[error("connectivity error: {0}")]
    Connectivity(#[source] ClusterError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error.
    ///
    /// Connectivity problems are a health verdict, everything else aborts the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Connectivity(_) => EXIT_UNHEALTHY,
            _ => EXIT_FATAL,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
