// ABOUTME: Config values that may come from the environment.
// ABOUTME: Used for the kubeconfig path so KUBECONFIG can override the file.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) if !val.is_empty() => Ok(val),
                _ => default
                    .clone()
                    .ok_or_else(|| Error::MissingEnvVar(var.clone())),
            },
        }
    }

    /// Resolve as a filesystem path, anchoring relative paths at `base`.
    pub fn resolve_path(&self, base: &Path) -> Result<PathBuf> {
        let raw = PathBuf::from(self.resolve()?);
        if raw.is_absolute() {
            Ok(raw)
        } else {
            Ok(base.join(raw))
        }
    }
}
