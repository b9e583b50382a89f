// ABOUTME: Kubernetes object names used for components and services.
// ABOUTME: Validates DNS-1123 labels, with a stricter DNS-1035 check for Service objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest label the API server accepts.
pub const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceNameError {
    #[error("resource name cannot be empty")]
    Empty,

    #[error("resource name is {len} characters, Kubernetes allows at most {MAX_LABEL_LEN}")]
    TooLong { len: usize },

    #[error("resource name {name:?} has '{ch}' at position {index}; use lowercase letters, digits and '-'")]
    InvalidChar { name: String, ch: char, index: usize },

    #[error("resource name {name:?} must start and end with a lowercase letter or digit")]
    BadBoundary { name: String },
}

/// Name of a deployable component or a cluster Service: a DNS-1123 label.
///
/// Parsed once from configuration; everything downstream trusts it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(value: &str) -> Result<Self, ResourceNameError> {
        if value.is_empty() {
            return Err(ResourceNameError::Empty);
        }
        if value.len() > MAX_LABEL_LEN {
            return Err(ResourceNameError::TooLong { len: value.len() });
        }
        if let Some((index, ch)) = value
            .char_indices()
            .find(|(_, c)| !is_label_char(*c))
        {
            return Err(ResourceNameError::InvalidChar {
                name: value.to_string(),
                ch,
                index,
            });
        }
        // Only '-' can sit in the middle but not at the ends.
        if value.starts_with('-') || value.ends_with('-') {
            return Err(ResourceNameError::BadBoundary {
                name: value.to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Service objects use the stricter DNS-1035 rule: the first character
    /// must be a letter. Deployments and directories may start with a digit.
    pub fn is_service_name(&self) -> bool {
        self.0.starts_with(|c: char| c.is_ascii_lowercase())
    }
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

impl FromStr for ResourceName {
    type Err = ResourceNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceName {
    type Error = ResourceNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ResourceName> for String {
    fn from(name: ResourceName) -> Self {
        name.0
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
