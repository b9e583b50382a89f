// ABOUTME: Probe kind selection for monitored services.
// ABOUTME: Supports http (GET against a health path) and tcp (port accepts connections).

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeKind {
    /// Issue an HTTP GET and judge the status code.
    #[default]
    Http,
    /// Only check that the port accepts a TCP connection (gRPC services).
    Tcp,
}

impl FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(ProbeKind::Http),
            "tcp" | "grpc" => Ok(ProbeKind::Tcp),
            _ => Err(format!("unknown probe kind: {} (expected http or tcp)", s)),
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Http => write!(f, "http"),
            ProbeKind::Tcp => write!(f, "tcp"),
        }
    }
}

impl<'de> Deserialize<'de> for ProbeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for ProbeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
