// ABOUTME: Overall pass/fail verdict for a deployment or a health cycle.
// ABOUTME: Maps onto the process exit code independently of any rendered text.

use serde::Serialize;
use std::fmt;

use crate::error::EXIT_UNHEALTHY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Healthy,
    Unhealthy,
}

impl Verdict {
    pub fn from_success(success: bool) -> Self {
        if success {
            Verdict::Healthy
        } else {
            Verdict::Unhealthy
        }
    }

    pub fn is_healthy(self) -> bool {
        self == Verdict::Healthy
    }

    /// 0 when healthy, 1 otherwise.
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Healthy => 0,
            Verdict::Unhealthy => EXIT_UNHEALTHY,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Healthy => write!(f, "healthy"),
            Verdict::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(Verdict::Healthy.exit_code(), 0);
        assert_eq!(Verdict::Unhealthy.exit_code(), 1);
        assert_eq!(Verdict::from_success(false), Verdict::Unhealthy);
    }
}
