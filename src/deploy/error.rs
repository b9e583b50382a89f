// ABOUTME: Error type for a single deploy attempt.
// ABOUTME: Absorbed by the retry loop and surfaced only as attempt records.

use crate::cluster::ClusterError;

/// Why one apply attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// The cluster CLI rejected or could not run the apply.
    #[error("apply failed: {0}")]
    Apply(#[from] ClusterError),

    /// The task running the component's attempts panicked or was cancelled.
    #[error("deploy task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

impl AttemptError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            AttemptError::Apply(e) => e.exit_code(),
            AttemptError::Aborted(_) => None,
        }
    }

    pub fn error_output(&self) -> String {
        match self {
            AttemptError::Apply(e) => e.error_output(),
            AttemptError::Aborted(_) => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn crash() {
        panic!("kubectl wrapper crashed")
    }

    #[tokio::test]
    async fn panicked_task_becomes_an_aborted_attempt() {
        let joined = tokio::spawn(crash()).await;
        let err = AttemptError::from(joined.unwrap_err());

        assert!(matches!(err, AttemptError::Aborted(_)));
        assert_eq!(err.exit_code(), None);
        assert!(err.error_output().starts_with("deploy task aborted"));
    }

    #[test]
    fn apply_failure_keeps_cli_details() {
        let err = AttemptError::from(ClusterError::CommandFailed {
            command: "kubectl apply -f deploy/cart".to_string(),
            exit_code: Some(1),
            stderr: "error: no objects passed to apply\n".to_string(),
        });
        assert_eq!(err.exit_code(), Some(1));
        assert_eq!(err.error_output(), "error: no objects passed to apply");
    }
}
