// ABOUTME: Cluster CLI error types with SNAFU context selectors.
// ABOUTME: Classifies kubectl failures so callers can map them onto the error taxonomy.

use snafu::Snafu;

/// Failure of a single call into the cluster CLI.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClusterError {
    #[snafu(display("failed to run {program}: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("`{command}` timed out after {timeout_secs}s"))]
    Timeout { command: String, timeout_secs: u64 },

    #[snafu(display("`{command}` failed ({}): {}", describe_exit(exit_code), stderr.trim()))]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[snafu(display("failed to parse {what}: {source}"))]
    Parse {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display("port-forward for {service} exited early: {}", stderr.trim()))]
    TunnelExited { service: String, stderr: String },

    #[snafu(display("port-forward for {service} not accepting on port {port} after {timeout_ms}ms"))]
    TunnelNotReady {
        service: String,
        port: u16,
        timeout_ms: u128,
    },

    #[snafu(display("local port {port} for {service} is already in use"))]
    TunnelPortInUse {
        service: String,
        port: u16,
        source: std::io::Error,
    },

    #[snafu(display("failed to stop port-forward for {service}: {source}"))]
    TunnelShutdown {
        service: String,
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "killed by signal".to_string(),
    }
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterErrorKind {
    /// The CLI binary could not be started.
    Unavailable,
    /// The call did not finish in time.
    Timeout,
    /// The CLI ran and reported failure.
    Rejected,
    /// The CLI output was not what we expected.
    Malformed,
    /// A port-forward tunnel could not be established.
    Tunnel,
}

impl ClusterError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ClusterErrorKind {
        match self {
            ClusterError::Spawn { .. } => ClusterErrorKind::Unavailable,
            ClusterError::Timeout { .. } => ClusterErrorKind::Timeout,
            ClusterError::CommandFailed { .. } => ClusterErrorKind::Rejected,
            ClusterError::Parse { .. } => ClusterErrorKind::Malformed,
            ClusterError::TunnelExited { .. }
            | ClusterError::TunnelNotReady { .. }
            | ClusterError::TunnelPortInUse { .. }
            | ClusterError::TunnelShutdown { .. } => ClusterErrorKind::Tunnel,
        }
    }

    /// Process exit code, when the CLI ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ClusterError::CommandFailed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    /// Error output suitable for an attempt record.
    pub fn error_output(&self) -> String {
        match self {
            ClusterError::CommandFailed { stderr, .. } | ClusterError::TunnelExited { stderr, .. } => {
                stderr.trim().to_string()
            }
            other => other.to_string(),
        }
    }
}
