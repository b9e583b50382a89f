// ABOUTME: Port-forward tunnel handle with unconditional release.
// ABOUTME: Wraps a `kubectl port-forward` child process and waits for the local port to open.

use super::error::{ClusterError, TunnelPortInUseSnafu};
use snafu::ResultExt;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::process::Child;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fail if something already listens on the local port.
///
/// Readiness is detected by connecting to that port, so a foreign listener
/// would otherwise pass for the forwarder.
pub(crate) async fn ensure_port_free(service: &str, port: u16) -> Result<(), ClusterError> {
    TcpListener::bind(("127.0.0.1", port))
        .await
        .map(drop)
        .context(TunnelPortInUseSnafu {
            service: service.to_string(),
            port,
        })
}

/// Handle for an open tunnel. Dropping it kills the forwarder.
#[derive(Debug)]
pub struct Tunnel {
    service: String,
    local_port: u16,
    child: Option<Child>,
}

impl Tunnel {
    /// A tunnel whose forwarder is managed elsewhere (or not needed at all).
    pub fn detached(service: impl Into<String>, local_port: u16) -> Self {
        Self {
            service: service.into(),
            local_port,
            child: None,
        }
    }

    pub(crate) fn with_child(service: impl Into<String>, local_port: u16, child: Child) -> Self {
        Self {
            service: service.into(),
            local_port,
            child: Some(child),
        }
    }

    pub fn local_port(&self) -> u16 {
        self.local_port
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Wait until the local port accepts TCP connections.
    ///
    /// Fails early if the forwarder exits, and kills it if the deadline passes.
    pub(crate) async fn wait_ready(mut self, timeout: Duration) -> Result<Self, ClusterError> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Some(child) = self.child.as_mut()
                && let Ok(Some(status)) = child.try_wait()
            {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = pipe.read_to_string(&mut stderr).await;
                }
                if stderr.trim().is_empty() {
                    stderr = format!("forwarder exited with {status}");
                }
                return Err(ClusterError::TunnelExited {
                    service: self.service.clone(),
                    stderr,
                });
            }

            if TcpStream::connect(("127.0.0.1", self.local_port))
                .await
                .is_ok()
            {
                tracing::debug!(
                    "tunnel for {} ready on port {}",
                    self.service,
                    self.local_port
                );
                return Ok(self);
            }

            if tokio::time::Instant::now() >= deadline {
                let service = self.service.clone();
                let port = self.local_port;
                if let Err(e) = self.close().await {
                    tracing::debug!("failed to stop unready tunnel for {}: {}", service, e);
                }
                return Err(ClusterError::TunnelNotReady {
                    service,
                    port,
                    timeout_ms: timeout.as_millis(),
                });
            }

            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Stop the forwarder and reap it.
    pub async fn close(mut self) -> std::io::Result<()> {
        match self.child.take() {
            Some(mut child) => {
                // An already-exited forwarder is fine.
                if child.try_wait()?.is_none() {
                    child.kill().await?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }
}
