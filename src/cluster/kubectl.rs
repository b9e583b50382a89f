// ABOUTME: kubectl-backed implementation of the cluster capability traits.
// ABOUTME: Runs the CLI as a child process with the configured kubeconfig and timeouts.

use super::error::{ClusterError, ParseSnafu, SpawnSnafu};
use super::pods::parse_pod_list;
use super::services::{ServiceInfo, parse_service_list};
use super::traits::{ApplyRequest, ClusterOps, TunnelOps, TunnelRequest};
use super::tunnel::{Tunnel, ensure_port_free};
use crate::config::Config;
use crate::error::{Error, Result as AppResult};
use crate::health::PodRecord;
use async_trait::async_trait;
use snafu::ResultExt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default limit for read-only queries (`get`, `version`).
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured output of one CLI invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Cluster access through the `kubectl` binary.
#[derive(Debug, Clone)]
pub struct Kubectl {
    program: String,
    kubeconfig: Option<PathBuf>,
    query_timeout: Duration,
}

impl Kubectl {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            kubeconfig: None,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Build from configuration, resolving the kubeconfig path.
    ///
    /// A configured kubeconfig must exist: kubectl silently ignores missing
    /// `KUBECONFIG` entries and falls back to its default server.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let kubeconfig = config.kubeconfig_path()?;
        if let Some(ref path) = kubeconfig
            && !path.is_file()
        {
            return Err(Error::Configuration(format!(
                "kubeconfig file not found: {}",
                path.display()
            )));
        }
        Ok(Self::new(&config.kubectl).kubeconfig(kubeconfig))
    }

    pub fn kubeconfig(mut self, path: Option<PathBuf>) -> Self {
        self.kubeconfig = path;
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
        if let Some(ref kubeconfig) = self.kubeconfig {
            cmd.env("KUBECONFIG", kubeconfig);
        }
        cmd
    }

    fn describe(&self, args: &[String]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }

    /// Run the CLI to completion, optionally bounded by a timeout.
    pub async fn run(
        &self,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, ClusterError> {
        let command = self.describe(args);
        tracing::debug!("running {}", command);

        let mut cmd = self.command(args);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, cmd.output()).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    return Err(ClusterError::Timeout {
                        command,
                        timeout_secs: limit.as_secs(),
                    });
                }
            },
            None => cmd.output().await,
        }
        .context(SpawnSnafu {
            program: self.program.clone(),
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Run the CLI and turn a non-zero exit into an error.
    async fn run_checked(
        &self,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<String, ClusterError> {
        let output = self.run(args, timeout).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(ClusterError::CommandFailed {
                command: self.describe(args),
                exit_code: output.exit_code,
                stderr: output.stderr,
            })
        }
    }
}

fn args<const N: usize>(parts: [&str; N]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl ClusterOps for Kubectl {
    async fn client_version(&self) -> Result<String, ClusterError> {
        let stdout = self
            .run_checked(&args(["version", "--client"]), Some(self.query_timeout))
            .await?;
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    async fn apply(&self, request: &ApplyRequest<'_>) -> Result<String, ClusterError> {
        let mut argv = args(["apply", "-n", request.namespace, "-f"]);
        argv.push(request.manifest_dir.display().to_string());
        if request.recursive {
            argv.push("-R".to_string());
        }
        // Applies block for as long as the CLI does.
        self.run_checked(&argv, None).await
    }

    async fn list_pods(&self, namespace: &str) -> Result<Vec<PodRecord>, ClusterError> {
        let stdout = self
            .run_checked(
                &args(["get", "pods", "-n", namespace, "-o", "json"]),
                Some(self.query_timeout),
            )
            .await?;
        parse_pod_list(&stdout).context(ParseSnafu { what: "pod list" })
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<ServiceInfo>, ClusterError> {
        let stdout = self
            .run_checked(
                &args(["get", "services", "-n", namespace, "-o", "json"]),
                Some(self.query_timeout),
            )
            .await?;
        parse_service_list(&stdout).context(ParseSnafu {
            what: "service list",
        })
    }
}

#[async_trait]
impl TunnelOps for Kubectl {
    async fn open_tunnel(&self, request: &TunnelRequest<'_>) -> Result<Tunnel, ClusterError> {
        let target = format!("service/{}", request.service);
        let ports = format!("{}:{}", request.local_port, request.remote_port);
        let argv = args([
            "port-forward",
            "-n",
            request.namespace,
            "--address",
            "127.0.0.1",
            target.as_str(),
            ports.as_str(),
        ]);
        ensure_port_free(request.service.as_str(), request.local_port).await?;
        tracing::debug!("opening tunnel: {}", self.describe(&argv));

        let child = self
            .command(&argv)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context(SpawnSnafu {
                program: self.program.clone(),
            })?;

        Tunnel::with_child(request.service.as_str(), request.local_port, child)
            .wait_ready(request.ready_timeout)
            .await
    }
}
