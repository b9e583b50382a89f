// ABOUTME: In-memory cluster and tunnel doubles.
// ABOUTME: Records every call in order and fails on demand.

use async_trait::async_trait;
use kubeship::cluster::{
    ApplyRequest, ClusterError, ClusterOps, ServiceInfo, Tunnel, TunnelOps, TunnelRequest,
};
use kubeship::health::{PodPhase, PodRecord};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Version,
    Apply(String),
    ListPods,
    ListServices,
}

/// A cluster that accepts every apply unless told otherwise.
pub struct FakeCluster {
    calls: Mutex<Vec<Call>>,
    /// Remaining failures per component; `u32::MAX` fails forever.
    failures: Mutex<HashMap<String, u32>>,
    pods: Mutex<Vec<PodRecord>>,
    services: Mutex<Vec<ServiceInfo>>,
    connected: AtomicBool,
    installed: bool,
    apply_delay: Duration,
}

impl Default for FakeCluster {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            pods: Mutex::new(Vec::new()),
            services: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
            installed: true,
            apply_delay: Duration::ZERO,
        }
    }
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// `client_version` fails as if kubectl were not installed.
    pub fn not_installed() -> Self {
        Self {
            installed: false,
            ..Self::default()
        }
    }

    pub fn with_apply_delay(mut self, delay: Duration) -> Self {
        self.apply_delay = delay;
        self
    }

    pub fn with_pods(self, pods: Vec<PodRecord>) -> Self {
        *self.pods.lock() = pods;
        self
    }

    pub fn with_services(self, services: Vec<ServiceInfo>) -> Self {
        *self.services.lock() = services;
        self
    }

    /// Reject the next `times` applies of `component`.
    pub fn fail_applies(self, component: &str, times: u32) -> Self {
        self.failures.lock().insert(component.to_string(), times);
        self
    }

    pub fn always_fail(self, component: &str) -> Self {
        self.fail_applies(component, u32::MAX)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Components in the order their applies were issued, repeats included.
    pub fn applies(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Apply(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn apply_count(&self, component: &str) -> usize {
        self.applies().iter().filter(|n| *n == component).count()
    }

    fn unreachable(&self, command: &str) -> Result<(), ClusterError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ClusterError::CommandFailed {
                command: command.to_string(),
                exit_code: Some(1),
                stderr: "The connection to the server 127.0.0.1:6443 was refused".to_string(),
            })
        }
    }
}

#[async_trait]
impl ClusterOps for FakeCluster {
    async fn client_version(&self) -> Result<String, ClusterError> {
        self.calls.lock().push(Call::Version);
        if self.installed {
            Ok("Client Version: v1.31.0".to_string())
        } else {
            Err(ClusterError::Spawn {
                program: "kubectl".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            })
        }
    }

    async fn apply(&self, request: &ApplyRequest<'_>) -> Result<String, ClusterError> {
        let name = request.component.to_string();
        self.calls.lock().push(Call::Apply(name.clone()));
        if !self.apply_delay.is_zero() {
            tokio::time::sleep(self.apply_delay).await;
        }

        let rejected = {
            let mut failures = self.failures.lock();
            match failures.get_mut(&name) {
                Some(remaining) if *remaining > 0 => {
                    if *remaining != u32::MAX {
                        *remaining -= 1;
                    }
                    true
                }
                _ => false,
            }
        };

        if rejected {
            Err(ClusterError::CommandFailed {
                command: format!("kubectl apply -f {}", request.manifest_dir.display()),
                exit_code: Some(1),
                stderr: format!("error: unable to recognize \"{}\"", name),
            })
        } else {
            Ok(format!("deployment.apps/{name} configured"))
        }
    }

    async fn list_pods(&self, _namespace: &str) -> Result<Vec<PodRecord>, ClusterError> {
        self.calls.lock().push(Call::ListPods);
        self.unreachable("kubectl get pods")?;
        Ok(self.pods.lock().clone())
    }

    async fn list_services(&self, _namespace: &str) -> Result<Vec<ServiceInfo>, ClusterError> {
        self.calls.lock().push(Call::ListServices);
        self.unreachable("kubectl get services")?;
        Ok(self.services.lock().clone())
    }
}

/// Tunnels that point straight at local ports; nothing is forwarded.
#[derive(Default)]
pub struct FakeTunnels {
    opened: Mutex<Vec<(String, u16)>>,
    broken: Mutex<Vec<String>>,
    stuck: Mutex<Vec<String>>,
}

impl FakeTunnels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opening a tunnel to `service` fails.
    pub fn break_service(self, service: &str) -> Self {
        self.broken.lock().push(service.to_string());
        self
    }

    /// Closing the tunnel to `service` fails.
    pub fn fail_close(self, service: &str) -> Self {
        self.stuck.lock().push(service.to_string());
        self
    }

    pub fn opened(&self) -> Vec<(String, u16)> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl TunnelOps for FakeTunnels {
    async fn open_tunnel(&self, request: &TunnelRequest<'_>) -> Result<Tunnel, ClusterError> {
        let service = request.service.to_string();
        self.opened.lock().push((service.clone(), request.local_port));
        if self.broken.lock().contains(&service) {
            return Err(ClusterError::TunnelExited {
                service,
                stderr: "error: services \"missing\" not found".to_string(),
            });
        }
        Ok(Tunnel::detached(service, request.local_port))
    }

    async fn close_tunnel(&self, tunnel: Tunnel) -> Result<(), ClusterError> {
        let service = tunnel.service().to_string();
        if self.stuck.lock().contains(&service) {
            return Err(ClusterError::TunnelShutdown {
                service,
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "operation not permitted",
                ),
            });
        }
        tunnel.close().await.map_err(|source| ClusterError::TunnelShutdown { service, source })
    }
}

pub fn running_pod(name: &str) -> PodRecord {
    PodRecord {
        name: name.to_string(),
        phase: PodPhase::Running,
        ready_containers: 1,
        total_containers: 1,
        restart_count: 0,
        created_at: None,
        reason: None,
    }
}

pub fn crashing_pod(name: &str) -> PodRecord {
    PodRecord {
        name: name.to_string(),
        phase: PodPhase::Running,
        ready_containers: 0,
        total_containers: 1,
        restart_count: 9,
        created_at: None,
        reason: Some("CrashLoopBackOff".to_string()),
    }
}
