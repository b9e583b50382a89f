// ABOUTME: Parsing of `kubectl get services -o json` output.
// ABOUTME: Produces display-ready service summaries for the services info table.

use serde::{Deserialize, Serialize};

/// One Kubernetes service as shown in the services info table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub service_type: String,
    pub cluster_ip: String,
    pub external_ip: String,
    pub ports: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceList {
    #[serde(default)]
    items: Vec<Service>,
}

#[derive(Debug, Deserialize)]
struct Service {
    metadata: Metadata,
    #[serde(default)]
    spec: ServiceSpec,
    #[serde(default)]
    status: ServiceStatus,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceSpec {
    #[serde(default, rename = "type")]
    service_type: Option<String>,
    #[serde(default, rename = "clusterIP")]
    cluster_ip: Option<String>,
    #[serde(default, rename = "externalIPs")]
    external_ips: Vec<String>,
    #[serde(default)]
    ports: Vec<ServicePort>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServicePort {
    port: u16,
    #[serde(default)]
    node_port: Option<u16>,
    #[serde(default)]
    protocol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceStatus {
    #[serde(default)]
    load_balancer: LoadBalancerStatus,
}

#[derive(Debug, Default, Deserialize)]
struct LoadBalancerStatus {
    #[serde(default)]
    ingress: Vec<Ingress>,
}

#[derive(Debug, Deserialize)]
struct Ingress {
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    hostname: Option<String>,
}

/// Name of the API server's own service, present in every default namespace.
const API_SERVICE: &str = "kubernetes";

/// Parse a service list JSON document, dropping the API server service.
pub fn parse_service_list(json: &str) -> Result<Vec<ServiceInfo>, serde_json::Error> {
    let list: ServiceList = serde_json::from_str(json)?;
    Ok(list
        .items
        .into_iter()
        .filter(|svc| svc.metadata.name != API_SERVICE)
        .map(into_info)
        .collect())
}

fn into_info(svc: Service) -> ServiceInfo {
    let service_type = svc
        .spec
        .service_type
        .unwrap_or_else(|| "ClusterIP".to_string());

    let mut external: Vec<String> = svc
        .status
        .load_balancer
        .ingress
        .into_iter()
        .filter_map(|i| i.ip.or(i.hostname))
        .collect();
    external.extend(svc.spec.external_ips);

    let external_ip = if !external.is_empty() {
        external.join(",")
    } else if service_type == "LoadBalancer" {
        "<pending>".to_string()
    } else {
        "<none>".to_string()
    };

    let ports = svc
        .spec
        .ports
        .iter()
        .map(|p| {
            let protocol = p.protocol.as_deref().unwrap_or("TCP");
            match p.node_port {
                Some(node) => format!("{}:{}/{}", p.port, node, protocol),
                None => format!("{}/{}", p.port, protocol),
            }
        })
        .collect();

    ServiceInfo {
        name: svc.metadata.name,
        service_type,
        cluster_ip: svc.spec.cluster_ip.unwrap_or_else(|| "<none>".to_string()),
        external_ip,
        ports,
    }
}
