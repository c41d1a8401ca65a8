//! PulsarCluster custom resource
//!
//! A broker/bookkeeper deployment within a Pulsar instance, provisioned
//! asynchronously by the control plane.

use super::{Condition, HasConditions, HasGeneration};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PulsarCluster is the Schema for the pulsarclusters API
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cloud.pulsar.io",
    version = "v1alpha1",
    kind = "PulsarCluster",
    namespaced,
    status = "PulsarClusterStatus",
    shortname = "pc",
    printcolumn = r#"{"name":"Instance","type":"string","jsonPath":".spec.instanceName"}"#,
    printcolumn = r#"{"name":"Location","type":"string","jsonPath":".spec.location"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PulsarClusterSpec {
    /// Name of the PulsarInstance this cluster belongs to
    pub instance_name: String,

    /// Deployment location (cloud region or zone)
    pub location: String,

    /// Broker sizing
    #[serde(default)]
    pub broker: BrokerSpec,

    /// BookKeeper sizing
    #[serde(default)]
    pub bookkeeper: BookKeeperSpec,

    /// Cluster feature configuration
    #[serde(default)]
    pub config: ClusterConfig,

    /// Release channel the control plane upgrades this cluster from
    #[serde(default = "default_release_channel")]
    pub release_channel: String,
}

/// Broker sizing
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BrokerSpec {
    /// Number of broker replicas
    #[serde(default = "default_broker_replicas")]
    pub replicas: i32,

    /// Compute resources per broker
    #[serde(default)]
    pub resources: ComputeResources,
}

impl Default for BrokerSpec {
    fn default() -> Self {
        Self {
            replicas: default_broker_replicas(),
            resources: ComputeResources::default(),
        }
    }
}

/// BookKeeper sizing
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookKeeperSpec {
    /// Number of bookie replicas
    #[serde(default = "default_bookie_replicas")]
    pub replicas: i32,

    /// Compute resources per bookie
    #[serde(default)]
    pub resources: ComputeResources,
}

impl Default for BookKeeperSpec {
    fn default() -> Self {
        Self {
            replicas: default_bookie_replicas(),
            resources: ComputeResources::default(),
        }
    }
}

/// Compute resources for a single replica
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResources {
    /// CPU request, e.g. "2"
    #[serde(default)]
    pub cpu: Option<String>,

    /// Memory request, e.g. "8Gi"
    #[serde(default)]
    pub memory: Option<String>,
}

/// Cluster feature configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    /// Enable the WebSocket API
    #[serde(default)]
    pub websocket_enabled: bool,

    /// Enable Pulsar Functions
    #[serde(default)]
    pub function_enabled: bool,

    /// Enable transactions
    #[serde(default)]
    pub transaction_enabled: bool,

    /// Additional protocol listeners
    #[serde(default)]
    pub protocols: ProtocolListeners,

    /// Extra broker configuration overrides
    #[serde(default)]
    pub custom: std::collections::BTreeMap<String, String>,
}

/// Additional protocol listeners
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolListeners {
    /// Enable the Kafka protocol listener
    #[serde(default)]
    pub kafka: bool,

    /// Enable the MQTT protocol listener
    #[serde(default)]
    pub mqtt: bool,
}

/// Status of the PulsarCluster
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PulsarClusterStatus {
    /// Conditions representing cluster state
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Last generation processed by the control plane
    #[serde(default)]
    pub observed_generation: Option<i64>,

    /// Number of broker replicas currently ready
    #[serde(default)]
    pub ready_replicas: i32,

    /// Service endpoints exposed by the cluster
    #[serde(default)]
    pub service_endpoints: Vec<ServiceEndpoint>,
}

/// A single service endpoint exposed by a cluster
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    /// Endpoint type (service, websocket, kafka, mqtt)
    pub r#type: String,
    /// Endpoint URI
    pub uri: String,
}

impl HasConditions for PulsarCluster {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}

impl HasGeneration for PulsarCluster {
    fn generation(&self) -> Option<i64> {
        self.metadata.generation
    }

    fn observed_generation(&self) -> Option<i64> {
        self.status.as_ref().and_then(|s| s.observed_generation)
    }
}

// Default value functions
fn default_broker_replicas() -> i32 {
    2
}

fn default_bookie_replicas() -> i32 {
    3
}

fn default_release_channel() -> String {
    "stable".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_spec_defaults() {
        let json = r#"{"instanceName": "prod", "location": "us-east1"}"#;
        let spec: PulsarClusterSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.instance_name, "prod");
        assert_eq!(spec.broker.replicas, 2);
        assert_eq!(spec.bookkeeper.replicas, 3);
        assert_eq!(spec.release_channel, "stable");
        assert!(!spec.config.websocket_enabled);
        assert!(!spec.config.protocols.kafka);
    }

    #[test]
    fn test_status_generation_accessors() {
        let json = r#"{
            "apiVersion": "cloud.pulsar.io/v1alpha1",
            "kind": "PulsarCluster",
            "metadata": {"name": "demo", "namespace": "acme", "generation": 3},
            "spec": {"instanceName": "prod", "location": "us-east1"},
            "status": {"observedGeneration": 2}
        }"#;
        let cluster: PulsarCluster = serde_json::from_str(json).unwrap();
        assert_eq!(cluster.generation(), Some(3));
        assert_eq!(cluster.observed_generation(), Some(2));
        assert!(cluster.conditions().is_empty());
    }

    #[test]
    fn test_service_endpoint_roundtrip() {
        let json = r#"{"type": "service", "uri": "pulsar+ssl://demo.acme.example:6651"}"#;
        let ep: ServiceEndpoint = serde_json::from_str(json).unwrap();
        assert_eq!(ep.r#type, "service");
    }
}
