//! PulsarInstance custom resource
//!
//! A logical Pulsar instance within an organization. Clusters are created
//! inside an instance; the instance binds them to a node pool.

use super::{Condition, HasConditions, HasGeneration};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PulsarInstance is the Schema for the pulsarinstances API
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cloud.pulsar.io",
    version = "v1alpha1",
    kind = "PulsarInstance",
    namespaced,
    status = "InstanceStatus",
    shortname = "pi",
    printcolumn = r#"{"name":"Type","type":"string","jsonPath":".spec.type"}"#,
    printcolumn = r#"{"name":"Availability","type":"string","jsonPath":".spec.availabilityMode"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    /// Availability mode (zonal or regional)
    #[serde(default = "default_availability_mode")]
    pub availability_mode: String,

    /// Instance type (serverless or dedicated)
    #[serde(default = "default_instance_type")]
    pub r#type: String,

    /// Node pool the instance draws capacity from
    pub pool_ref: PoolRef,
}

/// Reference to a node pool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolRef {
    /// Namespace (organization) owning the pool
    pub namespace: String,
    /// Pool name
    pub name: String,
}

/// Status of the PulsarInstance
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    /// Conditions representing instance state
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Last generation processed by the control plane
    #[serde(default)]
    pub observed_generation: Option<i64>,

    /// Number of clusters attached to the instance
    #[serde(default)]
    pub clusters: i32,
}

impl HasConditions for PulsarInstance {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}

impl HasGeneration for PulsarInstance {
    fn generation(&self) -> Option<i64> {
        self.metadata.generation
    }

    fn observed_generation(&self) -> Option<i64> {
        self.status.as_ref().and_then(|s| s.observed_generation)
    }
}

// Default value functions
fn default_availability_mode() -> String {
    "zonal".to_string()
}

fn default_instance_type() -> String {
    "dedicated".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_spec_defaults() {
        let json = r#"{"poolRef": {"namespace": "shared", "name": "gcp-us-east1"}}"#;
        let spec: InstanceSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.availability_mode, "zonal");
        assert_eq!(spec.r#type, "dedicated");
        assert_eq!(spec.pool_ref.name, "gcp-us-east1");
    }
}
