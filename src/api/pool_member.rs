//! PoolMember custom resource
//!
//! One infrastructure capacity unit inside a node pool: a cloud, a
//! location, and the network the workloads land in.

use super::{Condition, HasConditions, HasGeneration};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PoolMember is the Schema for the poolmembers API
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cloud.pulsar.io",
    version = "v1alpha1",
    kind = "PoolMember",
    namespaced,
    status = "PoolMemberStatus",
    shortname = "pm",
    printcolumn = r#"{"name":"Pool","type":"string","jsonPath":".spec.poolName"}"#,
    printcolumn = r#"{"name":"Cloud","type":"string","jsonPath":".spec.cloud"}"#,
    printcolumn = r#"{"name":"Location","type":"string","jsonPath":".spec.location"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PoolMemberSpec {
    /// Name of the pool this member belongs to
    pub pool_name: String,

    /// Cloud provider (aws, gcp, azure)
    pub cloud: String,

    /// Cloud region or zone
    pub location: String,

    /// Network configuration
    #[serde(default)]
    pub network: PoolMemberNetwork,
}

/// Network configuration for a pool member
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PoolMemberNetwork {
    /// CIDR block for the member's network
    #[serde(default)]
    pub cidr: Option<String>,

    /// Existing network identifier to attach to instead of provisioning one
    #[serde(default)]
    pub id: Option<String>,
}

/// Status of the PoolMember
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PoolMemberStatus {
    /// Conditions representing member state
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Last generation processed by the control plane
    #[serde(default)]
    pub observed_generation: Option<i64>,
}

impl HasConditions for PoolMember {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}

impl HasGeneration for PoolMember {
    fn generation(&self) -> Option<i64> {
        self.metadata.generation
    }

    fn observed_generation(&self) -> Option<i64> {
        self.status.as_ref().and_then(|s| s.observed_generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_member_spec_defaults() {
        let json = r#"{"poolName": "shared-gcp", "cloud": "gcp", "location": "us-east1"}"#;
        let spec: PoolMemberSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.pool_name, "shared-gcp");
        assert!(spec.network.cidr.is_none());
        assert!(spec.network.id.is_none());
    }
}
