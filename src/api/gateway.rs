//! PulsarGateway custom resource
//!
//! The network entry point for clusters on a pool member. A gateway is
//! either public or private; private gateways carry the provider-side
//! service identifiers allowed to connect.

use super::{Condition, HasConditions, HasGeneration};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PulsarGateway is the Schema for the pulsargateways API
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cloud.pulsar.io",
    version = "v1alpha1",
    kind = "PulsarGateway",
    namespaced,
    status = "GatewayStatus",
    shortname = "pgw",
    printcolumn = r#"{"name":"Access","type":"string","jsonPath":".spec.access"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GatewaySpec {
    /// Access mode (public or private)
    #[serde(default = "default_access")]
    pub access: GatewayAccess,

    /// Pool member this gateway fronts
    pub pool_member_ref: super::PoolRef,

    /// Private service configuration, required when access is private
    #[serde(default)]
    pub private_service: Option<PrivateService>,
}

/// Gateway access mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GatewayAccess {
    Public,
    Private,
}

/// Private service configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrivateService {
    /// Cloud-provider service identifiers allowed to connect
    #[serde(default)]
    pub allowed_ids: Vec<String>,
}

/// Status of the PulsarGateway
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStatus {
    /// Conditions representing gateway state
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Last generation processed by the control plane
    #[serde(default)]
    pub observed_generation: Option<i64>,

    /// DNS name clients connect to once the gateway is ready
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl HasConditions for PulsarGateway {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}

impl HasGeneration for PulsarGateway {
    fn generation(&self) -> Option<i64> {
        self.metadata.generation
    }

    fn observed_generation(&self) -> Option<i64> {
        self.status.as_ref().and_then(|s| s.observed_generation)
    }
}

fn default_access() -> GatewayAccess {
    GatewayAccess::Public
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_spec_defaults() {
        let json = r#"{"poolMemberRef": {"namespace": "shared", "name": "gcp-us-east1-a"}}"#;
        let spec: GatewaySpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.access, GatewayAccess::Public);
        assert!(spec.private_service.is_none());
    }

    #[test]
    fn test_private_gateway() {
        let json = r#"{
            "access": "private",
            "poolMemberRef": {"namespace": "shared", "name": "aws-us-east-1"},
            "privateService": {"allowedIds": ["vpce-1234"]}
        }"#;
        let spec: GatewaySpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.access, GatewayAccess::Private);
        assert_eq!(spec.private_service.unwrap().allowed_ids, vec!["vpce-1234"]);
    }
}
