//! Declarative manifest for the CLI
//!
//! A JSON document listing the typed resource configurations to apply or
//! destroy, grouped by kind. Kinds are applied in dependency order (pool
//! members, instances, clusters, gateways, bindings) and destroyed in
//! reverse.

use crate::error::{ProviderError, Result};
use crate::resources::{
    PoolMemberConfig, PulsarClusterConfig, PulsarGatewayConfig, PulsarInstanceConfig,
    ServiceAccountBindingConfig,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything one `apply` manages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct Manifest {
    /// Organization all resources default to
    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default)]
    pub pool_members: Vec<PoolMemberConfig>,

    #[serde(default)]
    pub instances: Vec<PulsarInstanceConfig>,

    #[serde(default)]
    pub clusters: Vec<PulsarClusterConfig>,

    #[serde(default)]
    pub gateways: Vec<PulsarGatewayConfig>,

    #[serde(default)]
    pub bindings: Vec<ServiceAccountBindingConfig>,
}

impl Manifest {
    /// Load and parse a manifest file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn is_empty(&self) -> bool {
        self.pool_members.is_empty()
            && self.instances.is_empty()
            && self.clusters.is_empty()
            && self.gateways.is_empty()
            && self.bindings.is_empty()
    }

    /// Total number of resources named by the manifest.
    pub fn len(&self) -> usize {
        self.pool_members.len()
            + self.instances.len()
            + self.clusters.len()
            + self.gateways.len()
            + self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "organization": "acme",
        "pool_members": [
            {"name": "gcp-us-east1-a", "pool_name": "shared-gcp", "cloud": "gcp", "location": "us-east1"}
        ],
        "instances": [
            {"name": "prod", "pool_namespace": "acme", "pool_name": "shared-gcp"}
        ],
        "clusters": [
            {"name": "prod-east", "instance_name": "prod", "location": "us-east1", "broker_replicas": 3}
        ],
        "gateways": [
            {"name": "gw", "pool_member_namespace": "acme", "pool_member_name": "gcp-us-east1-a"}
        ],
        "bindings": [
            {"name": "deployer-prod", "service_account_name": "deployer", "cluster_name": "prod-east"}
        ]
    }"#;

    #[test]
    fn test_parse_full_manifest() {
        let manifest: Manifest = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(manifest.organization.as_deref(), Some("acme"));
        assert_eq!(manifest.len(), 5);
        assert!(!manifest.is_empty());
        assert_eq!(manifest.clusters[0].broker_replicas, Some(3));
        assert!(manifest.clusters[0].wait_for_ready);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest: Manifest = serde_json::from_str("{}").unwrap();
        assert!(manifest.is_empty());
        assert_eq!(manifest.len(), 0);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result: std::result::Result<Manifest, _> =
            serde_json::from_str(r#"{"cluster": []}"#);
        assert!(result.is_err());
    }
}
