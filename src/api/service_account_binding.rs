//! ServiceAccountBinding custom resource
//!
//! Grants a service account access to a Pulsar cluster. Binding
//! confirmation is a lightweight control plane operation.

use super::{Condition, HasConditions, HasGeneration};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ServiceAccountBinding is the Schema for the serviceaccountbindings API
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cloud.pulsar.io",
    version = "v1alpha1",
    kind = "ServiceAccountBinding",
    namespaced,
    status = "ServiceAccountBindingStatus",
    shortname = "sab",
    printcolumn = r#"{"name":"ServiceAccount","type":"string","jsonPath":".spec.serviceAccountName"}"#,
    printcolumn = r#"{"name":"Cluster","type":"string","jsonPath":".spec.clusterName"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountBindingSpec {
    /// Service account being bound
    pub service_account_name: String,

    /// Cluster the service account is granted access to
    pub cluster_name: String,
}

/// Status of the ServiceAccountBinding
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountBindingStatus {
    /// Conditions representing binding state
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Last generation processed by the control plane
    #[serde(default)]
    pub observed_generation: Option<i64>,
}

impl HasConditions for ServiceAccountBinding {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}

impl HasGeneration for ServiceAccountBinding {
    fn generation(&self) -> Option<i64> {
        self.metadata.generation
    }

    fn observed_generation(&self) -> Option<i64> {
        self.status.as_ref().and_then(|s| s.observed_generation)
    }
}
