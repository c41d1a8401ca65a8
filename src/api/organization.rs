//! Organization custom resource
//!
//! The tenant root. Organizations are cluster-scoped; every namespaced
//! resource in this crate lives inside the namespace named after its
//! organization. The provider only reads organizations.

use super::{Condition, HasConditions};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Organization is the Schema for the organizations API
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "cloud.pulsar.io",
    version = "v1alpha1",
    kind = "Organization",
    status = "OrganizationStatus",
    shortname = "org",
    printcolumn = r#"{"name":"Plan","type":"string","jsonPath":".spec.plan"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSpec {
    /// Human-readable organization name
    #[serde(default)]
    pub display_name: Option<String>,

    /// Subscription plan (free, standard, enterprise)
    #[serde(default = "default_plan")]
    pub plan: String,
}

/// Status of the Organization
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationStatus {
    /// Conditions representing organization state
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Maximum number of instances the plan allows
    #[serde(default)]
    pub instance_quota: Option<i32>,
}

impl HasConditions for Organization {
    fn conditions(&self) -> &[Condition] {
        self.status.as_ref().map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}

fn default_plan() -> String {
    "standard".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_spec_defaults() {
        let json = r#"{}"#;
        let spec: OrganizationSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.plan, "standard");
        assert!(spec.display_name.is_none());
    }
}
