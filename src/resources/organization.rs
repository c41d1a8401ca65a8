//! Organization data source
//!
//! Read-only lookup of the cluster-scoped Organization resource. There is
//! no mutation path and therefore no convergence polling here.

use crate::api::Organization;
use crate::conditions::{is_condition_true, CONDITION_ACTIVE};
use crate::error::Result;
use kube::api::Api;
use kube::{Client, ResourceExt};
use serde::Serialize;

/// Caller-visible organization attributes.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationState {
    pub id: String,
    pub name: String,
    pub display_name: Option<String>,
    pub plan: String,
    pub active: bool,
    pub instance_quota: Option<i32>,
}

/// Flatten a fetched Organization into caller-visible state.
pub fn flatten(org: &Organization) -> OrganizationState {
    let name = org.name_any();
    let status = org.status.as_ref();
    OrganizationState {
        id: name.clone(),
        name,
        display_name: org.spec.display_name.clone(),
        plan: org.spec.plan.clone(),
        active: status
            .map(|s| is_condition_true(&s.conditions, CONDITION_ACTIVE))
            .unwrap_or(false),
        instance_quota: status.and_then(|s| s.instance_quota),
    }
}

/// Read-only lookup of organizations.
pub struct OrganizationDataSource {
    client: Client,
}

impl OrganizationDataSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn read(&self, name: &str) -> Result<OrganizationState> {
        let api: Api<Organization> = Api::all(self.client.clone());
        Ok(flatten(&api.get(name).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Condition, OrganizationSpec, OrganizationStatus};

    #[test]
    fn test_flatten_active_organization() {
        let mut org = Organization::new(
            "acme",
            OrganizationSpec {
                display_name: Some("Acme Corp".to_string()),
                plan: "enterprise".to_string(),
            },
        );
        org.status = Some(OrganizationStatus {
            conditions: vec![Condition {
                r#type: "Active".to_string(),
                status: "True".to_string(),
                last_transition_time: None,
                reason: None,
                message: None,
            }],
            instance_quota: Some(10),
        });

        let state = flatten(&org);
        assert_eq!(state.id, "acme");
        assert!(state.active);
        assert_eq!(state.instance_quota, Some(10));
        assert_eq!(state.plan, "enterprise");
    }

    #[test]
    fn test_flatten_without_status() {
        let org = Organization::new("acme", OrganizationSpec {
            display_name: None,
            plan: "standard".to_string(),
        });
        let state = flatten(&org);
        assert!(!state.active);
        assert!(state.instance_quota.is_none());
    }
}
