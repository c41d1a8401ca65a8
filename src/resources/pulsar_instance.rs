//! PulsarInstance resource handler

use crate::api::{InstanceSpec, PoolRef, PulsarInstance};
use crate::conditions::{is_condition_true, CONDITION_READY};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::wait::{
    confirmed_absent, fetch_named, generation_observed, poll_until, ready_condition_met,
    PollParams,
};
use kube::api::{Api, DeleteParams, PostParams};
use kube::{Client, ResourceExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Declarative configuration for a PulsarInstance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct PulsarInstanceConfig {
    /// Instance name
    pub name: String,

    /// Organization override; defaults to the provider organization
    #[serde(default)]
    pub organization: Option<String>,

    /// Availability mode (zonal or regional)
    #[serde(default)]
    pub availability_mode: Option<String>,

    /// Instance type (serverless or dedicated)
    #[serde(default)]
    pub r#type: Option<String>,

    /// Namespace of the pool the instance draws capacity from
    pub pool_namespace: String,

    /// Name of the pool the instance draws capacity from
    pub pool_name: String,
}

impl PulsarInstanceConfig {
    pub fn expand(&self) -> InstanceSpec {
        InstanceSpec {
            availability_mode: self
                .availability_mode
                .clone()
                .unwrap_or_else(|| "zonal".to_string()),
            r#type: self.r#type.clone().unwrap_or_else(|| "dedicated".to_string()),
            pool_ref: PoolRef {
                namespace: self.pool_namespace.clone(),
                name: self.pool_name.clone(),
            },
        }
    }
}

/// Caller-visible state read back from the control plane.
#[derive(Debug, Clone, Serialize)]
pub struct PulsarInstanceState {
    /// Stable identifier (`organization/name`)
    pub id: String,
    pub name: String,
    pub organization: String,
    pub availability_mode: String,
    pub r#type: String,
    pub ready: bool,
    pub clusters: i32,
}

/// Flatten a fetched PulsarInstance into caller-visible state.
pub fn flatten(instance: &PulsarInstance) -> PulsarInstanceState {
    let name = instance.name_any();
    let organization = instance.namespace().unwrap_or_default();
    let status = instance.status.as_ref();
    PulsarInstanceState {
        id: format!("{}/{}", organization, name),
        name,
        organization,
        availability_mode: instance.spec.availability_mode.clone(),
        r#type: instance.spec.r#type.clone(),
        ready: status
            .map(|s| is_condition_true(&s.conditions, CONDITION_READY))
            .unwrap_or(false),
        clusters: status.map(|s| s.clusters).unwrap_or(0),
    }
}

/// Create/read/update/delete handler for PulsarInstance resources.
pub struct PulsarInstanceHandler {
    client: Client,
    config: Arc<ProviderConfig>,
    cancel: CancellationToken,
}

impl PulsarInstanceHandler {
    pub fn new(client: Client, config: Arc<ProviderConfig>) -> Self {
        Self {
            client,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn api(&self, organization: &str) -> Api<PulsarInstance> {
        Api::namespaced(self.client.clone(), organization)
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.config.field_manager.clone()),
            ..Default::default()
        }
    }

    pub async fn create(&self, cfg: &PulsarInstanceConfig) -> Result<PulsarInstanceState> {
        let organization = cfg
            .organization
            .as_deref()
            .unwrap_or(&self.config.organization);
        let api = self.api(organization);

        let instance = PulsarInstance::new(&cfg.name, cfg.expand());
        api.create(&self.post_params(), &instance).await?;
        info!("Created PulsarInstance {}/{}", organization, cfg.name);

        let params = PollParams::new(
            "PulsarInstance",
            organization,
            &cfg.name,
            self.config.timeouts.instance,
        );
        poll_until(
            &params,
            &self.cancel,
            || fetch_named(&api, &cfg.name),
            ready_condition_met,
        )
        .await?;

        Ok(flatten(&api.get(&cfg.name).await?))
    }

    pub async fn read(
        &self,
        organization: Option<&str>,
        name: &str,
    ) -> Result<PulsarInstanceState> {
        let organization = organization.unwrap_or(&self.config.organization);
        Ok(flatten(&self.api(organization).get(name).await?))
    }

    pub async fn update(&self, cfg: &PulsarInstanceConfig) -> Result<PulsarInstanceState> {
        let organization = cfg
            .organization
            .as_deref()
            .unwrap_or(&self.config.organization);
        let api = self.api(organization);

        let mut current = api.get(&cfg.name).await?;
        current.spec = cfg.expand();
        api.replace(&cfg.name, &self.post_params(), &current).await?;
        info!("Updated PulsarInstance {}/{}", organization, cfg.name);

        let params = PollParams::new(
            "PulsarInstance",
            organization,
            &cfg.name,
            self.config.timeouts.instance,
        );
        poll_until(
            &params,
            &self.cancel,
            || fetch_named(&api, &cfg.name),
            generation_observed,
        )
        .await?;

        Ok(flatten(&api.get(&cfg.name).await?))
    }

    pub async fn delete(&self, organization: Option<&str>, name: &str) -> Result<()> {
        let organization = organization.unwrap_or(&self.config.organization);
        let api = self.api(organization);

        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {}
            Err(e) => {
                let err = ProviderError::from(e);
                if err.is_not_found() {
                    info!("PulsarInstance {}/{} already absent", organization, name);
                    return Ok(());
                }
                return Err(err);
            }
        }

        let params = PollParams::new(
            "PulsarInstance",
            organization,
            name,
            self.config.timeouts.instance,
        );
        poll_until(
            &params,
            &self.cancel,
            || fetch_named(&api, name),
            confirmed_absent,
        )
        .await?;

        info!("Deleted PulsarInstance {}/{}", organization, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> PulsarInstanceConfig {
        serde_json::from_str(
            r#"{"name": "prod", "pool_namespace": "shared", "pool_name": "gcp-us-east1"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_expand_defaults() {
        let spec = base_config().expand();
        assert_eq!(spec.availability_mode, "zonal");
        assert_eq!(spec.r#type, "dedicated");
        assert_eq!(spec.pool_ref.namespace, "shared");
    }

    #[test]
    fn test_expand_overrides() {
        let mut cfg = base_config();
        cfg.availability_mode = Some("regional".to_string());
        cfg.r#type = Some("serverless".to_string());
        let spec = cfg.expand();
        assert_eq!(spec.availability_mode, "regional");
        assert_eq!(spec.r#type, "serverless");
    }

    #[test]
    fn test_flatten_without_status() {
        let instance = PulsarInstance::new("prod", base_config().expand());
        let state = flatten(&instance);
        assert!(!state.ready);
        assert_eq!(state.clusters, 0);
        assert_eq!(state.name, "prod");
    }
}
