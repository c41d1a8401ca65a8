//! ServiceAccountBinding resource handler
//!
//! Bindings confirm quickly, so this handler polls on the shorter
//! interval with a 3-minute deadline. Bindings are replaced, not updated:
//! changing either side means a new binding.

use crate::api::{ServiceAccountBinding, ServiceAccountBindingSpec};
use crate::conditions::{is_condition_true, CONDITION_READY};
use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::wait::{
    confirmed_absent, fetch_named, poll_until, ready_condition_met, PollParams,
    FAST_POLL_INTERVAL,
};
use kube::api::{Api, DeleteParams, PostParams};
use kube::{Client, ResourceExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Declarative configuration for a ServiceAccountBinding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct ServiceAccountBindingConfig {
    /// Binding name
    pub name: String,

    /// Organization override; defaults to the provider organization
    #[serde(default)]
    pub organization: Option<String>,

    /// Service account being bound
    pub service_account_name: String,

    /// Cluster the service account gains access to
    pub cluster_name: String,
}

impl ServiceAccountBindingConfig {
    pub fn expand(&self) -> ServiceAccountBindingSpec {
        ServiceAccountBindingSpec {
            service_account_name: self.service_account_name.clone(),
            cluster_name: self.cluster_name.clone(),
        }
    }
}

/// Caller-visible state read back from the control plane.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceAccountBindingState {
    /// Stable identifier (`organization/name`)
    pub id: String,
    pub name: String,
    pub organization: String,
    pub service_account_name: String,
    pub cluster_name: String,
    pub ready: bool,
}

/// Flatten a fetched ServiceAccountBinding into caller-visible state.
pub fn flatten(binding: &ServiceAccountBinding) -> ServiceAccountBindingState {
    let name = binding.name_any();
    let organization = binding.namespace().unwrap_or_default();
    ServiceAccountBindingState {
        id: format!("{}/{}", organization, name),
        name,
        organization,
        service_account_name: binding.spec.service_account_name.clone(),
        cluster_name: binding.spec.cluster_name.clone(),
        ready: binding
            .status
            .as_ref()
            .map(|s| is_condition_true(&s.conditions, CONDITION_READY))
            .unwrap_or(false),
    }
}

/// Create/read/delete handler for ServiceAccountBinding resources.
pub struct ServiceAccountBindingHandler {
    client: Client,
    config: Arc<ProviderConfig>,
    cancel: CancellationToken,
}

impl ServiceAccountBindingHandler {
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

    fn api(&self, organization: &str) -> Api<ServiceAccountBinding> {
        Api::namespaced(self.client.clone(), organization)
    }

    fn poll_params(&self, organization: &str, name: &str) -> PollParams {
        PollParams::new(
            "ServiceAccountBinding",
            organization,
            name,
            self.config.timeouts.binding,
        )
        .with_interval(FAST_POLL_INTERVAL)
    }

    pub async fn create(
        &self,
        cfg: &ServiceAccountBindingConfig,
    ) -> Result<ServiceAccountBindingState> {
        let organization = cfg
            .organization
            .as_deref()
            .unwrap_or(&self.config.organization);
        let api = self.api(organization);

        let binding = ServiceAccountBinding::new(&cfg.name, cfg.expand());
        let pp = PostParams {
            field_manager: Some(self.config.field_manager.clone()),
            ..Default::default()
        };
        api.create(&pp, &binding).await?;
        info!(
            "Created ServiceAccountBinding {}/{}",
            organization, cfg.name
        );

        poll_until(
            &self.poll_params(organization, &cfg.name),
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
    ) -> Result<ServiceAccountBindingState> {
        let organization = organization.unwrap_or(&self.config.organization);
        Ok(flatten(&self.api(organization).get(name).await?))
    }

    pub async fn delete(&self, organization: Option<&str>, name: &str) -> Result<()> {
        let organization = organization.unwrap_or(&self.config.organization);
        let api = self.api(organization);

        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {}
            Err(e) => {
                let err = ProviderError::from(e);
                if err.is_not_found() {
                    info!(
                        "ServiceAccountBinding {}/{} already absent",
                        organization, name
                    );
                    return Ok(());
                }
                return Err(err);
            }
        }

        poll_until(
            &self.poll_params(organization, name),
            &self.cancel,
            || fetch_named(&api, name),
            confirmed_absent,
        )
        .await?;

        info!("Deleted ServiceAccountBinding {}/{}", organization, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_config() -> ServiceAccountBindingConfig {
        serde_json::from_str(
            r#"{"name": "deployer-prod", "service_account_name": "deployer", "cluster_name": "prod-east"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_expand() {
        let spec = base_config().expand();
        assert_eq!(spec.service_account_name, "deployer");
        assert_eq!(spec.cluster_name, "prod-east");
    }

    #[test]
    fn test_binding_polls_fast_with_short_deadline() {
        let config = Arc::new(ProviderConfig::new("acme"));
        // Construct params the way the handler does, without a client.
        let params = PollParams::new("ServiceAccountBinding", "acme", "b", config.timeouts.binding)
            .with_interval(FAST_POLL_INTERVAL);
        assert_eq!(params.interval, Duration::from_secs(5));
        assert_eq!(params.timeout, Duration::from_secs(180));
    }

    #[test]
    fn test_flatten_without_status() {
        let binding = ServiceAccountBinding::new("deployer-prod", base_config().expand());
        let state = flatten(&binding);
        assert!(!state.ready);
        assert_eq!(state.service_account_name, "deployer");
    }
}
