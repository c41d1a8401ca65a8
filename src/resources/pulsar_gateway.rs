//! PulsarGateway resource handler

use crate::api::{GatewayAccess, GatewaySpec, PoolRef, PrivateService, PulsarGateway};
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

/// Declarative configuration for a PulsarGateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct PulsarGatewayConfig {
    /// Gateway name
    pub name: String,

    /// Organization override; defaults to the provider organization
    #[serde(default)]
    pub organization: Option<String>,

    /// Access mode (public or private)
    #[serde(default)]
    pub access: Option<GatewayAccess>,

    /// Namespace of the pool member the gateway fronts
    pub pool_member_namespace: String,

    /// Name of the pool member the gateway fronts
    pub pool_member_name: String,

    /// Service identifiers allowed on a private gateway
    #[serde(default)]
    pub allowed_ids: Vec<String>,
}

impl PulsarGatewayConfig {
    /// Expand into the typed API spec.
    ///
    /// A private gateway must name at least one allowed service identifier.
    pub fn expand(&self) -> Result<GatewaySpec> {
        let access = self.access.unwrap_or(GatewayAccess::Public);
        let private_service = match access {
            GatewayAccess::Public => None,
            GatewayAccess::Private => {
                if self.allowed_ids.is_empty() {
                    return Err(ProviderError::Configuration(format!(
                        "gateway {}: private access requires at least one allowed service id",
                        self.name
                    )));
                }
                Some(PrivateService {
                    allowed_ids: self.allowed_ids.clone(),
                })
            }
        };
        Ok(GatewaySpec {
            access,
            pool_member_ref: PoolRef {
                namespace: self.pool_member_namespace.clone(),
                name: self.pool_member_name.clone(),
            },
            private_service,
        })
    }
}

/// Caller-visible state read back from the control plane.
#[derive(Debug, Clone, Serialize)]
pub struct PulsarGatewayState {
    /// Stable identifier (`organization/name`)
    pub id: String,
    pub name: String,
    pub organization: String,
    pub access: GatewayAccess,
    pub ready: bool,
    pub endpoint: Option<String>,
}

/// Flatten a fetched PulsarGateway into caller-visible state.
pub fn flatten(gateway: &PulsarGateway) -> PulsarGatewayState {
    let name = gateway.name_any();
    let organization = gateway.namespace().unwrap_or_default();
    let status = gateway.status.as_ref();
    PulsarGatewayState {
        id: format!("{}/{}", organization, name),
        name,
        organization,
        access: gateway.spec.access,
        ready: status
            .map(|s| is_condition_true(&s.conditions, CONDITION_READY))
            .unwrap_or(false),
        endpoint: status.and_then(|s| s.endpoint.clone()),
    }
}

/// Create/read/update/delete handler for PulsarGateway resources.
pub struct PulsarGatewayHandler {
    client: Client,
    config: Arc<ProviderConfig>,
    cancel: CancellationToken,
}

impl PulsarGatewayHandler {
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

    fn api(&self, organization: &str) -> Api<PulsarGateway> {
        Api::namespaced(self.client.clone(), organization)
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.config.field_manager.clone()),
            ..Default::default()
        }
    }

    pub async fn create(&self, cfg: &PulsarGatewayConfig) -> Result<PulsarGatewayState> {
        let organization = cfg
            .organization
            .as_deref()
            .unwrap_or(&self.config.organization);
        let api = self.api(organization);

        let gateway = PulsarGateway::new(&cfg.name, cfg.expand()?);
        api.create(&self.post_params(), &gateway).await?;
        info!("Created PulsarGateway {}/{}", organization, cfg.name);

        let params = PollParams::new(
            "PulsarGateway",
            organization,
            &cfg.name,
            self.config.timeouts.gateway,
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
    ) -> Result<PulsarGatewayState> {
        let organization = organization.unwrap_or(&self.config.organization);
        Ok(flatten(&self.api(organization).get(name).await?))
    }

    pub async fn update(&self, cfg: &PulsarGatewayConfig) -> Result<PulsarGatewayState> {
        let organization = cfg
            .organization
            .as_deref()
            .unwrap_or(&self.config.organization);
        let api = self.api(organization);

        let mut current = api.get(&cfg.name).await?;
        current.spec = cfg.expand()?;
        api.replace(&cfg.name, &self.post_params(), &current).await?;
        info!("Updated PulsarGateway {}/{}", organization, cfg.name);

        let params = PollParams::new(
            "PulsarGateway",
            organization,
            &cfg.name,
            self.config.timeouts.gateway,
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
                    info!("PulsarGateway {}/{} already absent", organization, name);
                    return Ok(());
                }
                return Err(err);
            }
        }

        let params = PollParams::new(
            "PulsarGateway",
            organization,
            name,
            self.config.timeouts.gateway,
        );
        poll_until(
            &params,
            &self.cancel,
            || fetch_named(&api, name),
            confirmed_absent,
        )
        .await?;

        info!("Deleted PulsarGateway {}/{}", organization, name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> PulsarGatewayConfig {
        serde_json::from_str(
            r#"{"name": "gw", "pool_member_namespace": "shared", "pool_member_name": "gcp-us-east1-a"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_expand_public_default() {
        let spec = base_config().expand().unwrap();
        assert_eq!(spec.access, GatewayAccess::Public);
        assert!(spec.private_service.is_none());
    }

    #[test]
    fn test_expand_private_requires_allowed_ids() {
        let mut cfg = base_config();
        cfg.access = Some(GatewayAccess::Private);
        assert!(matches!(
            cfg.expand(),
            Err(ProviderError::Configuration(_))
        ));

        cfg.allowed_ids = vec!["vpce-1234".to_string()];
        let spec = cfg.expand().unwrap();
        assert_eq!(
            spec.private_service.unwrap().allowed_ids,
            vec!["vpce-1234"]
        );
    }

    #[test]
    fn test_flatten_without_status() {
        let gateway = PulsarGateway::new("gw", base_config().expand().unwrap());
        let state = flatten(&gateway);
        assert!(!state.ready);
        assert!(state.endpoint.is_none());
    }
}
