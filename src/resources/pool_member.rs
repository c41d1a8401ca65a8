//! PoolMember resource handler

use crate::api::{PoolMember, PoolMemberNetwork, PoolMemberSpec};
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

/// Declarative configuration for a PoolMember.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct PoolMemberConfig {
    /// Member name
    pub name: String,

    /// Organization override; defaults to the provider organization
    #[serde(default)]
    pub organization: Option<String>,

    /// Pool the member belongs to
    pub pool_name: String,

    /// Cloud provider (aws, gcp, azure)
    pub cloud: String,

    /// Cloud region or zone
    pub location: String,

    /// CIDR block to provision the member's network from
    #[serde(default)]
    pub network_cidr: Option<String>,

    /// Existing network identifier to attach to
    #[serde(default)]
    pub network_id: Option<String>,
}

impl PoolMemberConfig {
    /// Expand into the typed API spec. A network CIDR and an existing
    /// network id are mutually exclusive.
    pub fn expand(&self) -> Result<PoolMemberSpec> {
        if self.network_cidr.is_some() && self.network_id.is_some() {
            return Err(ProviderError::Configuration(format!(
                "pool member {}: network_cidr and network_id are mutually exclusive",
                self.name
            )));
        }
        Ok(PoolMemberSpec {
            pool_name: self.pool_name.clone(),
            cloud: self.cloud.clone(),
            location: self.location.clone(),
            network: PoolMemberNetwork {
                cidr: self.network_cidr.clone(),
                id: self.network_id.clone(),
            },
        })
    }
}

/// Caller-visible state read back from the control plane.
#[derive(Debug, Clone, Serialize)]
pub struct PoolMemberState {
    /// Stable identifier (`organization/name`)
    pub id: String,
    pub name: String,
    pub organization: String,
    pub pool_name: String,
    pub cloud: String,
    pub location: String,
    pub ready: bool,
}

/// Flatten a fetched PoolMember into caller-visible state.
pub fn flatten(member: &PoolMember) -> PoolMemberState {
    let name = member.name_any();
    let organization = member.namespace().unwrap_or_default();
    PoolMemberState {
        id: format!("{}/{}", organization, name),
        name,
        organization,
        pool_name: member.spec.pool_name.clone(),
        cloud: member.spec.cloud.clone(),
        location: member.spec.location.clone(),
        ready: member
            .status
            .as_ref()
            .map(|s| is_condition_true(&s.conditions, CONDITION_READY))
            .unwrap_or(false),
    }
}

/// Create/read/update/delete handler for PoolMember resources.
pub struct PoolMemberHandler {
    client: Client,
    config: Arc<ProviderConfig>,
    cancel: CancellationToken,
}

impl PoolMemberHandler {
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

    fn api(&self, organization: &str) -> Api<PoolMember> {
        Api::namespaced(self.client.clone(), organization)
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.config.field_manager.clone()),
            ..Default::default()
        }
    }

    pub async fn create(&self, cfg: &PoolMemberConfig) -> Result<PoolMemberState> {
        let organization = cfg
            .organization
            .as_deref()
            .unwrap_or(&self.config.organization);
        let api = self.api(organization);

        let member = PoolMember::new(&cfg.name, cfg.expand()?);
        api.create(&self.post_params(), &member).await?;
        info!("Created PoolMember {}/{}", organization, cfg.name);

        let params = PollParams::new(
            "PoolMember",
            organization,
            &cfg.name,
            self.config.timeouts.pool_member,
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

    pub async fn read(&self, organization: Option<&str>, name: &str) -> Result<PoolMemberState> {
        let organization = organization.unwrap_or(&self.config.organization);
        Ok(flatten(&self.api(organization).get(name).await?))
    }

    pub async fn update(&self, cfg: &PoolMemberConfig) -> Result<PoolMemberState> {
        let organization = cfg
            .organization
            .as_deref()
            .unwrap_or(&self.config.organization);
        let api = self.api(organization);

        let mut current = api.get(&cfg.name).await?;
        current.spec = cfg.expand()?;
        api.replace(&cfg.name, &self.post_params(), &current).await?;
        info!("Updated PoolMember {}/{}", organization, cfg.name);

        let params = PollParams::new(
            "PoolMember",
            organization,
            &cfg.name,
            self.config.timeouts.pool_member,
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
                    info!("PoolMember {}/{} already absent", organization, name);
                    return Ok(());
                }
                return Err(err);
            }
        }

        let params = PollParams::new(
            "PoolMember",
            organization,
            name,
            self.config.timeouts.pool_member,
        );
        poll_until(
            &params,
            &self.cancel,
            || fetch_named(&api, name),
            confirmed_absent,
        )
        .await?;

        info!("Deleted PoolMember {}/{}", organization, name);
        Ok(())
    }
}
