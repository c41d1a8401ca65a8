//! PulsarCluster resource handler
//!
//! Provisions broker/bookkeeper clusters: expands the typed configuration
//! into a PulsarCluster object, submits it, then blocks until the control
//! plane reports readiness (unless `wait_for_ready` is disabled).

use crate::api::{
    BookKeeperSpec, BrokerSpec, ClusterConfig, ComputeResources, ProtocolListeners, PulsarCluster,
    PulsarClusterSpec, ServiceEndpoint,
};
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

/// Declarative configuration for a PulsarCluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct PulsarClusterConfig {
    /// Cluster name
    pub name: String,

    /// Organization override; defaults to the provider organization
    #[serde(default)]
    pub organization: Option<String>,

    /// PulsarInstance the cluster belongs to
    pub instance_name: String,

    /// Deployment location
    pub location: String,

    /// Broker replicas (control plane default when unset)
    #[serde(default)]
    pub broker_replicas: Option<i32>,

    /// CPU request per broker
    #[serde(default)]
    pub broker_cpu: Option<String>,

    /// Memory request per broker
    #[serde(default)]
    pub broker_memory: Option<String>,

    /// Bookie replicas (control plane default when unset)
    #[serde(default)]
    pub bookkeeper_replicas: Option<i32>,

    /// Enable the WebSocket API
    #[serde(default)]
    pub websocket_enabled: bool,

    /// Enable Pulsar Functions
    #[serde(default)]
    pub function_enabled: bool,

    /// Enable transactions
    #[serde(default)]
    pub transaction_enabled: bool,

    /// Enable the Kafka protocol listener
    #[serde(default)]
    pub kafka_protocol: bool,

    /// Enable the MQTT protocol listener
    #[serde(default)]
    pub mqtt_protocol: bool,

    /// Release channel (rapid or stable)
    #[serde(default)]
    pub release_channel: Option<String>,

    /// Block until the cluster reports Ready
    #[serde(default = "default_wait_for_ready")]
    pub wait_for_ready: bool,
}

fn default_wait_for_ready() -> bool {
    true
}

impl PulsarClusterConfig {
    /// Expand into the typed API spec.
    pub fn expand(&self) -> PulsarClusterSpec {
        let mut broker = BrokerSpec::default();
        if let Some(replicas) = self.broker_replicas {
            broker.replicas = replicas;
        }
        broker.resources = ComputeResources {
            cpu: self.broker_cpu.clone(),
            memory: self.broker_memory.clone(),
        };

        let mut bookkeeper = BookKeeperSpec::default();
        if let Some(replicas) = self.bookkeeper_replicas {
            bookkeeper.replicas = replicas;
        }

        PulsarClusterSpec {
            instance_name: self.instance_name.clone(),
            location: self.location.clone(),
            broker,
            bookkeeper,
            config: ClusterConfig {
                websocket_enabled: self.websocket_enabled,
                function_enabled: self.function_enabled,
                transaction_enabled: self.transaction_enabled,
                protocols: ProtocolListeners {
                    kafka: self.kafka_protocol,
                    mqtt: self.mqtt_protocol,
                },
                custom: Default::default(),
            },
            release_channel: self
                .release_channel
                .clone()
                .unwrap_or_else(|| "stable".to_string()),
        }
    }
}

/// Caller-visible state read back from the control plane.
#[derive(Debug, Clone, Serialize)]
pub struct PulsarClusterState {
    /// Stable identifier (`organization/name`)
    pub id: String,
    pub name: String,
    pub organization: String,
    pub instance_name: String,
    pub location: String,
    pub ready: bool,
    pub ready_replicas: i32,
    pub service_endpoints: Vec<ServiceEndpoint>,
}

/// Flatten a fetched PulsarCluster into caller-visible state.
pub fn flatten(cluster: &PulsarCluster) -> PulsarClusterState {
    let name = cluster.name_any();
    let organization = cluster.namespace().unwrap_or_default();
    let status = cluster.status.as_ref();
    PulsarClusterState {
        id: format!("{}/{}", organization, name),
        name,
        organization,
        instance_name: cluster.spec.instance_name.clone(),
        location: cluster.spec.location.clone(),
        ready: status
            .map(|s| is_condition_true(&s.conditions, CONDITION_READY))
            .unwrap_or(false),
        ready_replicas: status.map(|s| s.ready_replicas).unwrap_or(0),
        service_endpoints: status.map(|s| s.service_endpoints.clone()).unwrap_or_default(),
    }
}

/// Create/read/update/delete handler for PulsarCluster resources.
pub struct PulsarClusterHandler {
    client: Client,
    config: Arc<ProviderConfig>,
    cancel: CancellationToken,
}

impl PulsarClusterHandler {
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

    fn organization<'a>(&'a self, explicit: &'a Option<String>) -> &'a str {
        explicit.as_deref().unwrap_or(&self.config.organization)
    }

    fn api(&self, organization: &str) -> Api<PulsarCluster> {
        Api::namespaced(self.client.clone(), organization)
    }

    fn post_params(&self) -> PostParams {
        PostParams {
            field_manager: Some(self.config.field_manager.clone()),
            ..Default::default()
        }
    }

    /// Submit a new cluster and wait for it to report Ready.
    pub async fn create(&self, cfg: &PulsarClusterConfig) -> Result<PulsarClusterState> {
        let organization = self.organization(&cfg.organization);
        let api = self.api(organization);

        let cluster = PulsarCluster::new(&cfg.name, cfg.expand());
        api.create(&self.post_params(), &cluster).await?;
        info!("Created PulsarCluster {}/{}", organization, cfg.name);

        if cfg.wait_for_ready {
            let params = PollParams::new(
                "PulsarCluster",
                organization,
                &cfg.name,
                self.config.timeouts.cluster_create,
            );
            poll_until(
                &params,
                &self.cancel,
                || fetch_named(&api, &cfg.name),
                ready_condition_met,
            )
            .await?;
        }

        Ok(flatten(&api.get(&cfg.name).await?))
    }

    /// Fetch current state.
    pub async fn read(
        &self,
        organization: Option<&str>,
        name: &str,
    ) -> Result<PulsarClusterState> {
        let organization = organization.unwrap_or(&self.config.organization);
        Ok(flatten(&self.api(organization).get(name).await?))
    }

    /// Replace the spec and wait for the control plane to process it.
    pub async fn update(&self, cfg: &PulsarClusterConfig) -> Result<PulsarClusterState> {
        let organization = self.organization(&cfg.organization);
        let api = self.api(organization);

        let mut current = api.get(&cfg.name).await?;
        current.spec = cfg.expand();
        api.replace(&cfg.name, &self.post_params(), &current).await?;
        info!("Updated PulsarCluster {}/{}", organization, cfg.name);

        let params = PollParams::new(
            "PulsarCluster",
            organization,
            &cfg.name,
            self.config.timeouts.cluster_update,
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

    /// Delete the cluster and wait for teardown to finish. An already
    /// absent cluster is treated as success.
    pub async fn delete(&self, organization: Option<&str>, name: &str) -> Result<()> {
        let organization = organization.unwrap_or(&self.config.organization);
        let api = self.api(organization);

        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => {}
            Err(e) => {
                let err = ProviderError::from(e);
                if err.is_not_found() {
                    info!("PulsarCluster {}/{} already absent", organization, name);
                    return Ok(());
                }
                return Err(err);
            }
        }

        let params = PollParams::new(
            "PulsarCluster",
            organization,
            name,
            self.config.timeouts.cluster_delete,
        );
        poll_until(
            &params,
            &self.cancel,
            || fetch_named(&api, name),
            confirmed_absent,
        )
        .await?;

        info!("Deleted PulsarCluster {}/{}", organization, name);
        Ok(())
    }
}
