//! Provider configuration
//!
//! An immutable [`ProviderConfig`] is constructed once at startup and shared
//! by `Arc` into every resource handler: the default organization, the field
//! manager name sent with mutations, per-kind convergence deadlines, and the
//! field-description table surfaced by the CLI `schema` command.

use std::collections::BTreeMap;
use std::time::Duration;

/// Field manager reported to the control plane on create/update calls.
pub const FIELD_MANAGER: &str = "pulsar-cloud-provider";

/// Convergence deadlines per resource kind and operation.
#[derive(Debug, Clone)]
pub struct WaitTimeouts {
    /// PulsarCluster create (full provisioning)
    pub cluster_create: Duration,
    /// PulsarCluster update
    pub cluster_update: Duration,
    /// PulsarCluster delete (teardown)
    pub cluster_delete: Duration,
    /// PulsarInstance create/update/delete
    pub instance: Duration,
    /// PulsarGateway create/update/delete
    pub gateway: Duration,
    /// PoolMember create/update/delete
    pub pool_member: Duration,
    /// ServiceAccountBinding create/delete
    pub binding: Duration,
}

impl Default for WaitTimeouts {
    fn default() -> Self {
        Self {
            cluster_create: Duration::from_secs(60 * 60),
            cluster_update: Duration::from_secs(15 * 60),
            cluster_delete: Duration::from_secs(15 * 60),
            instance: Duration::from_secs(15 * 60),
            gateway: Duration::from_secs(15 * 60),
            pool_member: Duration::from_secs(15 * 60),
            binding: Duration::from_secs(3 * 60),
        }
    }
}

/// Immutable provider-wide configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Default organization; namespaced resources live in the namespace
    /// named after their organization.
    pub organization: String,
    /// Field manager name for server-side apply.
    pub field_manager: String,
    /// Convergence deadlines.
    pub timeouts: WaitTimeouts,
    descriptions: BTreeMap<&'static str, &'static str>,
}

impl ProviderConfig {
    pub fn new(organization: &str) -> Self {
        Self {
            organization: organization.to_string(),
            field_manager: FIELD_MANAGER.to_string(),
            timeouts: WaitTimeouts::default(),
            descriptions: build_descriptions(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: WaitTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Description of a configuration field, if one is registered.
    pub fn describe(&self, field: &str) -> Option<&'static str> {
        self.descriptions.get(field).copied()
    }

    /// All registered field descriptions, sorted by field name.
    pub fn descriptions(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.descriptions.iter().map(|(k, v)| (*k, *v))
    }
}

fn build_descriptions() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("organization", "Organization the resources belong to"),
        ("pool_member.pool_name", "Name of the pool the member belongs to"),
        ("pool_member.cloud", "Cloud provider (aws, gcp, azure)"),
        ("pool_member.location", "Cloud region or zone"),
        ("pool_member.network_cidr", "CIDR block for the member's network"),
        ("pool_member.network_id", "Existing network identifier to attach to"),
        ("instance.availability_mode", "Availability mode (zonal or regional)"),
        ("instance.type", "Instance type (serverless or dedicated)"),
        ("instance.pool_namespace", "Namespace of the pool the instance draws from"),
        ("instance.pool_name", "Name of the pool the instance draws from"),
        ("cluster.instance_name", "PulsarInstance the cluster belongs to"),
        ("cluster.location", "Deployment location (cloud region or zone)"),
        ("cluster.broker_replicas", "Number of broker replicas"),
        ("cluster.broker_cpu", "CPU request per broker"),
        ("cluster.broker_memory", "Memory request per broker"),
        ("cluster.bookkeeper_replicas", "Number of bookie replicas"),
        ("cluster.websocket_enabled", "Enable the WebSocket API"),
        ("cluster.function_enabled", "Enable Pulsar Functions"),
        ("cluster.transaction_enabled", "Enable transactions"),
        ("cluster.kafka_protocol", "Enable the Kafka protocol listener"),
        ("cluster.mqtt_protocol", "Enable the MQTT protocol listener"),
        ("cluster.release_channel", "Release channel (rapid or stable)"),
        ("cluster.wait_for_ready", "Block until the cluster reports Ready (default true)"),
        ("gateway.access", "Gateway access mode (public or private)"),
        ("gateway.pool_member_name", "Pool member the gateway fronts"),
        ("gateway.allowed_ids", "Service identifiers allowed on a private gateway"),
        ("binding.service_account_name", "Service account being bound"),
        ("binding.cluster_name", "Cluster the service account gains access to"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let t = WaitTimeouts::default();
        assert_eq!(t.cluster_create, Duration::from_secs(3600));
        assert_eq!(t.binding, Duration::from_secs(180));
        assert_eq!(t.instance, Duration::from_secs(900));
    }

    #[test]
    fn test_describe_known_and_unknown_fields() {
        let config = ProviderConfig::new("acme");
        assert!(config.describe("cluster.location").is_some());
        assert!(config.describe("no.such.field").is_none());
        assert_eq!(config.organization, "acme");
        assert_eq!(config.field_manager, FIELD_MANAGER);
    }

    #[test]
    fn test_descriptions_are_sorted() {
        let config = ProviderConfig::new("acme");
        let keys: Vec<_> = config.descriptions().map(|(k, _)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert!(!keys.is_empty());
    }
}
