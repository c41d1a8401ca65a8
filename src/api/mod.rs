//! Typed models of the control plane's custom resources
//!
//! One module per resource kind in the `cloud.pulsar.io/v1alpha1` API group:
//! - Organization: tenant root (cluster-scoped, read-only from this provider)
//! - PoolMember: infrastructure capacity unit
//! - PulsarInstance: logical Pulsar instance
//! - PulsarCluster: broker/bookkeeper deployment within an instance
//! - PulsarGateway: network entry point for a pool member
//! - ServiceAccountBinding: grants a service account access to a cluster

mod gateway;
mod instance;
mod organization;
mod pool_member;
mod pulsar_cluster;
mod service_account_binding;

pub use gateway::{GatewayAccess, GatewaySpec, GatewayStatus, PrivateService, PulsarGateway};
pub use instance::{InstanceSpec, InstanceStatus, PoolRef, PulsarInstance};
pub use organization::{Organization, OrganizationSpec, OrganizationStatus};
pub use pool_member::{PoolMember, PoolMemberNetwork, PoolMemberSpec, PoolMemberStatus};
pub use pulsar_cluster::{
    BookKeeperSpec, BrokerSpec, ClusterConfig, ComputeResources, ProtocolListeners, PulsarCluster,
    PulsarClusterSpec, PulsarClusterStatus, ServiceEndpoint,
};
pub use service_account_binding::{
    ServiceAccountBinding, ServiceAccountBindingSpec, ServiceAccountBindingStatus,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of all resources in this crate.
pub const API_GROUP: &str = "cloud.pulsar.io";
/// API version of all resources in this crate.
pub const API_VERSION: &str = "v1alpha1";

/// Status condition reported by the control plane, following the
/// Kubernetes API conventions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last time the condition transitioned
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

/// Read access to a resource's status conditions.
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];
}

/// Read access to the generation counters used to detect whether the
/// control plane has processed the latest submitted spec.
pub trait HasGeneration {
    fn generation(&self) -> Option<i64>;
    fn observed_generation(&self) -> Option<i64>;
}
