//! Resource handlers
//!
//! One module per resource kind. Each handler owns the sequence "submit
//! mutation, invoke the convergence poller with the kind's predicate and
//! deadline, flatten the final state". Organization is a read-only data
//! source.

mod organization;
mod pool_member;
mod pulsar_cluster;
mod pulsar_gateway;
mod pulsar_instance;
mod service_account_binding;

pub use organization::{OrganizationDataSource, OrganizationState};
pub use pool_member::{PoolMemberConfig, PoolMemberHandler, PoolMemberState};
pub use pulsar_cluster::{PulsarClusterConfig, PulsarClusterHandler, PulsarClusterState};
pub use pulsar_gateway::{PulsarGatewayConfig, PulsarGatewayHandler, PulsarGatewayState};
pub use pulsar_instance::{PulsarInstanceConfig, PulsarInstanceHandler, PulsarInstanceState};
pub use service_account_binding::{
    ServiceAccountBindingConfig, ServiceAccountBindingHandler, ServiceAccountBindingState,
};
