//! Pulsar cloud provider
//!
//! A declarative provisioning client for a managed Pulsar control plane.
//! The control plane is a Kubernetes-style API server that reconciles
//! custom resources asynchronously; this crate submits typed resource
//! configurations and blocks until the remote reconciler converges.
//!
//! ## Resources
//!
//! - `PoolMember`: infrastructure capacity unit
//! - `PulsarInstance`: logical Pulsar instance
//! - `PulsarCluster`: broker/bookkeeper deployment
//! - `PulsarGateway`: network entry point
//! - `ServiceAccountBinding`: cluster access grant
//! - `Organization`: read-only tenant lookup
//!
//! ## Example
//!
//! ```json
//! {
//!   "organization": "acme",
//!   "clusters": [
//!     {"name": "prod-east", "instance_name": "prod", "location": "us-east1"}
//!   ]
//! }
//! ```

pub mod api;
pub mod conditions;
pub mod config;
pub mod error;
pub mod manifest;
pub mod resources;
pub mod wait;

pub use config::{ProviderConfig, WaitTimeouts};
pub use error::{ProviderError, Result};
pub use manifest::Manifest;
pub use resources::{
    OrganizationDataSource, PoolMemberHandler, PulsarClusterHandler, PulsarGatewayHandler,
    PulsarInstanceHandler, ServiceAccountBindingHandler,
};
pub use wait::{poll_until, PollOutcome, PollParams, ReadyState};
