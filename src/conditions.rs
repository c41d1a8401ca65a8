//! Kubernetes-standard status condition helpers
//!
//! Provides constants and read-side helpers for interpreting the status
//! conditions reported by the control plane. The provider never writes
//! conditions; the remote reconciler owns them.

use crate::api::Condition;

// Condition status values
pub const CONDITION_TRUE: &str = "True";
pub const CONDITION_FALSE: &str = "False";
pub const CONDITION_UNKNOWN: &str = "Unknown";

// Condition types reported by the control plane
pub const CONDITION_READY: &str = "Ready";
pub const CONDITION_ACTIVE: &str = "Active";
pub const CONDITION_PROVISIONED: &str = "Provisioned";

/// Look up the status string of a condition by type.
pub fn condition_status<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a str> {
    conditions
        .iter()
        .find(|c| c.r#type == condition_type)
        .map(|c| c.status.as_str())
}

/// Whether a condition of the given type exists and reports "True".
pub fn is_condition_true(conditions: &[Condition], condition_type: &str) -> bool {
    condition_status(conditions, condition_type) == Some(CONDITION_TRUE)
}

/// The message of a condition by type, if any was reported.
pub fn condition_message<'a>(conditions: &'a [Condition], condition_type: &str) -> Option<&'a str> {
    conditions
        .iter()
        .find(|c| c.r#type == condition_type)
        .and_then(|c| c.message.as_deref())
}
