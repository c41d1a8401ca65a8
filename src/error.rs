//! Error types for the Pulsar cloud provider

use std::fmt;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur during provider operations
#[derive(Debug)]
pub enum ProviderError {
    /// Control plane API error
    Api(String),
    /// Configuration error
    Configuration(String),
    /// Serialization error
    Serialization(String),
    /// Resource not found
    NotFound(String),
    /// The remote reconciler reported a terminal failure
    ConvergenceFailed(String),
    /// The resource did not converge within the deadline
    Timeout(String),
    /// The caller cancelled the operation
    Cancelled(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Api(msg) => write!(f, "Control plane API error: {}", msg),
            ProviderError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ProviderError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ProviderError::NotFound(msg) => write!(f, "Resource not found: {}", msg),
            ProviderError::ConvergenceFailed(msg) => write!(f, "Convergence failed: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            ProviderError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<kube::Error> for ProviderError {
    fn from(err: kube::Error) -> Self {
        // 404 gets its own variant so readiness predicates can classify it.
        match err {
            kube::Error::Api(ae) if ae.code == 404 => ProviderError::NotFound(ae.message),
            other => ProviderError::Api(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Serialization(err.to_string())
    }
}

impl ProviderError {
    /// Whether this error is the control plane saying the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::Api("test error".to_string());
        assert!(err.to_string().contains("Control plane API error"));
    }

    #[test]
    fn test_error_variants() {
        let errors = vec![
            ProviderError::Api("api".to_string()),
            ProviderError::Configuration("config".to_string()),
            ProviderError::Serialization("serde".to_string()),
            ProviderError::NotFound("resource".to_string()),
            ProviderError::ConvergenceFailed("rejected".to_string()),
            ProviderError::Timeout("deadline".to_string()),
            ProviderError::Cancelled("ctrl-c".to_string()),
        ];

        for err in errors {
            // Ensure Display is implemented
            let _ = format!("{}", err);
        }
    }

    #[test]
    fn test_is_not_found() {
        assert!(ProviderError::NotFound("gone".to_string()).is_not_found());
        assert!(!ProviderError::Api("500".to_string()).is_not_found());
    }

    #[test]
    fn test_kube_404_maps_to_not_found() {
        let ae = kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "pulsarclusters \"demo\" not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        };
        let err: ProviderError = kube::Error::Api(ae).into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_kube_other_api_error_maps_to_api() {
        let ae = kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        };
        let err: ProviderError = kube::Error::Api(ae).into();
        assert!(matches!(err, ProviderError::Api(_)));
    }
}
