//! Kubernetes error types and gateway error mapping

use crate::registry::GatewayError;
use thiserror::Error;

/// Kubernetes-specific errors
#[derive(Debug, Error)]
pub enum K8sError {
    /// No client configured under this cluster code
    #[error("Cluster not found: {0}")]
    ClusterNotFound(i64),

    /// Error from kube-rs client
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    /// Invalid kubeconfig
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// The API server did not answer within the configured deadline
    #[error("Cluster {cluster_code} timed out after {secs}s")]
    Timeout { cluster_code: i64, secs: u64 },
}

impl K8sError {
    /// Map a failed read (existence check) to a gateway error
    pub fn into_lookup_error(self, cluster_code: i64) -> GatewayError {
        match self {
            K8sError::ClusterNotFound(code) => GatewayError::ClusterNotFound(code),
            other => GatewayError::Unreachable {
                cluster_code,
                reason: other.to_string(),
            },
        }
    }

    /// Map a failed create call to a gateway error
    pub fn into_create_error(self) -> GatewayError {
        match self {
            K8sError::ClusterNotFound(code) => GatewayError::ClusterNotFound(code),
            other => GatewayError::CreateFailed(other.to_string()),
        }
    }
}

/// Result type alias for Kubernetes operations
pub type K8sResult<T> = std::result::Result<T, K8sError>;
