//! Registry error types and ApiError mapping
//!
//! Every failure is scoped to a single request and returned to the caller;
//! nothing in the registry retries on its own.

use crate::error::ApiError;
use thiserror::Error;

/// Errors surfaced by namespace store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The (name, cluster) pair is already registered
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No record with this id
    #[error("Namespace {0} not found")]
    NotFound(i64),

    /// Backend failure (database, I/O)
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by cluster gateway implementations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No cluster is configured under this code
    #[error("Cluster not found: {0}")]
    ClusterNotFound(i64),

    /// The cluster did not answer in time or refused the connection
    #[error("Cluster {cluster_code} unreachable: {reason}")]
    Unreachable { cluster_code: i64, reason: String },

    /// The cluster rejected the namespace create call
    #[error("Failed to create namespace on cluster: {0}")]
    CreateFailed(String),
}

/// Errors returned by the registry service and the access partitioner
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Delete blocked by active workloads
    #[error("Namespace in use: {0}")]
    InUse(String),

    #[error("External create failed: {0}")]
    ExternalCreateFailure(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A collaborator failed for reasons unrelated to the request
    #[error("Store error: {0}")]
    Store(String),
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => RegistryError::Conflict(msg),
            StoreError::NotFound(id) => {
                RegistryError::NotFound(format!("Namespace {} not found", id))
            }
            StoreError::Backend(msg) => RegistryError::Store(msg),
        }
    }
}

impl From<GatewayError> for RegistryError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::ClusterNotFound(code) => {
                RegistryError::NotFound(format!("Cluster {} not found", code))
            }
            GatewayError::Unreachable {
                cluster_code,
                reason,
            } => RegistryError::NotFound(format!(
                "Cluster {} is not reachable: {}",
                cluster_code, reason
            )),
            GatewayError::CreateFailed(msg) => RegistryError::ExternalCreateFailure(msg),
        }
    }
}

impl From<nsregistry_common::Error> for RegistryError {
    fn from(err: nsregistry_common::Error) -> Self {
        match err {
            nsregistry_common::Error::Validation(msg) => RegistryError::InvalidArgument(msg),
            other => RegistryError::Store(other.to_string()),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(msg) => ApiError::NotFound(msg),
            RegistryError::Conflict(msg) => ApiError::Conflict(msg),
            RegistryError::Forbidden(msg) => ApiError::Forbidden(msg),
            RegistryError::InUse(msg) => ApiError::InUse(msg),
            RegistryError::ExternalCreateFailure(msg) => ApiError::BadGateway(msg),
            RegistryError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            RegistryError::Store(msg) => ApiError::Internal(msg),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
