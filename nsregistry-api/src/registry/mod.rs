//! Namespace registry
//!
//! Registers Kubernetes namespaces against clusters and answers who may see
//! which of them:
//! - `service` creates, verifies and de-registers namespaces
//! - `access` partitions namespaces into authorized/unauthorized sets and
//!   serves the filtered listings
//! - `memory` holds in-process implementations of every collaborator
//!
//! The registry itself keeps no state. Everything it reads or writes goes
//! through the traits below.

pub mod access;
pub mod error;
pub mod memory;
pub mod service;

pub use access::{AccessPartitioner, Partition};
pub use error::{GatewayError, RegistryError, RegistryResult, StoreError};
pub use service::NamespaceRegistry;

use async_trait::async_trait;
use error::{GatewayResult, StoreResult};
use nsregistry_common::auth::Principal;
use nsregistry_common::{K8sNamespace, NewNamespace};
use std::collections::HashSet;

/// Persistent record of registered namespaces.
///
/// Implementations must reject a second record for the same
/// (name, cluster_code) with `StoreError::Conflict`, even when two inserts
/// race.
#[async_trait]
pub trait NamespaceStore: Send + Sync {
    async fn insert(&self, namespace: NewNamespace) -> StoreResult<K8sNamespace>;

    async fn find_by_name_and_cluster(
        &self,
        name: &str,
        cluster_code: i64,
    ) -> StoreResult<Option<K8sNamespace>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<K8sNamespace>>;

    async fn list_all(&self) -> StoreResult<Vec<K8sNamespace>>;

    /// Fails with `StoreError::NotFound` when no record has this id
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

/// Explicit (user, namespace) grants
#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn list_grants_for_user(&self, user_id: i64) -> StoreResult<HashSet<i64>>;
}

/// Resolves the subject of the admin-facing per-user queries
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: i64) -> StoreResult<Option<Principal>>;
}

/// Reports whether workloads still run in a namespace
#[async_trait]
pub trait WorkloadReferenceCheck: Send + Sync {
    async fn has_active_dependents(&self, namespace_id: i64) -> StoreResult<bool>;
}

/// Boundary over the live cluster control plane.
///
/// Implementations own their timeouts; the registry calls each method at
/// most once per request.
#[async_trait]
pub trait ClusterGateway: Send + Sync {
    async fn exists(&self, cluster_code: i64, name: &str) -> GatewayResult<bool>;

    async fn create(&self, cluster_code: i64, name: &str) -> GatewayResult<()>;
}
