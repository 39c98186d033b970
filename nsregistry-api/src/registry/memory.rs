//! In-process collaborators
//!
//! Used by the test suites and by the server when no Kubernetes backend is
//! compiled in. Every type here is safe to share across tasks.

use super::error::{GatewayError, GatewayResult, StoreError, StoreResult};
use super::{ClusterGateway, GrantStore, NamespaceStore, UserDirectory, WorkloadReferenceCheck};
use async_trait::async_trait;
use nsregistry_common::auth::Principal;
use nsregistry_common::{K8sNamespace, NewNamespace};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
struct NamespaceTable {
    next_id: i64,
    rows: BTreeMap<i64, K8sNamespace>,
}

/// Namespace store backed by a map; uniqueness is checked under the write lock
#[derive(Default)]
pub struct InMemoryNamespaceStore {
    table: RwLock<NamespaceTable>,
}

impl InMemoryNamespaceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NamespaceStore for InMemoryNamespaceStore {
    async fn insert(&self, namespace: NewNamespace) -> StoreResult<K8sNamespace> {
        let mut table = self.table.write().await;

        let duplicate = table.rows.values().any(|ns| {
            ns.name == namespace.name && ns.cluster_code == namespace.cluster_code
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "{} on cluster {}",
                namespace.name, namespace.cluster_code
            )));
        }

        table.next_id += 1;
        let record = K8sNamespace {
            id: table.next_id,
            code: namespace.code,
            name: namespace.name,
            cluster_code: namespace.cluster_code,
            owner_id: namespace.owner_id,
            created_at: namespace.created_at,
            updated_at: namespace.created_at,
        };
        table.rows.insert(record.id, record.clone());

        Ok(record)
    }

    async fn find_by_name_and_cluster(
        &self,
        name: &str,
        cluster_code: i64,
    ) -> StoreResult<Option<K8sNamespace>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|ns| ns.name == name && ns.cluster_code == cluster_code)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<K8sNamespace>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<K8sNamespace>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

/// Grant edges keyed by user
#[derive(Default)]
pub struct InMemoryGrantStore {
    grants: RwLock<HashMap<i64, HashSet<i64>>>,
}

impl InMemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn grant(&self, user_id: i64, namespace_id: i64) {
        self.grants
            .write()
            .await
            .entry(user_id)
            .or_default()
            .insert(namespace_id);
    }

    pub async fn revoke(&self, user_id: i64, namespace_id: i64) {
        if let Some(set) = self.grants.write().await.get_mut(&user_id) {
            set.remove(&namespace_id);
        }
    }
}

#[async_trait]
impl GrantStore for InMemoryGrantStore {
    async fn list_grants_for_user(&self, user_id: i64) -> StoreResult<HashSet<i64>> {
        Ok(self
            .grants
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<i64, Principal>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user: Principal) {
        self.users.write().await.insert(user.user_id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, user_id: i64) -> StoreResult<Option<Principal>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

/// Namespaces explicitly marked as having active workloads
#[derive(Default)]
pub struct StaticWorkloadReferences {
    active: RwLock<HashSet<i64>>,
}

impl StaticWorkloadReferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mark_active(&self, namespace_id: i64) {
        self.active.write().await.insert(namespace_id);
    }

    pub async fn clear(&self, namespace_id: i64) {
        self.active.write().await.remove(&namespace_id);
    }
}

#[async_trait]
impl WorkloadReferenceCheck for StaticWorkloadReferences {
    async fn has_active_dependents(&self, namespace_id: i64) -> StoreResult<bool> {
        Ok(self.active.read().await.contains(&namespace_id))
    }
}

/// Simulated clusters: each known code holds a set of namespace names
#[derive(Default)]
pub struct InMemoryClusterGateway {
    clusters: RwLock<HashMap<i64, HashSet<String>>>,
    create_calls: AtomicUsize,
    fail_next_create: AtomicBool,
}

impl InMemoryClusterGateway {
    pub fn with_clusters(codes: impl IntoIterator<Item = i64>) -> Self {
        let clusters = codes.into_iter().map(|code| (code, HashSet::new())).collect();
        Self {
            clusters: RwLock::new(clusters),
            ..Default::default()
        }
    }

    /// Put a namespace on a cluster without going through `create`
    pub async fn seed_namespace(&self, cluster_code: i64, name: &str) {
        self.clusters
            .write()
            .await
            .entry(cluster_code)
            .or_default()
            .insert(name.to_string());
    }

    /// Make the next `create` call fail without touching the cluster
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    /// Number of `create` calls received, failed ones included
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClusterGateway for InMemoryClusterGateway {
    async fn exists(&self, cluster_code: i64, name: &str) -> GatewayResult<bool> {
        let clusters = self.clusters.read().await;
        let namespaces = clusters
            .get(&cluster_code)
            .ok_or(GatewayError::ClusterNotFound(cluster_code))?;
        Ok(namespaces.contains(name))
    }

    async fn create(&self, cluster_code: i64, name: &str) -> GatewayResult<()> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::CreateFailed(format!(
                "cluster {} rejected namespace {}",
                cluster_code, name
            )));
        }

        let mut clusters = self.clusters.write().await;
        let namespaces = clusters
            .get_mut(&cluster_code)
            .ok_or(GatewayError::ClusterNotFound(cluster_code))?;
        namespaces.insert(name.to_string());
        Ok(())
    }
}
