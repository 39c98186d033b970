//! Common test utilities and helpers

#![allow(dead_code)]

use nsregistry_api::registry::memory::{
    InMemoryClusterGateway, InMemoryGrantStore, InMemoryNamespaceStore, InMemoryUserDirectory,
    StaticWorkloadReferences,
};
use nsregistry_api::registry::{AccessPartitioner, NamespaceRegistry};
use nsregistry_common::auth::{Principal, UserRole};
use std::sync::Arc;

pub const CLUSTER_A: i64 = 100;
pub const CLUSTER_B: i64 = 200;

pub fn admin() -> Principal {
    Principal::new(1, "admin", UserRole::Admin)
}

pub fn alice() -> Principal {
    Principal::new(7, "alice", UserRole::General)
}

pub fn bob() -> Principal {
    Principal::new(8, "bob", UserRole::General)
}

/// Registry wired to in-memory collaborators, with handles kept for
/// inspection and setup
pub struct TestEnv {
    pub namespaces: Arc<InMemoryNamespaceStore>,
    pub grants: Arc<InMemoryGrantStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub workloads: Arc<StaticWorkloadReferences>,
    pub gateway: Arc<InMemoryClusterGateway>,
    pub registry: Arc<NamespaceRegistry>,
    pub access: Arc<AccessPartitioner>,
}

impl TestEnv {
    pub async fn new() -> Self {
        let namespaces = Arc::new(InMemoryNamespaceStore::new());
        let grants = Arc::new(InMemoryGrantStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let workloads = Arc::new(StaticWorkloadReferences::new());
        let gateway = Arc::new(InMemoryClusterGateway::with_clusters([CLUSTER_A, CLUSTER_B]));

        for user in [admin(), alice(), bob()] {
            users.add_user(user).await;
        }

        let registry = Arc::new(NamespaceRegistry::new(
            namespaces.clone(),
            gateway.clone(),
            workloads.clone(),
        ));
        let access = Arc::new(AccessPartitioner::new(
            namespaces.clone(),
            grants.clone(),
            users.clone(),
        ));

        TestEnv {
            namespaces,
            grants,
            users,
            workloads,
            gateway,
            registry,
            access,
        }
    }
}
