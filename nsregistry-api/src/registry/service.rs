//! Namespace registration, verification and de-registration

use super::access;
use super::error::{RegistryError, RegistryResult, StoreError};
use super::{ClusterGateway, NamespaceStore, WorkloadReferenceCheck};
use crate::validation;
use chrono::Utc;
use nsregistry_common::auth::Principal;
use nsregistry_common::{K8sNamespace, NewNamespace};
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates the namespace store and the cluster gateway
pub struct NamespaceRegistry {
    namespaces: Arc<dyn NamespaceStore>,
    gateway: Arc<dyn ClusterGateway>,
    workloads: Arc<dyn WorkloadReferenceCheck>,
}

impl NamespaceRegistry {
    pub fn new(
        namespaces: Arc<dyn NamespaceStore>,
        gateway: Arc<dyn ClusterGateway>,
        workloads: Arc<dyn WorkloadReferenceCheck>,
    ) -> Self {
        Self {
            namespaces,
            gateway,
            workloads,
        }
    }

    /// Register a namespace, creating it on the cluster first if it is absent.
    ///
    /// Safe to call again after any failure: a retry that finds the namespace
    /// already on the cluster only registers it.
    pub async fn create_or_register(
        &self,
        caller: &Principal,
        name: &str,
        cluster_code: i64,
    ) -> RegistryResult<K8sNamespace> {
        validation::validate_namespace_name(name)?;

        if self
            .namespaces
            .find_by_name_and_cluster(name, cluster_code)
            .await?
            .is_some()
        {
            warn!(
                namespace = name,
                cluster_code,
                user_id = caller.user_id,
                "Namespace already registered"
            );
            return Err(already_registered(name, cluster_code));
        }

        if self.gateway.exists(cluster_code, name).await? {
            info!(
                namespace = name,
                cluster_code, "Namespace exists on cluster, registering only"
            );
        } else {
            self.gateway.create(cluster_code, name).await.map_err(|e| {
                warn!(namespace = name, cluster_code, "Cluster create failed: {}", e);
                RegistryError::from(e)
            })?;
            info!(namespace = name, cluster_code, "Created namespace on cluster");
        }

        let record = NewNamespace {
            code: generate_code(),
            name: name.to_string(),
            cluster_code,
            owner_id: caller.user_id,
            created_at: Utc::now(),
        };

        // A concurrent registration may have won the race since the lookup
        let namespace = self.namespaces.insert(record).await.map_err(|e| match e {
            StoreError::Conflict(_) => already_registered(name, cluster_code),
            other => other.into(),
        })?;

        info!(
            namespace = %namespace.name,
            cluster_code,
            id = namespace.id,
            user_id = caller.user_id,
            "Registered namespace"
        );

        Ok(namespace)
    }

    /// True when no registered namespace has this (name, cluster) pair.
    /// Names that could never be registered are rejected the same way
    /// `create_or_register` rejects them.
    pub async fn verify_unique(&self, name: &str, cluster_code: i64) -> RegistryResult<bool> {
        validation::validate_namespace_name(name)?;

        let existing = self
            .namespaces
            .find_by_name_and_cluster(name, cluster_code)
            .await?;
        Ok(existing.is_none())
    }

    /// De-register a namespace. The object on the cluster is left untouched.
    pub async fn delete_by_id(&self, caller: &Principal, namespace_id: i64) -> RegistryResult<()> {
        let namespace = self
            .namespaces
            .find_by_id(namespace_id)
            .await?
            .ok_or_else(|| {
                RegistryError::NotFound(format!("Namespace {} not found", namespace_id))
            })?;

        if !access::can_manage(caller, &namespace) {
            warn!(
                id = namespace_id,
                user_id = caller.user_id,
                "Delete refused, caller is neither owner nor admin"
            );
            return Err(RegistryError::Forbidden(format!(
                "User {} may not delete namespace {}",
                caller.username, namespace.name
            )));
        }

        if self.workloads.has_active_dependents(namespace_id).await? {
            return Err(RegistryError::InUse(format!(
                "Namespace '{}' on cluster {} still has active workloads",
                namespace.name, namespace.cluster_code
            )));
        }

        self.namespaces.delete(namespace_id).await?;

        info!(
            namespace = %namespace.name,
            cluster_code = namespace.cluster_code,
            id = namespace_id,
            user_id = caller.user_id,
            "De-registered namespace"
        );

        Ok(())
    }
}

fn already_registered(name: &str, cluster_code: i64) -> RegistryError {
    RegistryError::Conflict(format!(
        "Namespace '{}' is already registered on cluster {}",
        name, cluster_code
    ))
}

/// Opaque namespace code: epoch milliseconds in the high bits, 12 random
/// bits below.
pub fn generate_code() -> i64 {
    let millis = Utc::now().timestamp_millis();
    let salt = rand::random::<u16>() as i64 & 0xFFF;
    (millis << 12) | salt
}
