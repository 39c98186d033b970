//! Permission-scoped namespace visibility
//!
//! A user is authorized for a namespace when they own it, hold the admin
//! role, or have an explicit grant for it. Every listing here filters with
//! that one predicate.

use super::error::{RegistryError, RegistryResult};
use super::{GrantStore, NamespaceStore, UserDirectory};
use crate::validation;
use nsregistry_common::auth::Principal;
use nsregistry_common::{K8sNamespace, Page};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Default upper bound for `page_size`
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;

/// Split of all registered namespaces for one user
#[derive(Debug, Clone, Default, Serialize)]
pub struct Partition {
    pub authorized: Vec<K8sNamespace>,
    pub unauthorized: Vec<K8sNamespace>,
}

/// Owner, admin, or explicitly granted
pub fn is_authorized(user: &Principal, namespace: &K8sNamespace, grants: &HashSet<i64>) -> bool {
    can_manage(user, namespace) || grants.contains(&namespace.id)
}

/// Owner or admin; required for de-registration
pub fn can_manage(user: &Principal, namespace: &K8sNamespace) -> bool {
    user.is_admin() || namespace.owner_id == user.user_id
}

/// Computes authorized/unauthorized/available namespace sets
pub struct AccessPartitioner {
    namespaces: Arc<dyn NamespaceStore>,
    grants: Arc<dyn GrantStore>,
    users: Arc<dyn UserDirectory>,
    max_page_size: u32,
}

impl AccessPartitioner {
    pub fn new(
        namespaces: Arc<dyn NamespaceStore>,
        grants: Arc<dyn GrantStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            namespaces,
            grants,
            users,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Partition every registered namespace for `user`, both halves ordered by id
    pub async fn partition(&self, user: &Principal) -> RegistryResult<Partition> {
        let mut all = self.namespaces.list_all().await?;
        all.sort_by_key(|ns| ns.id);

        let grants = self.grants_for(user).await?;
        let (authorized, unauthorized): (Vec<_>, Vec<_>) = all
            .into_iter()
            .partition(|ns| is_authorized(user, ns, &grants));

        Ok(Partition {
            authorized,
            unauthorized,
        })
    }

    /// Namespaces the target user may use. Admin only.
    pub async fn authorized_for(
        &self,
        caller: &Principal,
        target_user_id: i64,
    ) -> RegistryResult<Vec<K8sNamespace>> {
        let target = self.resolve_target(caller, target_user_id).await?;
        Ok(self.partition(&target).await?.authorized)
    }

    /// Namespaces the target user may not use yet. Admin only.
    pub async fn unauthorized_for(
        &self,
        caller: &Principal,
        target_user_id: i64,
    ) -> RegistryResult<Vec<K8sNamespace>> {
        let target = self.resolve_target(caller, target_user_id).await?;
        Ok(self.partition(&target).await?.unauthorized)
    }

    /// Namespaces `user` may select when submitting work, oldest first,
    /// one entry per (name, cluster)
    pub async fn available_for(&self, user: &Principal) -> RegistryResult<Vec<K8sNamespace>> {
        let mut authorized = self.visible_to(user).await?;
        authorized.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut seen = HashSet::new();
        authorized.retain(|ns| seen.insert((ns.name.clone(), ns.cluster_code)));

        Ok(authorized)
    }

    /// Search-filtered page of the namespaces visible to `user`, newest first
    pub async fn paged_list(
        &self,
        user: &Principal,
        search: Option<&str>,
        page_no: u32,
        page_size: u32,
    ) -> RegistryResult<Page<K8sNamespace>> {
        validation::validate_page(page_no, page_size, self.max_page_size)?;

        let mut visible = self.visible_to(user).await?;

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let needle = term.to_lowercase();
            visible.retain(|ns| ns.name.to_lowercase().contains(&needle));
        }

        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = visible.len() as u64;
        let offset = (page_no as usize - 1) * page_size as usize;
        let items = visible
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        debug!(
            user_id = user.user_id,
            page_no, page_size, total, "Listed namespaces"
        );

        Ok(Page {
            items,
            total,
            page_no,
            page_size,
        })
    }

    async fn visible_to(&self, user: &Principal) -> RegistryResult<Vec<K8sNamespace>> {
        let all = self.namespaces.list_all().await?;
        if user.is_admin() {
            return Ok(all);
        }

        let grants = self.grants_for(user).await?;
        Ok(all
            .into_iter()
            .filter(|ns| is_authorized(user, ns, &grants))
            .collect())
    }

    async fn grants_for(&self, user: &Principal) -> RegistryResult<HashSet<i64>> {
        if user.is_admin() {
            return Ok(HashSet::new());
        }
        Ok(self.grants.list_grants_for_user(user.user_id).await?)
    }

    async fn resolve_target(
        &self,
        caller: &Principal,
        target_user_id: i64,
    ) -> RegistryResult<Principal> {
        if !caller.is_admin() {
            return Err(RegistryError::Forbidden(format!(
                "User {} may not query other users' namespace grants",
                caller.username
            )));
        }

        self.users
            .find_user(target_user_id)
            .await?
            .ok_or_else(|| RegistryError::NotFound(format!("User {} not found", target_user_id)))
    }
}
