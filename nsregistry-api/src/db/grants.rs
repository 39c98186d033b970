///! Namespace grant edges
///!
///! Grants are written by the authorization-management side of the platform;
///! the registry only reads them.

use super::namespaces::backend;
use super::Database;
use crate::registry::error::StoreResult;
use crate::registry::GrantStore;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::collections::HashSet;

/// Grant a user access to a namespace; granting twice is a no-op
pub async fn grant_namespace(pool: &SqlitePool, user_id: i64, namespace_id: i64) -> StoreResult<()> {
    sqlx::query("INSERT OR IGNORE INTO namespace_grants (user_id, namespace_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(namespace_id)
        .execute(pool)
        .await
        .map_err(backend("Failed to grant namespace"))?;

    Ok(())
}

pub async fn revoke_namespace(pool: &SqlitePool, user_id: i64, namespace_id: i64) -> StoreResult<()> {
    sqlx::query("DELETE FROM namespace_grants WHERE user_id = ? AND namespace_id = ?")
        .bind(user_id)
        .bind(namespace_id)
        .execute(pool)
        .await
        .map_err(backend("Failed to revoke namespace"))?;

    Ok(())
}

pub async fn list_granted_namespace_ids(pool: &SqlitePool, user_id: i64) -> StoreResult<HashSet<i64>> {
    let ids: Vec<(i64,)> =
        sqlx::query_as("SELECT namespace_id FROM namespace_grants WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(pool)
            .await
            .map_err(backend("Failed to list grants"))?;

    Ok(ids.into_iter().map(|(id,)| id).collect())
}

#[async_trait]
impl GrantStore for Database {
    async fn list_grants_for_user(&self, user_id: i64) -> StoreResult<HashSet<i64>> {
        list_granted_namespace_ids(self.pool(), user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grant_is_idempotent_and_revocable() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();

        grant_namespace(db.pool(), 7, 1).await.unwrap();
        grant_namespace(db.pool(), 7, 1).await.unwrap();
        grant_namespace(db.pool(), 7, 2).await.unwrap();
        grant_namespace(db.pool(), 8, 3).await.unwrap();

        assert_eq!(db.list_grants_for_user(7).await.unwrap(), HashSet::from([1, 2]));

        revoke_namespace(db.pool(), 7, 1).await.unwrap();
        assert_eq!(db.list_grants_for_user(7).await.unwrap(), HashSet::from([2]));
        assert!(db.list_grants_for_user(9).await.unwrap().is_empty());
    }
}
