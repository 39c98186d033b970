///! Workloads referencing a namespace
///!
///! The scheduler records which workloads run in a namespace; a namespace
///! with any active reference cannot be de-registered.

use super::namespaces::backend;
use super::Database;
use crate::registry::error::StoreResult;
use crate::registry::WorkloadReferenceCheck;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;

/// Record or update a workload reference
pub async fn set_workload_reference(
    pool: &SqlitePool,
    namespace_id: i64,
    workload: &str,
    active: bool,
) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO namespace_workload_refs (namespace_id, workload, active)
         VALUES (?, ?, ?)
         ON CONFLICT (namespace_id, workload)
         DO UPDATE SET active = excluded.active, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(namespace_id)
    .bind(workload)
    .bind(active)
    .execute(pool)
    .await
    .map_err(backend("Failed to record workload reference"))?;

    Ok(())
}

pub async fn count_active_references(pool: &SqlitePool, namespace_id: i64) -> StoreResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM namespace_workload_refs WHERE namespace_id = ? AND active = 1",
    )
    .bind(namespace_id)
    .fetch_one(pool)
    .await
    .map_err(backend("Failed to count workload references"))?;

    Ok(count)
}

#[async_trait]
impl WorkloadReferenceCheck for Database {
    async fn has_active_dependents(&self, namespace_id: i64) -> StoreResult<bool> {
        Ok(count_active_references(self.pool(), namespace_id).await? > 0)
    }
}
