///! Registered namespace records

use super::{from_millis, Database};
use crate::registry::error::{StoreError, StoreResult};
use crate::registry::NamespaceStore;
use async_trait::async_trait;
use nsregistry_common::{K8sNamespace, NewNamespace};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

pub async fn insert_namespace(pool: &SqlitePool, ns: &NewNamespace) -> StoreResult<K8sNamespace> {
    let created = ns.created_at.timestamp_millis();

    let result = sqlx::query(
        "INSERT INTO k8s_namespaces (code, name, cluster_code, owner_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(ns.code)
    .bind(&ns.name)
    .bind(ns.cluster_code)
    .bind(ns.owner_id)
    .bind(created)
    .bind(created)
    .execute(pool)
    .await
    .map_err(|e| map_insert_error(e, ns))?;

    Ok(K8sNamespace {
        id: result.last_insert_rowid(),
        code: ns.code,
        name: ns.name.clone(),
        cluster_code: ns.cluster_code,
        owner_id: ns.owner_id,
        created_at: from_millis(created),
        updated_at: from_millis(created),
    })
}

pub async fn get_namespace_by_name_and_cluster(
    pool: &SqlitePool,
    name: &str,
    cluster_code: i64,
) -> StoreResult<Option<K8sNamespace>> {
    let row = sqlx::query("SELECT * FROM k8s_namespaces WHERE name = ? AND cluster_code = ?")
        .bind(name)
        .bind(cluster_code)
        .fetch_optional(pool)
        .await
        .map_err(backend("Failed to query namespace"))?;

    Ok(row.as_ref().map(row_to_namespace))
}

pub async fn get_namespace(pool: &SqlitePool, id: i64) -> StoreResult<Option<K8sNamespace>> {
    let row = sqlx::query("SELECT * FROM k8s_namespaces WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(backend("Failed to query namespace"))?;

    Ok(row.as_ref().map(row_to_namespace))
}

pub async fn list_namespaces(pool: &SqlitePool) -> StoreResult<Vec<K8sNamespace>> {
    let rows = sqlx::query("SELECT * FROM k8s_namespaces ORDER BY id")
        .fetch_all(pool)
        .await
        .map_err(backend("Failed to list namespaces"))?;

    Ok(rows.iter().map(row_to_namespace).collect())
}

/// Removes the namespace together with its grants and workload references
pub async fn delete_namespace(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(backend("Failed to start transaction"))?;

    let result = sqlx::query("DELETE FROM k8s_namespaces WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(backend("Failed to delete namespace"))?;

    if result.rows_affected() == 0 {
        return Err(StoreError::NotFound(id));
    }

    sqlx::query("DELETE FROM namespace_grants WHERE namespace_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(backend("Failed to delete namespace grants"))?;

    sqlx::query("DELETE FROM namespace_workload_refs WHERE namespace_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(backend("Failed to delete workload references"))?;

    tx.commit()
        .await
        .map_err(backend("Failed to commit namespace delete"))?;

    Ok(())
}

fn row_to_namespace(row: &SqliteRow) -> K8sNamespace {
    K8sNamespace {
        id: row.get("id"),
        code: row.get("code"),
        name: row.get("name"),
        cluster_code: row.get("cluster_code"),
        owner_id: row.get("owner_id"),
        created_at: from_millis(row.get("created_at")),
        updated_at: from_millis(row.get("updated_at")),
    }
}

/// A unique violation on (name, cluster_code) is a registration conflict.
/// A clash on the generated code is not the caller's fault.
fn map_insert_error(err: sqlx::Error, ns: &NewNamespace) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if db_err.message().contains("k8s_namespaces.code") {
                return StoreError::Backend(format!("Namespace code {} already in use", ns.code));
            }
            return StoreError::Conflict(format!(
                "Namespace '{}' is already registered on cluster {}",
                ns.name, ns.cluster_code
            ));
        }
    }
    StoreError::Backend(format!("Failed to insert namespace: {}", err))
}

pub(crate) fn backend(context: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| StoreError::Backend(format!("{}: {}", context, e))
}

#[async_trait]
impl NamespaceStore for Database {
    async fn insert(&self, namespace: NewNamespace) -> StoreResult<K8sNamespace> {
        insert_namespace(self.pool(), &namespace).await
    }

    async fn find_by_name_and_cluster(
        &self,
        name: &str,
        cluster_code: i64,
    ) -> StoreResult<Option<K8sNamespace>> {
        get_namespace_by_name_and_cluster(self.pool(), name, cluster_code).await
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<K8sNamespace>> {
        get_namespace(self.pool(), id).await
    }

    async fn list_all(&self) -> StoreResult<Vec<K8sNamespace>> {
        list_namespaces(self.pool()).await
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        delete_namespace(self.pool(), id).await
    }
}
