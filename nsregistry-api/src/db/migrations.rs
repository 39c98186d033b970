///! Database migrations

use nsregistry_common::Result;
use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Create migrations table
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            executed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| {
        nsregistry_common::Error::System(format!("Failed to create migrations table: {}", e))
    })?;

    // Run migrations in order
    run_migration(pool, "001_create_users_table", MIGRATION_001_CREATE_USERS).await?;
    run_migration(pool, "002_create_k8s_namespaces_table", MIGRATION_002_CREATE_K8S_NAMESPACES).await?;
    run_migration(pool, "003_create_namespace_grants_table", MIGRATION_003_CREATE_NAMESPACE_GRANTS).await?;
    run_migration(pool, "004_create_namespace_workload_refs_table", MIGRATION_004_CREATE_WORKLOAD_REFS).await?;

    Ok(())
}

async fn run_migration(pool: &SqlitePool, name: &str, sql: &str) -> Result<()> {
    use sqlx::Row;

    // Check if migration already ran
    let row = sqlx::query("SELECT COUNT(*) as count FROM migrations WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await
        .map_err(|e| nsregistry_common::Error::System(format!("Migration check failed: {}", e)))?;

    let count: i64 = row.get("count");
    if count > 0 {
        tracing::debug!("Migration {} already applied", name);
        return Ok(());
    }

    tracing::info!("Running migration: {}", name);

    sqlx::raw_sql(sql)
        .execute(pool)
        .await
        .map_err(|e| {
            nsregistry_common::Error::System(format!("Migration {} failed: {}", name, e))
        })?;

    // Record migration
    sqlx::query("INSERT INTO migrations (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await
        .map_err(|e| {
            nsregistry_common::Error::System(format!("Failed to record migration: {}", e))
        })?;

    tracing::info!("Migration {} completed", name);

    Ok(())
}

const MIGRATION_001_CREATE_USERS: &str = "
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL DEFAULT 'general',
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
";

const MIGRATION_002_CREATE_K8S_NAMESPACES: &str = "
CREATE TABLE k8s_namespaces (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    cluster_code INTEGER NOT NULL,
    owner_id INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE (name, cluster_code)
);

CREATE INDEX idx_k8s_namespaces_owner ON k8s_namespaces(owner_id);
CREATE INDEX idx_k8s_namespaces_created ON k8s_namespaces(created_at);
";

const MIGRATION_003_CREATE_NAMESPACE_GRANTS: &str = "
CREATE TABLE namespace_grants (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    namespace_id INTEGER NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (user_id, namespace_id)
);

CREATE INDEX idx_namespace_grants_namespace ON namespace_grants(namespace_id);
";

const MIGRATION_004_CREATE_WORKLOAD_REFS: &str = "
CREATE TABLE namespace_workload_refs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    namespace_id INTEGER NOT NULL,
    workload TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE (namespace_id, workload)
);
";
