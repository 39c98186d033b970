///! User records consulted by the admin-facing grant queries

use super::namespaces::backend;
use super::Database;
use crate::registry::error::StoreResult;
use crate::registry::UserDirectory;
use async_trait::async_trait;
use nsregistry_common::auth::{Principal, UserRole};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

pub async fn create_user(pool: &SqlitePool, user: &Principal) -> StoreResult<()> {
    sqlx::query("INSERT INTO users (id, username, role) VALUES (?, ?, ?)")
        .bind(user.user_id)
        .bind(&user.username)
        .bind(user.role.as_str())
        .execute(pool)
        .await
        .map_err(backend("Failed to create user"))?;

    Ok(())
}

pub async fn get_user(pool: &SqlitePool, user_id: i64) -> StoreResult<Option<Principal>> {
    let row = sqlx::query("SELECT id, username, role FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(backend("Failed to query user"))?;

    Ok(row.map(|row| {
        let role: String = row.get("role");
        Principal {
            user_id: row.get("id"),
            username: row.get("username"),
            role: UserRole::parse(&role),
        }
    }))
}

pub async fn count_users(pool: &SqlitePool) -> StoreResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(backend("Failed to count users"))?;

    Ok(count)
}

#[async_trait]
impl UserDirectory for Database {
    async fn find_user(&self, user_id: i64) -> StoreResult<Option<Principal>> {
        get_user(self.pool(), user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();

        create_user(db.pool(), &Principal::new(1, "admin", UserRole::Admin))
            .await
            .unwrap();
        create_user(db.pool(), &Principal::new(7, "alice", UserRole::General))
            .await
            .unwrap();

        let admin = db.find_user(1).await.unwrap().unwrap();
        assert!(admin.is_admin());
        assert_eq!(db.find_user(7).await.unwrap().unwrap().username, "alice");
        assert!(db.find_user(99).await.unwrap().is_none());
        assert_eq!(count_users(db.pool()).await.unwrap(), 2);
    }
}
