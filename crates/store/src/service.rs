use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use auth::{NewUser, Role, StoreError, User, UserStore};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::UserRow;

const USER_COLUMNS: &str = "id, name, password_hash, full_name, role, account_active, created_at";

fn backend(err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// SQLite-backed user store
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Open (and create if missing) the database at `url`
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(backend)?
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options).await.map_err(backend)?;
        info!("Connected to {}", url);

        Ok(Self { pool })
    }

    /// A private in-memory database on a single long-lived connection.
    ///
    /// Each SQLite `:memory:` connection is its own database, hence the pool of one.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(backend)?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(backend)?;

        Ok(Self { pool })
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(backend)?;
        debug!("Migrations applied");
        Ok(())
    }

    /// Enable or disable an account. Returns `false` if no such user.
    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET account_active = ? WHERE id = ?")
            .bind(active)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    /// Change a user's role. Returns `false` if no such user.
    pub async fn set_role(&self, id: Uuid, role: Role) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a user. Returns `false` if no such user.
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_one(&self, column: &str, value: String) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {} FROM users WHERE {} = ? LIMIT 1", USER_COLUMNS, column);

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        self.find_one("name", name.to_string()).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.find_one("id", id.to_string()).await
    }

    async fn create(&self, new_user: NewUser) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "INSERT INTO users ({0}) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {0}",
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&new_user.name)
            .bind(&new_user.password_hash)
            .bind(&new_user.full_name)
            .bind(new_user.role.as_str())
            .bind(new_user.account_active)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return StoreError::UniqueViolation(new_user.name.clone());
                    }
                }
                backend(e)
            })?;

        row.map(User::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteUserStore {
        let store = SqliteUserStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            password_hash: "$argon2id$v=19$fake".to_string(),
            full_name: Some("Test User".to_string()),
            role: Role::User,
            account_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = store().await;

        let created = store.create(new_user("alice")).await.unwrap().unwrap();
        assert_eq!(created.name, "alice");
        assert_eq!(created.full_name.as_deref(), Some("Test User"));
        assert_eq!(created.role, Role::User);
        assert!(created.account_active);

        let by_name = store.find_by_name("alice").await.unwrap().unwrap();
        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
        assert_eq!(by_id.name, "alice");
        assert_eq!(by_id.password_hash, created.password_hash);
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = store().await;

        assert!(store.find_by_name("nobody").await.unwrap().is_none());
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_name_constraint() {
        let store = store().await;

        store.create(new_user("bob")).await.unwrap();
        let err = store.create(new_user("bob")).await.unwrap_err();

        assert!(matches!(err, StoreError::UniqueViolation(ref name) if name == "bob"));
    }

    #[tokio::test]
    async fn test_admin_mutations() {
        let store = store().await;
        let user = store.create(new_user("carol")).await.unwrap().unwrap();

        assert!(store.set_role(user.id, Role::Admin).await.unwrap());
        assert!(store.set_active(user.id, false).await.unwrap());

        let reloaded = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.role, Role::Admin);
        assert!(!reloaded.account_active);

        assert!(store.delete(user.id).await.unwrap());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(!store.delete(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = store().await;
        store.migrate().await.unwrap();
    }
}
