use auth::{Role, StoreError, User};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Raw `users` row. Ids and roles are stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub role: String,
    pub account_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| StoreError::Backend(format!("Invalid user id {:?}: {}", row.id, e)))?;
        let role = row.role.parse::<Role>().map_err(StoreError::Backend)?;

        Ok(User {
            id,
            name: row.name,
            password_hash: row.password_hash,
            full_name: row.full_name,
            role,
            account_active: row.account_active,
            created_at: row.created_at,
        })
    }
}
