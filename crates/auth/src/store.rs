use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{NewUser, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("User with name \"{0}\" already exists")]
    UniqueViolation(String),

    #[error("Store error: {0}")]
    Backend(String),
}

/// Persistence seam for user records.
///
/// Implementations must enforce uniqueness of `name`; that constraint is the
/// final word on duplicate creation, not the lookup done beforehand.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Returns `Ok(None)` if the backend accepted the write but gave no record back.
    async fn create(&self, new_user: NewUser) -> Result<Option<User>, StoreError>;
}
