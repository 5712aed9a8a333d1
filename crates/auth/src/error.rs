use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user, wrong password and inactive account all map here.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Forbidden")]
    Forbidden,

    #[error("User with name \"{0}\" already exists")]
    DuplicateUser(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Token generation failed: {0}")]
    TokenGenerationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(name) => AuthError::DuplicateUser(name),
            StoreError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}

impl AuthError {
    /// Errors that come from a failure on our side rather than from the caller.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AuthError::HashingError(_) | AuthError::TokenGenerationError(_) | AuthError::Internal(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
