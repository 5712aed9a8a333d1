use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::{
    error::{AuthError, Result},
    jwt::{generate_token, validate_token},
    model::{CreateUser, NewUser, Role, User},
    password::{hash_password, verify_password},
    store::{StoreError, UserStore},
};

/// Authentication service: credential checks, token issue/validation and
/// user creation on top of a [`UserStore`].
///
/// Holds no per-request state. Build it once at startup and share it.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    jwt_secret: String,
    token_expiry_seconds: i64,
}

impl AuthService {
    /// Create a new AuthService
    ///
    /// # Arguments
    /// * `store` - User persistence
    /// * `jwt_secret` - Secret key for token signing
    /// * `token_expiry_seconds` - Token lifetime in seconds (one day by default in config)
    pub fn new(
        store: Arc<dyn UserStore>,
        jwt_secret: impl Into<String>,
        token_expiry_seconds: i64,
    ) -> Self {
        Self {
            store,
            jwt_secret: jwt_secret.into(),
            token_expiry_seconds,
        }
    }

    /// Check a name/password pair against the store.
    ///
    /// Unknown name, wrong password and inactive account are all reported as
    /// the same [`AuthError::InvalidCredentials`].
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, name: &str, password: &str) -> Result<User> {
        let Some(user) = self.store.find_by_name(name).await? else {
            warn!("[LOGIN] Unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &user.password_hash)? {
            warn!("[LOGIN] Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.account_active {
            warn!("[LOGIN] Account inactive");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Issue a signed token for a user
    pub fn issue_token(&self, user: &User) -> Result<String> {
        generate_token(user, &self.jwt_secret, self.token_expiry_seconds)
    }

    /// Login a user and return a token
    pub async fn login(&self, name: &str, password: &str) -> Result<(String, User)> {
        let user = self.verify_credentials(name, password).await?;
        let token = self.issue_token(&user)?;

        info!("[LOGIN] {} logged in (id: {})", user.name, user.id);
        Ok((token, user))
    }

    /// Resolve a bearer token to the current user record.
    ///
    /// The token only identifies the user; role and active status come from
    /// the store, so changes apply before the token expires.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = validate_token(token, &self.jwt_secret)?;
        let user_id = claims.user_id()?;

        let Some(user) = self.store.find_by_id(user_id).await? else {
            warn!("[AUTH] Token subject {} no longer exists", user_id);
            return Err(AuthError::InvalidToken);
        };

        if !user.account_active {
            warn!("[AUTH] Token subject {} is inactive", user_id);
            return Err(AuthError::InvalidToken);
        }

        Ok(user)
    }

    /// Create a user. Callers are expected to have authorized the request.
    #[instrument(skip(self, req), fields(name = %req.name))]
    pub async fn create_user(&self, req: CreateUser) -> Result<User> {
        if req.name.trim().is_empty() {
            return Err(AuthError::InvalidInput("name must not be empty".to_string()));
        }
        if req.password.is_empty() {
            return Err(AuthError::InvalidInput("password must not be empty".to_string()));
        }

        if self.store.find_by_name(&req.name).await?.is_some() {
            warn!("[CREATE] Name already taken");
            return Err(AuthError::DuplicateUser(req.name));
        }

        let password_hash = hash_password(&req.password)?;

        let new_user = NewUser {
            name: req.name,
            password_hash,
            full_name: req.full_name,
            role: req.role.unwrap_or_default(),
            account_active: req.account_active.unwrap_or(true),
        };

        match self.store.create(new_user).await {
            Ok(Some(user)) => {
                info!("[CREATE] Created {} (id: {}, role: {})", user.name, user.id, user.role);
                Ok(user)
            }
            Ok(None) => Err(AuthError::Internal("Error creating user".to_string())),
            Err(StoreError::UniqueViolation(name)) => {
                // Lost a race against a concurrent create with the same name
                warn!("[CREATE] Unique constraint rejected {}", name);
                Err(AuthError::DuplicateUser(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create a user with an explicit role, bypassing request-level defaults
    pub async fn create_user_with_role(&self, name: &str, password: &str, role: Role) -> Result<User> {
        self.create_user(CreateUser::new(name, password).with_role(role))
            .await
    }
}
