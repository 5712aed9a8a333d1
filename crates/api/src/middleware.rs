//! Request pipeline for protected routes.
//!
//! Stages run in a fixed order, each either forwarding an enriched request or
//! ending it with an error response:
//!
//! 1. [`require_auth`] resolves the bearer token to a live [`User`] and
//!    attaches it to the request extensions.
//! 2. [`require_roles`] checks the attached user against an [`AllowedRoles`] set.
//! 3. The handler reads the user through the [`AuthUser`] extractor.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::AppState;
use auth::{AuthError, Role, User};

/// Roles permitted past a [`require_roles`] stage
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [Role]);

pub const ADMIN_ONLY: AllowedRoles = AllowedRoles(&[Role::Admin]);

/// Token from `Authorization: Bearer <token>`. The scheme name is case-insensitive.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Extract the bearer token and resolve it to the current user record
pub async fn extract_user_from_token(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| {
        warn!("[AUTH] Missing or invalid Authorization header");
        ApiError(AuthError::InvalidToken)
    })?;

    let user = state.auth_service.authenticate(token).await?;
    debug!("[AUTH] Authenticated user: {} (id: {})", user.name, user.id);
    Ok(user)
}

/// Middleware to require authentication
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = extract_user_from_token(&state, request.headers()).await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Middleware to require one of a set of roles. Must sit behind [`require_auth`].
pub async fn require_roles(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(user) = request.extensions().get::<User>() else {
        warn!("[AUTH] Role check without an authenticated user");
        return Err(ApiError(AuthError::InvalidToken));
    };

    auth::authorize(user, allowed.0)?;

    Ok(next.run(request).await)
}

/// Extractor for authenticated user
/// Use this in handlers that are protected by auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError(AuthError::InvalidToken))
    }
}
