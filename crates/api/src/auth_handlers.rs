use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;
use auth::{CreateUser, UserProfile};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: UserProfile,
}

/// POST /login - Exchange credentials for a token
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = body?;
    let (token, _user) = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    Ok(Json(LoginResponse { token }))
}

/// GET /me - Profile of the authenticated user
pub async fn me(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(user.profile())
}

/// POST /create - Create a user (admin only)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AuthUser(admin): AuthUser,
    body: Result<Json<CreateUser>, JsonRejection>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    let Json(payload) = body?;
    let user = state.auth_service.create_user(payload).await?;
    info!("[CREATE] {} created user {}", admin.name, user.name);

    Ok(Json(CreateUserResponse {
        user: user.profile(),
    }))
}
