use auth::AuthError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP face of [`AuthError`]
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

/// Unreadable or incomplete request bodies are client errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AuthError::InvalidInput(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::DuplicateUser(_) | AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::HashingError(_)
            | AuthError::TokenGenerationError(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal details stay in the logs
        let message = if self.0.is_internal() {
            error!("[API] {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (AuthError::DuplicateUser("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AuthError::HashingError("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let response = ApiError(AuthError::Internal("disk on fire".into())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(text.contains("Internal server error"));
        assert!(!text.contains("disk on fire"));
    }
}
