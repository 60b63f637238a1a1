//! Authentication errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingAuthorization,
    #[error("Invalid authorization header format")]
    InvalidAuthorizationFormat,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Token carries no username")]
    MissingSubject,
    #[error("Unsupported token algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

impl AuthError {
    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "MISSING_AUTHORIZATION",
            AuthError::InvalidAuthorizationFormat => "INVALID_AUTHORIZATION",
            AuthError::InvalidToken | AuthError::MissingSubject => "INVALID_TOKEN",
            AuthError::UnsupportedAlgorithm(_) => "AUTH_CONFIGURATION_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::UnsupportedAlgorithm(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
