/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse (HTTP status / JSON error body / WWW-Authenticate)
 * - Convert AuthError / RepoError into a single HTTP-facing shape
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::AuthError;

#[derive(Debug, Error)]
pub enum AppError {
    /// 401 with a `Bearer` challenge. `message` is safe to show to the client.
    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn unauthorized(code: &'static str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code,
            message: message.into(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::unauthorized("NOT_AUTHENTICATED", "Not authenticated")
    }
}

#[derive(Serialize)]
struct ErrorResponseBody {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthorized { code, .. } => (StatusCode::UNAUTHORIZED, *code),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let body = ErrorResponseBody {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::ExpiredToken { .. } => AppError::unauthorized("TOKEN_EXPIRED", e.to_string()),
            AuthError::InvalidToken(_) => AppError::unauthorized("INVALID_TOKEN", e.to_string()),
            AuthError::Unauthorized => AppError::unauthorized("UNAUTHORIZED", e.to_string()),
            AuthError::Internal(ref detail) => {
                tracing::error!(error = %detail, "authentication failed unexpectedly");
                AppError::Internal
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        tracing::error!(error = %e, "database error");
        AppError::Internal
    }
}
