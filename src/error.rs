/*
 * Responsibility
 * - HTTP-facing error type (AppError)
 * - IntoResponse: status + {"error":{"code","message"}}
 * - Conversions from auth / resolver errors; internal detail is logged, not returned
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::auth::error::AuthenticationFailed;
use crate::services::authz::context::AccessDenied;
use crate::services::resolver::error::ResolveError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message.to_string())
            }
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, "FORBIDDEN", message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthenticationFailed> for AppError {
    fn from(e: AuthenticationFailed) -> Self {
        AppError::Unauthorized(e.public_message())
    }
}

impl From<AccessDenied> for AppError {
    fn from(e: AccessDenied) -> Self {
        AppError::Forbidden(e.0)
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::AccessDenied(denied) => denied.into(),
            other => {
                tracing::error!(error = ?other, "field resolution failed");
                AppError::Internal
            }
        }
    }
}
