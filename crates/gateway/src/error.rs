//! Error types for the gateway layer

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reservo_auth::AuthError;
use reservo_booking::BookingError;
use reservo_database::DatabaseError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Reason phrase of the HTTP status, e.g. `Conflict`.
    pub error: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            GatewayError::Internal(detail) => {
                error!(error = %detail, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<AuthError> for GatewayError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(message) => GatewayError::BadRequest(message),
            AuthError::UserExists => GatewayError::Conflict(error.to_string()),
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidToken(_) => GatewayError::Unauthorized(error.to_string()),
            AuthError::RoleNotAllowed(_) => GatewayError::Forbidden(error.to_string()),
            AuthError::Database(DatabaseError::NotFound(what)) => {
                GatewayError::NotFound(format!("{what} not found"))
            }
            AuthError::TokenCreation(_)
            | AuthError::TokenStore(_)
            | AuthError::PasswordHash(_)
            | AuthError::Database(_) => GatewayError::Internal(error.to_string()),
        }
    }
}

impl From<BookingError> for GatewayError {
    fn from(error: BookingError) -> Self {
        match error {
            BookingError::Validation(message) => GatewayError::BadRequest(message),
            BookingError::NotFound(_) => GatewayError::NotFound(error.to_string()),
            BookingError::Forbidden(_) => GatewayError::Forbidden(error.to_string()),
            BookingError::Conflict(message) => GatewayError::Conflict(message),
            BookingError::InvalidTransition { .. } => GatewayError::Conflict(error.to_string()),
            BookingError::Database(_) => GatewayError::Internal(error.to_string()),
        }
    }
}

impl From<DatabaseError> for GatewayError {
    fn from(error: DatabaseError) -> Self {
        BookingError::from(error).into()
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}
