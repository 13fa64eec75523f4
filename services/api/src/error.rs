//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for process-level
//! failures (startup, serving) and `HandlerError` for failures surfaced to clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a failure while applying schema migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a failure building an outbound HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Every outcome a request handler can fail with.
///
/// Rendered as a JSON body with a short `error` field. Credential failures never
/// reveal whether the account exists.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Failed to create user")]
    DuplicateIdentity,

    #[error("Invalid Google token")]
    InvalidExternalToken,

    #[error("Token is not for this app")]
    AudienceMismatch,

    #[error("Upstream service is unavailable")]
    CollaboratorUnavailable(String),

    /// The collaborator answered, but not with a success status.
    #[error("AI service returned an error")]
    CollaboratorError { status: u16, body: String },

    #[error("Failed to save summary")]
    PersistenceFailure(String),

    #[error("Internal server error")]
    Internal(String),
}

impl HandlerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::InvalidInput(_)
            | HandlerError::InvalidCredentials
            | HandlerError::DuplicateIdentity
            | HandlerError::InvalidExternalToken
            | HandlerError::AudienceMismatch => StatusCode::BAD_REQUEST,
            HandlerError::Unauthenticated => StatusCode::UNAUTHORIZED,
            HandlerError::CollaboratorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::CollaboratorError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            HandlerError::PersistenceFailure(_) | HandlerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            HandlerError::CollaboratorError { body, .. } => json!({
                "error": self.to_string(),
                "details": body,
            }),
            HandlerError::CollaboratorUnavailable(cause) => {
                error!("Upstream collaborator unreachable: {}", cause);
                json!({ "error": self.to_string() })
            }
            HandlerError::PersistenceFailure(cause) | HandlerError::Internal(cause) => {
                error!("Request failed internally: {}", cause);
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
