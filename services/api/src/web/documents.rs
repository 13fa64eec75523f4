//! services/api/src/web/documents.rs
//!
//! Listing of the caller's stored summaries.

use axum::{
    extract::State,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use summarizer_core::domain::Document;
use tracing::error;
use utoipa::ToSchema;

use crate::error::HandlerError;
use crate::web::middleware::CurrentUser;
use crate::web::rest::ErrorBody;
use crate::web::state::AppState;

/// A stored summary as sent to clients.
///
/// Field names match what the web frontend already reads (`ID`, `Filename`, ...).
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "UserID")]
    pub user_id: i64,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
            filename: doc.filename,
            summary: doc.summary,
            user_id: doc.user_id,
        }
    }
}

/// List the caller's summaries, newest first.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "The caller's documents", body = Vec<DocumentResponse>),
        (status = 401, description = "Missing or invalid session token", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<DocumentResponse>>, HandlerError> {
    let documents = state
        .db
        .get_documents_by_user(user.id)
        .await
        .map_err(|e| {
            error!("Failed to list documents for user {}: {:?}", user.id, e);
            HandlerError::Internal(e.to_string())
        })?;

    Ok(Json(documents.into_iter().map(DocumentResponse::from).collect()))
}
