//! services/api/src/web/summarize.rs
//!
//! Handlers that relay documents and pasted text to the summarization service.
//!
//! Public routes hand the collaborator's reply straight back. Protected routes
//! additionally store the summary against the caller. The caller's identity is
//! passed down explicitly as `Option<&User>`: `None` means nothing is stored.

use axum::{
    body::Body,
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use summarizer_core::{
    domain::{FileUpload, NewDocument, RelayResponse, User, PASTED_TEXT_FILENAME},
    ports::{DatabaseService, PortError},
};
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::error::HandlerError;
use crate::web::middleware::CurrentUser;
use crate::web::rest::ErrorBody;
use crate::web::state::AppState;

/// Filename used when a multipart file part does not name itself.
const DEFAULT_UPLOAD_NAME: &str = "upload";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SummarizeTextRequest {
    pub text: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WordCountQuery {
    /// Desired summary length, forwarded to the summarizer untouched.
    #[serde(rename = "wordCount")]
    pub word_count: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileSummaryResponse {
    pub filename: String,
    pub summary: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TextSummaryResponse {
    pub summary: String,
}

/// The fields this gateway cares about in a summarizer reply.
///
/// Parsing is tolerant: a body that is not JSON, is not an object,
/// or lacks either field yields empty strings instead of an error. Non-string
/// values are treated as absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SummaryFields {
    pub filename: String,
    pub summary: String,
}

impl SummaryFields {
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            filename: field("filename"),
            summary: field("summary"),
        }
    }
}

/// Which collaborator endpoint produced a reply; decides the stored filename
/// and the response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayKind {
    File,
    Text,
}

//=========================================================================================
// Pipeline Steps
//=========================================================================================

fn relay_failure(e: PortError) -> HandlerError {
    match e {
        PortError::Unavailable(cause) => HandlerError::CollaboratorUnavailable(cause),
        other => HandlerError::Internal(other.to_string()),
    }
}

/// Turns a non-2xx reply into `CollaboratorError`. Such bodies are never parsed.
fn require_success(relay: RelayResponse) -> Result<RelayResponse, HandlerError> {
    if relay.is_success() {
        return Ok(relay);
    }
    Err(HandlerError::CollaboratorError {
        status: relay.status,
        body: String::from_utf8_lossy(&relay.body).into_owned(),
    })
}

/// Echoes the collaborator's reply as-is: status, content type, and body.
fn verbatim(relay: RelayResponse) -> Response {
    let status = StatusCode::from_u16(relay.status).unwrap_or(StatusCode::OK);
    let mut response = Response::new(Body::from(relay.body));
    *response.status_mut() = status;
    if let Some(content_type) = relay
        .content_type
        .and_then(|ct| header::HeaderValue::from_str(&ct).ok())
    {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}

/// Stores a summary for its owner. A failed write is never reported as success.
pub async fn persist_summary(
    db: &dyn DatabaseService,
    owner: &User,
    filename: String,
    summary: String,
) -> Result<(), HandlerError> {
    let document = db
        .create_document(NewDocument {
            user_id: owner.id,
            filename,
            summary,
        })
        .await
        .map_err(|e| {
            error!("Failed to save summary for user {}: {:?}", owner.id, e);
            HandlerError::PersistenceFailure(e.to_string())
        })?;
    info!("Saved document {} for user {}", document.id, owner.id);
    Ok(())
}

/// The shared tail of every summarize route.
async fn complete(
    db: &dyn DatabaseService,
    owner: Option<&User>,
    kind: RelayKind,
    relay: RelayResponse,
) -> Result<Response, HandlerError> {
    let relay = require_success(relay)?;

    let Some(owner) = owner else {
        return Ok(verbatim(relay));
    };

    let fields = SummaryFields::from_body(&relay.body);
    match kind {
        RelayKind::File => {
            persist_summary(db, owner, fields.filename.clone(), fields.summary.clone()).await?;
            Ok(Json(FileSummaryResponse {
                filename: fields.filename,
                summary: fields.summary,
            })
            .into_response())
        }
        RelayKind::Text => {
            persist_summary(
                db,
                owner,
                PASTED_TEXT_FILENAME.to_string(),
                fields.summary.clone(),
            )
            .await?;
            Ok(Json(TextSummaryResponse {
                summary: fields.summary,
            })
            .into_response())
        }
    }
}

//=========================================================================================
// Input Reading
//=========================================================================================

struct FileInput {
    file: FileUpload,
    word_count: String,
}

/// Reads the `file` and optional `wordCount` parts, in whatever order they arrive.
async fn read_file_input(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<FileInput, HandlerError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Rejected multipart request: {}", e.body_text());
        HandlerError::InvalidInput("Expected a multipart/form-data body".to_string())
    })?;

    let mut file = None;
    let mut word_count = String::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        HandlerError::InvalidInput(format!("Failed to read multipart data: {}", e))
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_UPLOAD_NAME)
                    .to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    HandlerError::InvalidInput(format!("Failed to read file bytes: {}", e))
                })?;
                file = Some(FileUpload {
                    filename,
                    content_type,
                    data,
                });
            }
            Some("wordCount") => {
                word_count = field.text().await.map_err(|e| {
                    HandlerError::InvalidInput(format!("Failed to read wordCount: {}", e))
                })?;
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| HandlerError::InvalidInput("File is required".to_string()))?;
    Ok(FileInput { file, word_count })
}

fn read_word_count(
    query: Result<Query<WordCountQuery>, QueryRejection>,
) -> Result<Option<String>, HandlerError> {
    query.map(|Query(q)| q.word_count).map_err(|e| {
        warn!("Rejected query string: {}", e.body_text());
        HandlerError::InvalidInput("Invalid query parameters".to_string())
    })
}

fn read_text_input(
    payload: Result<Json<SummarizeTextRequest>, JsonRejection>,
) -> Result<String, HandlerError> {
    payload.map(|Json(req)| req.text).map_err(|e| {
        warn!("Rejected text summary body: {}", e.body_text());
        HandlerError::InvalidInput("Failed to read body".to_string())
    })
}

async fn summarize_file(
    state: &AppState,
    owner: Option<&User>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HandlerError> {
    let FileInput { file, word_count } = read_file_input(multipart).await?;
    let relay = state
        .summarizer
        .summarize_file(file, &word_count)
        .await
        .map_err(relay_failure)?;
    complete(state.db.as_ref(), owner, RelayKind::File, relay).await
}

async fn summarize_text(
    state: &AppState,
    owner: Option<&User>,
    text: String,
    word_count: Option<String>,
) -> Result<Response, HandlerError> {
    let relay = state
        .summarizer
        .summarize_text(&text, word_count.as_deref().unwrap_or_default())
        .await
        .map_err(relay_failure)?;
    complete(state.db.as_ref(), owner, RelayKind::Text, relay).await
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Summarize an uploaded file without storing the result.
#[utoipa::path(
    post,
    path = "/public/summarize",
    request_body(content_type = "multipart/form-data", description = "Part `file` and optional part `wordCount`."),
    responses(
        (status = 200, description = "The summarizer's reply, unchanged"),
        (status = 400, description = "Missing file or malformed body", body = ErrorBody),
        (status = 503, description = "Summarizer unreachable", body = ErrorBody)
    )
)]
pub async fn public_summarize_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HandlerError> {
    summarize_file(&state, None, multipart).await
}

/// Summarize pasted text without storing the result.
#[utoipa::path(
    post,
    path = "/public/summarize-text",
    params(WordCountQuery),
    request_body = SummarizeTextRequest,
    responses(
        (status = 200, description = "The summarizer's reply, unchanged"),
        (status = 400, description = "Malformed body or query string", body = ErrorBody),
        (status = 503, description = "Summarizer unreachable", body = ErrorBody)
    )
)]
pub async fn public_summarize_text_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WordCountQuery>, QueryRejection>,
    payload: Result<Json<SummarizeTextRequest>, JsonRejection>,
) -> Result<Response, HandlerError> {
    let word_count = read_word_count(query)?;
    let text = read_text_input(payload)?;
    summarize_text(&state, None, text, word_count).await
}

/// Summarize an uploaded file and save the summary for the caller.
#[utoipa::path(
    post,
    path = "/summarize",
    request_body(content_type = "multipart/form-data", description = "Part `file` and optional part `wordCount`."),
    responses(
        (status = 200, description = "Summary saved", body = FileSummaryResponse),
        (status = 400, description = "Missing file or malformed body", body = ErrorBody),
        (status = 401, description = "Missing or invalid session token", body = ErrorBody),
        (status = 503, description = "Summarizer unreachable", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HandlerError> {
    summarize_file(&state, Some(&user), multipart).await
}

/// Summarize pasted text and save the summary for the caller as "Pasted Text".
#[utoipa::path(
    post,
    path = "/summarize-text",
    params(WordCountQuery),
    request_body = SummarizeTextRequest,
    responses(
        (status = 200, description = "Summary saved", body = TextSummaryResponse),
        (status = 400, description = "Malformed body or query string", body = ErrorBody),
        (status = 401, description = "Missing or invalid session token", body = ErrorBody),
        (status = 503, description = "Summarizer unreachable", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn summarize_text_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    query: Result<Query<WordCountQuery>, QueryRejection>,
    payload: Result<Json<SummarizeTextRequest>, JsonRejection>,
) -> Result<Response, HandlerError> {
    let word_count = read_word_count(query)?;
    let text = read_text_input(payload)?;
    summarize_text(&state, Some(&user), text, word_count).await
}
