//! crates/summarizer_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use bytes::Bytes;
use chrono::{DateTime, Utc};

/// Filename recorded for summaries produced from pasted text rather than an upload.
pub const PASTED_TEXT_FILENAME: &str = "Pasted Text";

/// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
}

impl UserCredentials {
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }
}

/// A stored summary, owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields needed to insert a new `Document`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub user_id: i64,
    pub filename: String,
    pub summary: String,
}

/// A file received from a client, ready to be forwarded to the summarizer.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// The raw outcome of a call to the summarization service.
///
/// A non-2xx status is still a `RelayResponse`; only transport failures are errors.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RelayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Claims recovered from a verified third-party identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub email: String,
    pub audience: String,
}
