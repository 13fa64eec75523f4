//! crates/summarizer_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;

use crate::domain::{
    Document, ExternalIdentity, FileUpload, NewDocument, RelayResponse, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflicting item already exists: {0}")]
    Conflict(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Fails with `PortError::Conflict` when the email is already taken.
    async fn create_user_with_email(&self, email: &str, hashed_password: &str)
        -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User>;

    // --- Document Management ---
    async fn create_document(&self, document: NewDocument) -> PortResult<Document>;

    /// Returns the user's documents, newest first.
    async fn get_documents_by_user(&self, user_id: i64) -> PortResult<Vec<Document>>;
}

#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Forwards an uploaded file. `word_count` is passed through as-is and may be empty.
    async fn summarize_file(&self, file: FileUpload, word_count: &str)
        -> PortResult<RelayResponse>;

    /// Forwards pasted text. `word_count` is passed through as-is and may be empty.
    async fn summarize_text(&self, text: &str, word_count: &str) -> PortResult<RelayResponse>;
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifies a third-party ID token and returns its claims.
    ///
    /// A rejected token is `PortError::Unauthorized`; an unreachable provider is
    /// `PortError::Unavailable`. The audience is returned, not checked.
    async fn verify_id_token(&self, token: &str) -> PortResult<ExternalIdentity>;
}
