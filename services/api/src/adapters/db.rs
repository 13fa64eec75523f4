//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use summarizer_core::domain::{Document, NewDocument, User, UserCredentials};
use summarizer_core::ports::{DatabaseService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Maps a driver error, turning a unique-constraint violation into `Conflict`.
fn map_insert_error(e: sqlx::Error, what: &str) -> PortError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            PortError::Conflict(what.to_string())
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    password_hash: String,
}
impl UserRecord {
    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            email: self.email,
            hashed_password: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct DocumentRecord {
    id: i64,
    user_id: i64,
    filename: String,
    summary: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl DocumentRecord {
    fn to_domain(self) -> Document {
        Document {
            id: self.id,
            user_id: self.user_id,
            filename: self.filename,
            summary: self.summary,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash",
        )
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &format!("User with email {}", email)))?;

        Ok(record.to_credentials().into_user())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound("User not found".to_string()))?;

        Ok(record.to_credentials())
    }

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        Ok(record.to_credentials().into_user())
    }

    async fn create_document(&self, document: NewDocument) -> PortResult<Document> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "INSERT INTO documents (user_id, filename, summary) VALUES ($1, $2, $3) \
             RETURNING id, user_id, filename, summary, created_at, updated_at",
        )
        .bind(document.user_id)
        .bind(&document.filename)
        .bind(&document.summary)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.to_domain())
    }

    async fn get_documents_by_user(&self, user_id: i64) -> PortResult<Vec<Document>> {
        let records = sqlx::query_as::<_, DocumentRecord>(
            "SELECT id, user_id, filename, summary, created_at, updated_at \
             FROM documents WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let documents = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(documents)
    }
}
