//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `DatabaseService` port for the test suites.
//! It enforces the same contract as the Postgres adapter (unique emails,
//! newest-first listings). The `api` binary always uses Postgres.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use summarizer_core::domain::{Document, NewDocument, User, UserCredentials};
use summarizer_core::ports::{DatabaseService, PortError, PortResult};
use tokio::sync::Mutex;
use tracing::debug;

struct StoreData {
    users: HashMap<i64, UserCredentials>,
    documents: Vec<Document>,
    next_user_id: i64,
    next_document_id: i64,
    fail_document_writes: bool,
}

/// In-memory storage backing the router-level tests.
pub struct MemoryDatabase {
    data: Mutex<StoreData>,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(StoreData {
                users: HashMap::new(),
                documents: Vec::new(),
                next_user_id: 1,
                next_document_id: 1,
                fail_document_writes: false,
            }),
        }
    }

    // --- Test support: inspection and fault injection ---

    /// Makes every subsequent `create_document` call fail, simulating a broken store.
    pub async fn fail_document_writes(&self, fail: bool) {
        self.data.lock().await.fail_document_writes = fail;
    }

    pub async fn user_count(&self) -> usize {
        self.data.lock().await.users.len()
    }

    /// Every stored document regardless of owner, in insertion order.
    pub async fn all_documents(&self) -> Vec<Document> {
        self.data.lock().await.documents.clone()
    }
}

#[async_trait]
impl DatabaseService for MemoryDatabase {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut data = self.data.lock().await;
        if data.users.values().any(|u| u.email == email) {
            return Err(PortError::Conflict(format!("User with email {}", email)));
        }

        let id = data.next_user_id;
        data.next_user_id += 1;
        let credentials = UserCredentials {
            id,
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        data.users.insert(id, credentials.clone());
        debug!("Stored user {} in memory", id);

        Ok(credentials.into_user())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let data = self.data.lock().await;
        data.users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))
    }

    async fn get_user_by_id(&self, user_id: i64) -> PortResult<User> {
        let data = self.data.lock().await;
        data.users
            .get(&user_id)
            .cloned()
            .map(UserCredentials::into_user)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn create_document(&self, document: NewDocument) -> PortResult<Document> {
        let mut data = self.data.lock().await;
        if data.fail_document_writes {
            return Err(PortError::Unexpected("document store is unavailable".to_string()));
        }
        if !data.users.contains_key(&document.user_id) {
            return Err(PortError::Unexpected(format!(
                "foreign key violation: user {} does not exist",
                document.user_id
            )));
        }

        let now = Utc::now();
        let stored = Document {
            id: data.next_document_id,
            user_id: document.user_id,
            filename: document.filename,
            summary: document.summary,
            created_at: now,
            updated_at: now,
        };
        data.next_document_id += 1;
        data.documents.push(stored.clone());

        Ok(stored)
    }

    async fn get_documents_by_user(&self, user_id: i64) -> PortResult<Vec<Document>> {
        let data = self.data.lock().await;
        let mut documents: Vec<Document> = data
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(documents)
    }
}
