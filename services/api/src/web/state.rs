//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::token::SessionKeys;
use std::sync::Arc;
use summarizer_core::ports::{DatabaseService, IdentityVerifier, SummarizationService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub session_keys: Arc<SessionKeys>,
    pub summarizer: Arc<dyn SummarizationService>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    /// Builds the state, deriving the session keys from the configured secret.
    pub fn new(
        config: Arc<Config>,
        db: Arc<dyn DatabaseService>,
        summarizer: Arc<dyn SummarizationService>,
        identity_verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        let session_keys = Arc::new(SessionKeys::from_secret(
            config.session_secret.as_bytes(),
        ));
        Self {
            db,
            config,
            session_keys,
            summarizer,
            identity_verifier,
        }
    }
}
