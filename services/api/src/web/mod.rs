pub mod auth;
pub mod documents;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;
pub mod summarize;
pub mod token;

// Re-export what the binary needs to build and serve the application.
pub use middleware::{require_auth, CurrentUser};
pub use router::build_router;
pub use state::AppState;
