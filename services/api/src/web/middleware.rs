//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use summarizer_core::{domain::User, ports::PortError};
use tracing::{debug, error};

use crate::error::HandlerError;
use crate::web::state::AppState;

/// The authenticated caller, inserted into the request extensions by `require_auth`.
///
/// Handlers on protected routes take it as `Extension<CurrentUser>`; it is never
/// constructed anywhere else.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Pulls the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that validates the bearer session token and resolves the caller.
///
/// If valid, inserts a `CurrentUser` into request extensions for handlers to use.
/// If the token is missing, invalid, expired, or names a user that no longer
/// exists, returns 401 before the handler runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HandlerError> {
    // 1. Extract the bearer token
    let token = bearer_token(req.headers()).ok_or(HandlerError::Unauthenticated)?;

    // 2. Verify signature and expiry
    let claims = state.session_keys.verify(token).map_err(|e| {
        debug!("Rejected session token: {}", e);
        HandlerError::Unauthenticated
    })?;

    // 3. Resolve the subject to a user
    let user = state
        .db
        .get_user_by_id(claims.sub)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => {
                debug!("Session token names unknown user {}", claims.sub);
                HandlerError::Unauthenticated
            }
            other => {
                error!("Failed to resolve session subject: {:?}", other);
                HandlerError::Internal(other.to_string())
            }
        })?;

    // 4. Insert the identity into request extensions
    req.extensions_mut().insert(CurrentUser(user));

    // 5. Continue to the handler
    Ok(next.run(req).await)
}
