//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for local signup and login, and login with a Google
//! ID token.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use summarizer_core::{
    domain::{User, UserCredentials},
    ports::PortError,
};
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::error::HandlerError;
use crate::web::extract::FormOrJson;
use crate::web::rest::ErrorBody;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CredentialsRequest {
    #[serde(default, alias = "Email")]
    pub email: String,
    #[serde(default, alias = "Password")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct FederatedLoginRequest {
    /// The ID token issued to the browser by Google.
    pub token: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

//=========================================================================================
// Password Hashing
//=========================================================================================

/// Hashes a password with Argon2 and a fresh random salt, off the async runtime.
async fn hash_password(password: Vec<u8>) -> Result<String, HandlerError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(&password, &salt)
            .map(|hash| hash.to_string())
    })
    .await
    .map_err(|e| HandlerError::Internal(format!("Hashing task failed: {}", e)))?
    .map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        HandlerError::Internal("Failed to hash password".to_string())
    })
}

/// Checks a password against a stored PHC hash string, off the async runtime.
async fn verify_password(password: Vec<u8>, stored_hash: String) -> Result<bool, HandlerError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash)?;
        Ok::<bool, argon2::password_hash::Error>(
            Argon2::default().verify_password(&password, &parsed).is_ok(),
        )
    })
    .await
    .map_err(|e| HandlerError::Internal(format!("Hashing task failed: {}", e)))?
    .map_err(|e| {
        error!("Failed to parse stored password hash: {:?}", e);
        HandlerError::Internal("Authentication error".to_string())
    })
}

/// A hash of random bytes for accounts that only ever sign in through Google.
async fn placeholder_password_hash() -> Result<String, HandlerError> {
    let mut secret = vec![0u8; 32];
    OsRng.fill_bytes(&mut secret);
    hash_password(secret).await
}

/// Hash checked when the email is unknown, so both login failures cost one
/// Argon2 verification. Generated on first use.
static UNKNOWN_USER_HASH: OnceLock<String> = OnceLock::new();

async fn unknown_user_hash() -> Result<String, HandlerError> {
    if let Some(hash) = UNKNOWN_USER_HASH.get() {
        return Ok(hash.clone());
    }
    let hash = placeholder_password_hash().await?;
    Ok(UNKNOWN_USER_HASH.get_or_init(|| hash).clone())
}

/// Verifies `password` against the stored account, or against
/// `UNKNOWN_USER_HASH` when there is none. Returns the user id on a match.
async fn check_credentials(
    account: Option<UserCredentials>,
    password: Vec<u8>,
) -> Result<Option<i64>, HandlerError> {
    let (user_id, stored_hash) = match account {
        Some(creds) => (Some(creds.id), creds.hashed_password),
        None => (None, unknown_user_hash().await?),
    };
    let matches = verify_password(password, stored_hash).await?;
    Ok(user_id.filter(|_| matches))
}

fn issue_token(state: &AppState, user_id: i64) -> Result<Json<TokenResponse>, HandlerError> {
    let token = state.session_keys.issue(user_id).map_err(|e| {
        error!("Failed to create session token: {:?}", e);
        HandlerError::Internal("Failed to create token".to_string())
    })?;
    Ok(Json(TokenResponse { token }))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /signup - Create a new user account
#[utoipa::path(
    post,
    path = "/signup",
    request_body(content = CredentialsRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User created; log in to obtain a token"),
        (status = 400, description = "Missing fields or email already registered", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    FormOrJson(req): FormOrJson<CredentialsRequest>,
) -> Result<Json<Value>, HandlerError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(HandlerError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    // 1. Hash the password
    let password_hash = hash_password(req.password.into_bytes()).await?;

    // 2. Create user in database
    let user = state
        .db
        .create_user_with_email(&req.email, &password_hash)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => HandlerError::DuplicateIdentity,
            other => {
                error!("Failed to create user: {:?}", other);
                HandlerError::Internal(other.to_string())
            }
        })?;
    info!("Created user {} for {}", user.id, user.email);

    // No token here; the client logs in separately.
    Ok(Json(json!({})))
}

/// POST /login - Login with an existing local account
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = CredentialsRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid email or password", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    FormOrJson(req): FormOrJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, HandlerError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(HandlerError::InvalidInput(
            "Email and password are required".to_string(),
        ));
    }

    // 1. Get user by email. An unknown email and a wrong password look the same.
    let account = match state.db.get_user_by_email(&req.email).await {
        Ok(creds) => Some(creds),
        Err(PortError::NotFound(_)) => None,
        Err(e) => {
            error!("Failed to get user: {:?}", e);
            return Err(HandlerError::Internal(e.to_string()));
        }
    };

    // 2. Verify password, even when there is no account to match
    let user_id = check_credentials(account, req.password.into_bytes())
        .await?
        .ok_or(HandlerError::InvalidCredentials)?;

    // 3. Issue the session token
    issue_token(&state, user_id)
}

/// POST /login/federated - Login with a Google ID token
///
/// Creates the account on first use.
#[utoipa::path(
    post,
    path = "/login/federated",
    request_body = FederatedLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid token or token issued for another app", body = ErrorBody),
        (status = 503, description = "Identity provider unreachable", body = ErrorBody)
    )
)]
pub async fn federated_login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FederatedLoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, HandlerError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Rejected federated login body: {}", e.body_text());
        HandlerError::InvalidInput("Failed to read body".to_string())
    })?;
    if req.token.trim().is_empty() {
        return Err(HandlerError::InvalidInput("Token is required".to_string()));
    }

    // 1. Verify the token with the identity provider
    let identity = state
        .identity_verifier
        .verify_id_token(&req.token)
        .await
        .map_err(|e| match e {
            PortError::Unavailable(cause) => HandlerError::CollaboratorUnavailable(cause),
            other => {
                warn!("Identity provider rejected token: {}", other);
                HandlerError::InvalidExternalToken
            }
        })?;

    // 2. The token must have been issued for this application
    if identity.audience != state.config.google_client_id {
        warn!(
            "Token audience mismatch: got '{}', expected '{}'",
            identity.audience, state.config.google_client_id
        );
        return Err(HandlerError::AudienceMismatch);
    }

    // 3. Find or create the user
    let user = find_or_create_federated_user(&state, &identity.email).await?;

    // 4. Issue the session token
    issue_token(&state, user.id)
}

async fn find_or_create_federated_user(state: &AppState, email: &str) -> Result<User, HandlerError> {
    match state.db.get_user_by_email(email).await {
        Ok(creds) => return Ok(creds.into_user()),
        Err(PortError::NotFound(_)) => {}
        Err(e) => {
            error!("Failed to look up federated user: {:?}", e);
            return Err(HandlerError::Internal(e.to_string()));
        }
    }

    let password_hash = placeholder_password_hash().await?;
    match state.db.create_user_with_email(email, &password_hash).await {
        Ok(user) => {
            info!("Created user {} for {} on first federated login", user.id, user.email);
            Ok(user)
        }
        // A concurrent login for the same email won the insert.
        Err(PortError::Conflict(_)) => state
            .db
            .get_user_by_email(email)
            .await
            .map(|creds| creds.into_user())
            .map_err(|e| HandlerError::Internal(e.to_string())),
        Err(e) => {
            error!("Failed to create federated user: {:?}", e);
            Err(HandlerError::Internal(e.to_string()))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use argon2::Params;

    #[tokio::test]
    async fn unknown_account_is_checked_against_a_real_argon2_hash() {
        let outcome = check_credentials(None, b"guess".to_vec()).await.unwrap();
        assert_eq!(outcome, None);

        // The miss path verified against a hash with the same cost as stored ones.
        let hash = UNKNOWN_USER_HASH.get().expect("hash is generated on first miss");
        let parsed = PasswordHash::new(hash).unwrap();
        assert_eq!(parsed.algorithm, argon2::Algorithm::default().ident());
        let params = Params::try_from(&parsed).unwrap();
        let expected = Params::default();
        assert_eq!(params.m_cost(), expected.m_cost());
        assert_eq!(params.t_cost(), expected.t_cost());
        assert_eq!(params.p_cost(), expected.p_cost());
    }

    #[tokio::test]
    async fn known_account_matches_only_its_password() {
        let stored = hash_password(b"pw1".to_vec()).await.unwrap();
        let account = |hash: &str| UserCredentials {
            id: 7,
            email: "a@x.io".to_string(),
            hashed_password: hash.to_string(),
        };

        let hit = check_credentials(Some(account(&stored)), b"pw1".to_vec()).await;
        let miss = check_credentials(Some(account(&stored)), b"nope".to_vec()).await;

        assert_eq!(hit.unwrap(), Some(7));
        assert_eq!(miss.unwrap(), None);
    }

    #[tokio::test]
    async fn unparseable_stored_hash_is_an_internal_error() {
        let account = UserCredentials {
            id: 7,
            email: "a@x.io".to_string(),
            hashed_password: "not-a-phc-string".to_string(),
        };
        let err = check_credentials(Some(account), b"pw".to_vec()).await.unwrap_err();
        assert!(matches!(err, HandlerError::Internal(_)));
    }
}
