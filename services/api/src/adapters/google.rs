//! services/api/src/adapters/google.rs
//!
//! Verifies Google ID tokens through the token-info endpoint and implements the
//! `IdentityVerifier` port.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use summarizer_core::domain::ExternalIdentity;
use summarizer_core::ports::{IdentityVerifier, PortError, PortResult};
use tracing::{debug, warn};

/// The subset of the token-info response this gateway relies on.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    aud: Option<String>,
}

#[derive(Clone)]
pub struct GoogleTokenInfoAdapter {
    client: Client,
    tokeninfo_url: String,
}

impl GoogleTokenInfoAdapter {
    pub fn new(tokeninfo_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            tokeninfo_url: tokeninfo_url.into(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for GoogleTokenInfoAdapter {
    async fn verify_id_token(&self, token: &str) -> PortResult<ExternalIdentity> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            warn!(
                "Identity provider rejected token with status {}",
                response.status()
            );
            return Err(PortError::Unauthorized);
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            warn!("Identity provider returned an unreadable body: {}", e);
            PortError::Unauthorized
        })?;

        // A token without an email claim cannot be mapped to an account.
        let email = info
            .email
            .filter(|e| !e.is_empty())
            .ok_or(PortError::Unauthorized)?;
        debug!("Identity provider verified token");

        Ok(ExternalIdentity {
            email,
            audience: info.aud.unwrap_or_default(),
        })
    }
}
