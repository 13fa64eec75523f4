//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    /// Shared secret used to sign and verify session tokens.
    pub session_secret: String,
    /// The OAuth client id that federated ID tokens must be issued for.
    pub google_client_id: String,
    pub summarizer_url: String,
    pub tokeninfo_url: String,
    pub upstream_timeout: Duration,
    /// The browser origin allowed to call the API cross-site.
    pub allowed_origin: HeaderValue,
    pub max_upload_bytes: usize,
}

// Keeps the session secret and database credentials out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("log_level", &self.log_level)
            .field("google_client_id", &self.google_client_id)
            .field("summarizer_url", &self.summarizer_url)
            .field("tokeninfo_url", &self.tokeninfo_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("allowed_origin", &self.allowed_origin)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// except in test builds.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Test builds read only the real environment.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };

        // --- Load Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = required("DATABASE_URL")?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Auth Settings ---
        let session_secret = required("SECRET")?;
        let google_client_id = required("GOOGLE_CLIENT_ID")?;

        // --- Load Collaborator Settings ---
        let summarizer_url = lookup("SUMMARIZER_URL")
            .unwrap_or_else(|| "http://python-ai-service:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        let tokeninfo_url = lookup("TOKENINFO_URL")
            .unwrap_or_else(|| "https://oauth2.googleapis.com/tokeninfo".to_string());

        let timeout_secs = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "UPSTREAM_TIMEOUT_SECS".to_string(),
                        format!("'{}' is not a positive number of seconds", raw),
                    )
                })?,
            None => 120,
        };

        // --- Load HTTP Settings ---
        let allowed_origin_str =
            lookup("ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let allowed_origin = HeaderValue::from_str(&allowed_origin_str).map_err(|e| {
            ConfigError::InvalidValue("ALLOWED_ORIGIN".to_string(), e.to_string())
        })?;

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string(), e.to_string())
            })?,
            None => 10 * 1024 * 1024,
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            session_secret,
            google_client_id,
            summarizer_url,
            tokeninfo_url,
            upstream_timeout: Duration::from_secs(timeout_secs),
            allowed_origin,
            max_upload_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/summaries"),
        ("SECRET", "s3cret"),
        ("GOOGLE_CLIENT_ID", "client.apps.example"),
    ];

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();

        assert_eq!(config.bind_address.to_string(), "0.0.0.0:8080");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.summarizer_url, "http://python-ai-service:8000");
        assert_eq!(config.upstream_timeout, Duration::from_secs(120));
        assert_eq!(config.allowed_origin, "http://localhost:3000");
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn missing_secret_is_reported_by_name() {
        let vars = [
            ("DATABASE_URL", "postgres://localhost/summaries"),
            ("GOOGLE_CLIENT_ID", "client.apps.example"),
        ];
        match Config::from_lookup(lookup_from(&vars)) {
            Err(ConfigError::MissingVar(name)) => assert_eq!(name, "SECRET"),
            other => panic!("expected MissingVar, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let mut vars = MINIMAL.to_vec();
        vars[1] = ("SECRET", "   ");
        assert!(matches!(
            Config::from_lookup(lookup_from(&vars)),
            Err(ConfigError::MissingVar(_))
        ));
    }

    #[test]
    fn summarizer_url_trailing_slash_is_trimmed() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("SUMMARIZER_URL", "http://127.0.0.1:8000/"));
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.summarizer_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("UPSTREAM_TIMEOUT_SECS", "0"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&vars)),
            Err(ConfigError::InvalidValue(name, _)) if name == "UPSTREAM_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("postgres://"));
    }
}
