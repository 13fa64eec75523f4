//! services/api/src/adapters/summarizer.rs
//!
//! This module contains the adapter for the external summarization service.
//! It implements the `SummarizationService` port from the `core` crate by relaying
//! requests over HTTP with `reqwest`.

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, multipart, Client};
use serde::Serialize;
use std::time::Duration;
use summarizer_core::domain::{FileUpload, RelayResponse};
use summarizer_core::ports::{PortError, PortResult, SummarizationService};
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SummarizationService` against the summarizer's HTTP API.
#[derive(Clone)]
pub struct HttpSummarizerAdapter {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct TextPayload<'a> {
    text: &'a str,
}

impl HttpSummarizerAdapter {
    /// Creates a new `HttpSummarizerAdapter` whose calls give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Reads the full upstream reply. Any failure here is a transport failure.
    async fn collect(response: reqwest::Response) -> PortResult<RelayResponse> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;

        if !(200..300).contains(&status) {
            warn!("Summarizer responded with status {}", status);
        }

        Ok(RelayResponse {
            status,
            content_type,
            body,
        })
    }
}

//=========================================================================================
// `SummarizationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SummarizationService for HttpSummarizerAdapter {
    async fn summarize_file(&self, file: FileUpload, word_count: &str) -> PortResult<RelayResponse> {
        let url = format!("{}/summarize", self.base_url);
        debug!(
            "Relaying file '{}' ({} bytes) to {}",
            file.filename,
            file.data.len(),
            url
        );

        // An unparseable client mime type is dropped rather than rejected.
        let new_part =
            || multipart::Part::stream(file.data.clone()).file_name(file.filename.clone());
        let part = match file.content_type.as_deref() {
            Some(mime) => new_part().mime_str(mime).unwrap_or_else(|_| new_part()),
            None => new_part(),
        };

        let form = multipart::Form::new()
            .text("word_count", word_count.to_string())
            .part("file", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;

        Self::collect(response).await
    }

    async fn summarize_text(&self, text: &str, word_count: &str) -> PortResult<RelayResponse> {
        let url = format!("{}/summarize-text", self.base_url);
        debug!("Relaying {} characters of text to {}", text.len(), url);

        let response = self
            .client
            .post(&url)
            .query(&[("word_count", word_count)])
            .json(&TextPayload { text })
            .send()
            .await
            .map_err(|e| PortError::Unavailable(e.to_string()))?;

        Self::collect(response).await
    }
}
