//! services/api/src/web/extract.rs
//!
//! Request extractors shared by the handlers.

use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::HandlerError;

/// Binds a body sent either as `application/json` or as a urlencoded form.
///
/// Any other or missing content type goes to the form extractor, which rejects
/// it; every rejection surfaces as the same 400 `InvalidInput`.
pub struct FormOrJson<T>(pub T);

impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.trim_start().starts_with("application/json"))
            .unwrap_or(false);

        let bound = if is_json {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| value)
                .map_err(|e| e.body_text())
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| value)
                .map_err(|e| e.body_text())
        };

        bound.map(FormOrJson).map_err(|reason| {
            debug!("Rejected request body: {}", reason);
            HandlerError::InvalidInput("Failed to read body".to_string())
        })
    }
}
