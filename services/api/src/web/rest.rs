//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification and the
//! handlers that do not belong to a larger group.

use axum::response::Json;
use serde::Serialize;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::web::auth::{
    self, CredentialsRequest, FederatedLoginRequest, TokenResponse,
};
use crate::web::documents::{self, DocumentResponse};
use crate::web::summarize::{
    self, FileSummaryResponse, SummarizeTextRequest, TextSummaryResponse,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        root_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::federated_login_handler,
        summarize::public_summarize_handler,
        summarize::public_summarize_text_handler,
        summarize::summarize_handler,
        summarize::summarize_text_handler,
        documents::list_documents_handler,
    ),
    components(
        schemas(
            CredentialsRequest,
            FederatedLoginRequest,
            TokenResponse,
            SummarizeTextRequest,
            FileSummaryResponse,
            TextSummaryResponse,
            DocumentResponse,
            ErrorBody,
            GreetingResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Summarizer API", description = "Gateway between clients and the document summarization service.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme used by the protected routes.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// Shared Response Structs
//=========================================================================================

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    /// The collaborator's raw error body, present only for relayed upstream errors.
    pub details: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct GreetingResponse {
    message: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Liveness check.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "The gateway is up", body = GreetingResponse)
    )
)]
pub async fn root_handler() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: "Hello from Summarizer API Gateway".to_string(),
    })
}
