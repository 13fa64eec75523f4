//! services/api/src/web/router.rs
//!
//! Assembles the public and protected route groups into the application router.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    auth::{federated_login_handler, login_handler, signup_handler},
    documents::list_documents_handler,
    middleware::require_auth,
    rest::{root_handler, ApiDoc},
    state::AppState,
    summarize::{
        public_summarize_handler, public_summarize_text_handler, summarize_handler,
        summarize_text_handler,
    },
};

/// Builds the complete application, Swagger UI included.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([ORIGIN, CONTENT_TYPE, AUTHORIZATION]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/", get(root_handler))
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/login/federated", post(federated_login_handler))
        .route("/public/summarize", post(public_summarize_handler))
        .route("/public/summarize-text", post(public_summarize_text_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/summarize", post(summarize_handler))
        .route("/summarize-text", post(summarize_text_handler))
        .route("/documents", get(list_documents_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
