//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, GoogleTokenInfoAdapter, HttpSummarizerAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded: {:?}", config);

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Collaborator Adapters ---
    let summarizer = Arc::new(HttpSummarizerAdapter::new(
        config.summarizer_url.clone(),
        config.upstream_timeout,
    )?);
    let identity_verifier = Arc::new(GoogleTokenInfoAdapter::new(
        config.tokeninfo_url.clone(),
        config.upstream_timeout,
    )?);
    info!("Relaying summaries to {}", config.summarizer_url);

    // --- 4. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        db_adapter,
        summarizer,
        identity_verifier,
    ));
    let app = build_router(app_state);

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

/// Resolves on Ctrl+C so in-flight requests can finish before exit.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server simply runs until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
