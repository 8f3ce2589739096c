//! Smart Message Assistant server

use message_assistant::api::{create_router, AppState};
use message_assistant::config::AssistantConfig;
use message_assistant::provider::ProviderRegistry;
use message_assistant::runtime::{LoggingPlatform, LoggingTelemetry, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "message_assistant=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AssistantConfig::from_env()?;

    let registry = Arc::new(ProviderRegistry::from_config(&config)?);
    match &config.provider_url {
        Some(url) => tracing::info!(url = %url, modes = ?registry.modes(), "Using remote provider"),
        None => tracing::warn!("SMA_PROVIDER_URL not set, serving canned transformations"),
    }
    tracing::info!(
        retention_hours = config.retention_hours,
        timeout_secs = config.dispatch_timeout.as_secs(),
        "Configuration loaded"
    );

    let sessions = Arc::new(SessionManager::new(
        &config,
        registry,
        Arc::new(LoggingPlatform),
        Arc::new(LoggingTelemetry),
    ));
    let state = AppState::new(sessions.clone());

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Message assistant listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down, stopping session runtimes");
            sessions.shutdown();
        })
        .await?;

    Ok(())
}
