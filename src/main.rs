//! websearch-rs: a caching web search aggregator
//!
//! This is the main entry point for the application.

use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;
use websearch_rs::{
    config,
    network::HttpClient,
    providers::ProviderLoader,
    web::{create_router, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings_path = config::locate();
    let settings = config::load_from(settings_path.as_deref())?;

    // Initialize logging, RUST_LOG wins over the debug flag
    let default_level = if settings.general.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting websearch-rs v{}", websearch_rs::VERSION);
    match &settings_path {
        Some(path) => info!("Loaded settings from: {}", path.display()),
        None => info!("No settings file found, using defaults"),
    }
    info!("Environment: {}", settings.general.app_env);

    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;

    // Load providers
    let registry = ProviderLoader::load(&settings, &client)?;
    if registry.is_empty() {
        info!("No search providers available, searches will return no results");
    }

    info!(
        "Result cache {} (ttl {}s)",
        if settings.cache.enabled { "enabled" } else { "disabled" },
        settings.cache.ttl
    );

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    // Create application state and router
    let state = AppState::new(settings, registry)?;
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
