// Main entry point for the event-scrape API server

use std::sync::Arc;

use anyhow::{Context, Result};
use scrape::{BrowserFetcher, EventExtractor, OpenAiChat};
use server_core::{build_app, AppConfig, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,scrape=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting BrandBuddy event-scrape API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let app_config = AppConfig::load(&config.app_config_path);
    tracing::info!(
        categories = app_config.categories.len(),
        "Configuration loaded"
    );

    // Build the pipeline
    let model = config.openai_api_key.as_ref().map(|key| {
        let mut chat = OpenAiChat::new(key);
        if let Some(model) = &config.openai_model {
            chat = chat.with_model(model);
        }
        Arc::new(chat) as Arc<dyn scrape::ChatModel>
    });

    if model.is_none() {
        tracing::warn!("OPENAI_API_KEY not configured - extraction runs in degraded mode");
    }

    let state = AppState {
        fetcher: Arc::new(BrowserFetcher::new()),
        extractor: Arc::new(EventExtractor::new(model)),
        categories: Arc::new(app_config.categories),
    };

    let app = build_app(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
