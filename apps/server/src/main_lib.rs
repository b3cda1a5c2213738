use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use returns_calendar_core::{
    constants::DEFAULT_TICKER,
    ticker::normalize_ticker,
    DataLoader, FileCacheStore, ReturnsService, ReturnsServiceTrait,
};
use returns_calendar_market_data::{QuoteSource, StooqProvider};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub returns_service: Arc<dyn ReturnsServiceTrait + Send + Sync>,
    /// Directory served read-only under `/data`
    pub cache_dir: PathBuf,
}

pub fn init_tracing() {
    let log_format = std::env::var("RC_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let source = Arc::new(StooqProvider::new(config.quote_url.clone()));
    tracing::info!("Quote source: {}", config.quote_url);
    build_state_with_source(config, source).await
}

/// Build the application state around an explicit quote source.
pub async fn build_state_with_source(
    config: &Config,
    source: Arc<dyn QuoteSource>,
) -> anyhow::Result<Arc<AppState>> {
    let default_ticker =
        normalize_ticker(Some(&config.default_ticker), DEFAULT_TICKER).context("Invalid TICKER")?;

    let store = Arc::new(FileCacheStore::new(&config.cache_dir, &default_ticker));
    store
        .initialize()
        .await
        .with_context(|| format!("Failed to prepare cache at {}", config.cache_dir.display()))?;
    tracing::info!("Cache directory in use: {}", config.cache_dir.display());

    let loader = Arc::new(DataLoader::new(source, store).with_max_age(config.cache_max_age));
    let returns_service = Arc::new(ReturnsService::new(loader, default_ticker));

    Ok(Arc::new(AppState {
        returns_service,
        cache_dir: config.cache_dir.clone(),
    }))
}
