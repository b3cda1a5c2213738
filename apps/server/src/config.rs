use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use returns_calendar_core::constants::{DEFAULT_MAX_CACHE_AGE, DEFAULT_TICKER};
use returns_calendar_market_data::provider::stooq::DEFAULT_URL_TEMPLATE;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cache_dir: PathBuf,
    /// Remote download URL with a `{ticker}` placeholder
    pub quote_url: String,
    pub default_ticker: String,
    pub cache_max_age: Duration,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("RC_LISTEN_ADDR", "0.0.0.0:6969")
            .parse()
            .context("Invalid RC_LISTEN_ADDR")?;
        let cache_dir = PathBuf::from(env_or("CACHE_DIR", "./data"));
        let quote_url = env_or("STOOQ_URL", DEFAULT_URL_TEMPLATE);
        if !quote_url.contains("{ticker}") {
            anyhow::bail!("STOOQ_URL must contain a {{ticker}} placeholder");
        }
        let default_ticker = env_or("TICKER", DEFAULT_TICKER);
        let max_age_secs: u64 = env_or(
            "RC_CACHE_MAX_AGE_SECS",
            &DEFAULT_MAX_CACHE_AGE.as_secs().to_string(),
        )
        .parse()
        .context("Invalid RC_CACHE_MAX_AGE_SECS")?;
        let cors_allow = env_or("RC_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("RC_REQUEST_TIMEOUT_MS", "90000")
            .parse()
            .context("Invalid RC_REQUEST_TIMEOUT_MS")?;
        let static_dir = env_or("RC_STATIC_DIR", "public");
        Ok(Self {
            listen_addr,
            cache_dir,
            quote_url,
            default_ticker,
            cache_max_age: Duration::from_secs(max_age_secs),
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            static_dir,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
