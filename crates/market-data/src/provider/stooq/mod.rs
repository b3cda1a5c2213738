//! Stooq daily history provider.
//!
//! Stooq serves the full daily history of a US listing as a CSV download:
//! `https://stooq.com/q/d/l/?s=tsla.us&i=d`. The URL is configurable as a
//! template where `{ticker}` is replaced by the lower-cased symbol.
//!
//! Note: Stooq enforces a daily download quota and answers with a plain text
//! notice (HTTP 200) once it is exhausted.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::codec;
use crate::errors::MarketDataError;
use crate::models::DailyBar;
use crate::provider::QuoteSource;

pub const PROVIDER_ID: &str = "STOOQ";

/// Default download URL; `{ticker}` is substituted with the lower-cased symbol.
pub const DEFAULT_URL_TEMPLATE: &str = "https://stooq.com/q/d/l/?s={ticker}.us&i=d";

/// Text Stooq returns instead of CSV when the daily quota is used up.
pub const RATE_LIMIT_MARKER: &str = "Exceeded the daily hits limit";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Stooq CSV download provider.
pub struct StooqProvider {
    client: Client,
    url_template: String,
    timeout: Duration,
}

impl StooqProvider {
    /// Create a provider for the given URL template with the standard 30 second timeout.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self::with_timeout(url_template, DEFAULT_TIMEOUT)
    }

    /// Create a provider with a custom request timeout.
    pub fn with_timeout(url_template: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            url_template: url_template.into(),
            timeout,
        }
    }

    /// Build the download URL for a ticker.
    pub fn url_for(&self, ticker: &str) -> String {
        self.url_template
            .replace("{ticker}", &ticker.to_lowercase())
    }

    async fn fetch_body(&self, ticker: &str) -> Result<String, MarketDataError> {
        let url = self.url_for(ticker);
        debug!("Stooq request: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::fetch_failed(
                    ticker,
                    format!("request timed out after {}s", self.timeout.as_secs()),
                )
            } else {
                MarketDataError::fetch_failed(ticker, e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                ticker: ticker.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::fetch_failed(
                ticker,
                format!("HTTP {}", status),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::fetch_failed(ticker, e.to_string()))
    }

    /// Interpret a response body: quota notice, empty payload or CSV rows.
    fn bars_from_body(ticker: &str, body: &str) -> Result<Vec<DailyBar>, MarketDataError> {
        if body.contains(RATE_LIMIT_MARKER) {
            return Err(MarketDataError::RateLimited {
                ticker: ticker.to_string(),
            });
        }

        let parsed = codec::parse_bars(body).map_err(|e| {
            MarketDataError::fetch_failed(ticker, format!("Failed to parse response: {}", e))
        })?;

        if parsed.is_empty_payload() {
            return Err(MarketDataError::NoDataAvailable {
                ticker: ticker.to_string(),
            });
        }

        if parsed.rejected > 0 {
            warn!(
                "Stooq: rejected {} of {} rows for {} (malformed date or price)",
                parsed.rejected, parsed.records, ticker
            );
        }

        debug!("Stooq: fetched {} bars for {}", parsed.bars.len(), ticker);

        Ok(parsed.bars)
    }
}

impl Default for StooqProvider {
    fn default() -> Self {
        Self::new(DEFAULT_URL_TEMPLATE)
    }
}

#[async_trait]
impl QuoteSource for StooqProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_daily_bars(&self, ticker: &str) -> Result<Vec<DailyBar>, MarketDataError> {
        let body = self.fetch_body(ticker).await?;
        Self::bars_from_body(ticker, &body)
    }
}
