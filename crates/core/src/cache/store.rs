use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use returns_calendar_market_data::DailyBar;

use crate::errors::CacheError;

/// Persistent per-ticker history with refresh bookkeeping.
///
/// Tickers passed to a store are cache keys (uppercased).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Whether a history file exists for the ticker.
    async fn exists(&self, ticker: &str) -> bool;

    /// Read the cached bars in file order.
    async fn read(&self, ticker: &str) -> Result<Vec<DailyBar>, CacheError>;

    /// Replace the cached bars. The store does not reorder them.
    async fn write(&self, ticker: &str, bars: &[DailyBar]) -> Result<(), CacheError>;

    /// Last successful refresh in epoch milliseconds.
    async fn refresh_timestamp(&self, ticker: &str) -> Result<Option<i64>, CacheError>;

    async fn set_refresh_timestamp(&self, ticker: &str, timestamp: i64)
        -> Result<(), CacheError>;

    /// True when the ticker was never refreshed or its last refresh is older
    /// than `max_age`.
    async fn is_stale(&self, ticker: &str, max_age: Duration) -> Result<bool, CacheError> {
        let Some(last) = self.refresh_timestamp(ticker).await? else {
            return Ok(true);
        };
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let age = Utc::now().timestamp_millis().saturating_sub(last);
        Ok(age > max_age_ms)
    }
}
