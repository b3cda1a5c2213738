//! Quote source trait definition.
//!
//! This module defines the `QuoteSource` trait that every daily bar
//! provider implements. The data loader only ever talks to this trait,
//! which keeps it testable with scripted sources.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::DailyBar;

/// Trait for remote sources of daily OHLCV history.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use returns_calendar_market_data::{DailyBar, MarketDataError, QuoteSource};
///
/// struct FixedSource(Vec<DailyBar>);
///
/// #[async_trait]
/// impl QuoteSource for FixedSource {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn fetch_daily_bars(&self, _ticker: &str) -> Result<Vec<DailyBar>, MarketDataError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Unique identifier for this source, used in logs.
    fn id(&self) -> &'static str;

    /// Fetch the complete daily history available for `ticker`.
    ///
    /// The ticker is passed with the caller's casing; sources apply their
    /// own normalization when building requests. Rows are returned in the
    /// order the provider delivered them. No retries are performed.
    async fn fetch_daily_bars(&self, ticker: &str) -> Result<Vec<DailyBar>, MarketDataError>;
}
