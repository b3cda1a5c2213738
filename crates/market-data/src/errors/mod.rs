//! Error types for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: failures surfaced by a [`QuoteSource`](crate::QuoteSource)
//! - [`CodecError`]: failures while reading or writing daily bar CSV text

use thiserror::Error;

/// Errors that can occur while fetching daily bars from a remote source.
///
/// Every variant names the ticker that was requested so that callers can
/// log or surface the failure without carrying extra context around.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider answered with its rate-limit notice instead of data.
    #[error("Rate limited by upstream while fetching {ticker}")]
    RateLimited {
        /// The ticker that was requested
        ticker: String,
    },

    /// The provider answered, but the payload held no records.
    #[error("No data available for {ticker}")]
    NoDataAvailable {
        /// The ticker that was requested
        ticker: String,
    },

    /// Transport, HTTP status or payload failure.
    #[error("Failed to download data for {ticker}: {message}")]
    FetchFailed {
        /// The ticker that was requested
        ticker: String,
        /// Description of the underlying failure
        message: String,
    },
}

impl MarketDataError {
    /// Returns the ticker the failed request was made for.
    pub fn ticker(&self) -> &str {
        match self {
            Self::RateLimited { ticker }
            | Self::NoDataAvailable { ticker }
            | Self::FetchFailed { ticker, .. } => ticker,
        }
    }

    /// Returns true if the provider refused the request because of its quota.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub(crate) fn fetch_failed(ticker: &str, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            ticker: ticker.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised by the daily bar CSV codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// A required column is absent from a payload that has data rows.
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MarketDataError::RateLimited {
            ticker: "TSLA".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Rate limited by upstream while fetching TSLA"
        );

        let error = MarketDataError::NoDataAvailable {
            ticker: "ZZZZ".to_string(),
        };
        assert_eq!(format!("{}", error), "No data available for ZZZZ");

        let error = MarketDataError::fetch_failed("AAPL", "HTTP 502 Bad Gateway");
        assert_eq!(
            format!("{}", error),
            "Failed to download data for AAPL: HTTP 502 Bad Gateway"
        );
    }

    #[test]
    fn test_ticker_accessor() {
        let error = MarketDataError::fetch_failed("msft", "timeout");
        assert_eq!(error.ticker(), "msft");
        assert!(!error.is_rate_limited());

        let error = MarketDataError::RateLimited {
            ticker: "NVDA".to_string(),
        };
        assert_eq!(error.ticker(), "NVDA");
        assert!(error.is_rate_limited());
    }

    #[test]
    fn test_codec_error_display() {
        let error = CodecError::MissingColumn("Close");
        assert_eq!(format!("{}", error), "Missing column: Close");
    }
}
