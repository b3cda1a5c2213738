//! Core error types for the returns calendar.
//!
//! [`Error`] is what the loader and the returns service surface to callers.
//! [`CacheError`] is the lower-level failure of the on-disk cache store; the
//! loader translates its `Missing`/`Corrupt` cases into the caller-facing
//! `NoCachedData`, `EmptyCache` and `InvalidCache` variants.

use std::fmt;

use returns_calendar_market_data::{CodecError, MarketDataError};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for loading history and computing returns.
#[derive(Error, Debug)]
pub enum Error {
    #[error("No data found for {0}")]
    NoDataFound(String),

    #[error("No cached data available for {0}")]
    NoCachedData(String),

    #[error("Cached data for {0} is empty")]
    EmptyCache(String),

    #[error("Cached data for {0} could not be parsed")]
    InvalidCache(String),

    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl Error {
    /// Returns true if the error was caused by the caller's input rather
    /// than by the data pipeline.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidTicker(_) | Error::InvalidDateRange(_) | Error::InvalidArgument(_)
        )
    }
}

/// Why a cache file could not be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CorruptReason {
    /// The file holds at most a header row.
    NoDataRows,
    /// The file has data rows but none of them parse.
    NoUsableRows,
}

impl fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorruptReason::NoDataRows => write!(f, "no data rows"),
            CorruptReason::NoUsableRows => write!(f, "no usable rows"),
        }
    }
}

/// Errors raised by a [`CacheStore`](crate::cache::CacheStore).
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No cache file for {0}")]
    Missing(String),

    #[error("Cache file for {ticker} is corrupt: {reason}")]
    Corrupt {
        ticker: String,
        reason: CorruptReason,
    },

    #[error("Cache I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Metadata encoding failed: {0}")]
    Metadata(#[from] serde_json::Error),
}
