//! Ticker normalization shared by the service and the cache.

use crate::constants::MAX_TICKER_LEN;
use crate::errors::{Error, Result};

/// Resolve the ticker a request refers to.
///
/// Surrounding whitespace is dropped and a missing or blank ticker falls back
/// to `default`. The caller's casing is kept: the remote source applies its
/// own casing while cache keys are uppercased with [`cache_key`].
///
/// Only ASCII letters, digits and `.` `-` `_` `^` are accepted, which keeps
/// tickers safe to embed in cache file names.
pub fn normalize_ticker(raw: Option<&str>, default: &str) -> Result<String> {
    let ticker = match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => default.trim(),
    };

    if ticker.is_empty() || ticker.len() > MAX_TICKER_LEN {
        return Err(Error::InvalidTicker(ticker.to_string()));
    }

    let valid = ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^'));
    if !valid {
        return Err(Error::InvalidTicker(ticker.to_string()));
    }

    Ok(ticker.to_string())
}

/// Key used for cache files and refresh metadata.
pub fn cache_key(ticker: &str) -> String {
    ticker.to_uppercase()
}
