use std::time::Duration;

/// Ticker used when a request does not name one
pub const DEFAULT_TICKER: &str = "TSLA";

/// Cached history older than this is refreshed from the remote source
pub const DEFAULT_MAX_CACHE_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Shared refresh metadata file inside the cache directory
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Per-ticker cache files are named `<TICKER>_daily.csv`
pub const CACHE_FILE_SUFFIX: &str = "_daily.csv";

/// Longest ticker symbol accepted from callers
pub const MAX_TICKER_LEN: usize = 20;

/// Default "big move" thresholds for the daily change report, in percent
pub const DEFAULT_HIGH_THRESHOLD: f64 = 10.0;
pub const DEFAULT_LOW_THRESHOLD: f64 = -10.0;
