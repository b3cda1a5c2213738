//! Local cache of daily history.
//!
//! - [`store`] - The [`CacheStore`] contract used by the loader
//! - [`file_store`] - CSV-per-ticker implementation backed by a directory
//! - [`metadata`] - Shared refresh timestamps (`metadata.json`)
//!
//! ```text
//! <CACHE_DIR>/
//!   metadata.json        {"lastUpdated": {"TSLA": {"timestamp": 1700000000000}}}
//!   TSLA_daily.csv       Date,Open,High,Low,Close,Volume
//! ```

mod file_store;
mod metadata;
mod store;

pub use file_store::FileCacheStore;
pub use metadata::{RefreshEntry, RefreshMetadata};
pub use store::CacheStore;
