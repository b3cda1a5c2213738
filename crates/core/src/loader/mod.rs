//! Data loader: decides between the remote source and the local cache.
//!
//! ```text
//! load(ticker, refresh)
//!   ├─ refresh | no cache | stale ──► QuoteSource ──► persist ──► rows
//!   │                                    └─ empty/error ──► cache fallback
//!   └─ fresh cache ──► CacheStore
//! ```
//!
//! Cached rows are topped up with newer remote rows unless the refresh was
//! forced.

mod service;


pub use service::{sort_and_dedup, DataLoader};
