//! Returns Calendar Core - cache, data loader and return calculations.
//!
//! This crate turns a ticker into monthly and daily return tables. It is
//! transport-agnostic: the remote quote source comes from the `market-data`
//! crate and the HTTP/socket surface lives in the server.

pub mod cache;
pub mod constants;
pub mod errors;
pub mod loader;
pub mod returns;
pub mod ticker;

pub use cache::{CacheStore, FileCacheStore};
pub use loader::DataLoader;
pub use returns::{ReturnsService, ReturnsServiceTrait};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
