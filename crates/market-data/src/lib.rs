//! Returns Calendar Market Data Crate
//!
//! Remote daily price history for the returns calendar.
//!
//! # Overview
//!
//! ```text
//! +------------------+      +------------------+      +------------------+
//! |   Data Loader    | ---> |   QuoteSource    | ---> |  StooqProvider   |
//! +------------------+      +------------------+      +------------------+
//!                                                              |
//!                                                              v
//!                                                     +------------------+
//!                                                     |  codec (CSV)     |
//!                                                     +------------------+
//!                                                              |
//!                                                              v
//!                                                     +------------------+
//!                                                     |    DailyBar      |
//!                                                     +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`DailyBar`] - One trading day of OHLCV data
//! - [`QuoteSource`] - Trait implemented by remote providers
//! - [`StooqProvider`] - Stooq CSV download provider
//! - [`MarketDataError`] - Remote fetch failures
//!
//! The [`codec`] module is shared with the on-disk cache, which stores bars
//! in the same CSV layout the provider downloads.

pub mod codec;
pub mod errors;
pub mod models;
pub mod provider;

pub use codec::{parse_bars, write_bars, ParsedBars, CSV_HEADER};
pub use errors::{CodecError, MarketDataError};
pub use models::DailyBar;
pub use provider::stooq::StooqProvider;
pub use provider::QuoteSource;
