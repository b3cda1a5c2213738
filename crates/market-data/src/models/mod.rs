//! Market data models
//!
//! - `bar` - One trading day of OHLCV data (DailyBar)

mod bar;

pub use bar::DailyBar;
