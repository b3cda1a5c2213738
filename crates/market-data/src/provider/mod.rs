//! Quote source abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteSource` trait that all providers implement
//! - The Stooq daily CSV provider

mod traits;

pub mod stooq;

pub use traits::QuoteSource;
