use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data for a single ticker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBar {
    /// Trading day (day precision, no time zone)
    pub date: NaiveDate,

    /// Opening price
    pub open: f64,

    /// Session high
    pub high: f64,

    /// Session low
    pub low: f64,

    /// Closing price, the input of every return calculation
    pub close: f64,

    /// Shares traded
    pub volume: u64,
}

impl DailyBar {
    /// Create a full OHLCV bar
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Create a bar carrying only a close price (open/high/low mirror the close)
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self::new(date, close, close, close, close, 0)
    }

    /// Calendar year of the trading day
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Calendar month, 1 through 12
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Day of the month, starting at 1
    pub fn day(&self) -> u32 {
        self.date.day()
    }

    /// Weekday index with 0 = Sunday through 6 = Saturday
    pub fn weekday_index(&self) -> u8 {
        self.date.weekday().num_days_from_sunday() as u8
    }
}
