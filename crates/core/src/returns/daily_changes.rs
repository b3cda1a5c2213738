//! Day-over-day change report for a date window.

use std::str::FromStr;

use chrono::NaiveDate;
use returns_calendar_market_data::DailyBar;
use serde::{Deserialize, Serialize};

use super::returns_calculator::daily_returns;
use crate::constants::{DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use crate::errors::{Error, Result};

/// Ordering of the reported changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Chronological
    #[default]
    None,
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SortOrder::None),
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::InvalidArgument(format!(
                "order must be none, asc or desc, got '{}'",
                other
            ))),
        }
    }
}

/// Window and thresholds of a change report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyChangeQuery {
    /// Defaults to the first available date
    pub start: Option<NaiveDate>,
    /// Defaults to the last available date
    pub end: Option<NaiveDate>,
    pub order: SortOrder,
    pub high_threshold: f64,
    pub low_threshold: f64,
}

impl Default for DailyChangeQuery {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            order: SortOrder::None,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            low_threshold: DEFAULT_LOW_THRESHOLD,
        }
    }
}

impl DailyChangeQuery {
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(Error::InvalidDateRange(format!(
                    "start {} is after end {}",
                    start, end
                )));
            }
        }
        if !self.high_threshold.is_finite() || !self.low_threshold.is_finite() {
            return Err(Error::InvalidArgument(
                "thresholds must be finite numbers".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyChange {
    pub date: NaiveDate,
    #[serde(rename = "return")]
    pub return_pct: f64,
}

/// Changes within a window plus the count of days beyond each threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChangeReport {
    pub ticker: String,
    /// Resolved window; `None` only when there were no bars at all
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub high_threshold: f64,
    pub low_threshold: f64,
    pub days_above: usize,
    pub days_below: usize,
    pub changes: Vec<DailyChange>,
}

/// Compute the change report of `bars` for `query`.
///
/// Returns are computed on the windowed bars only, so the first day of the
/// window has no change.
pub fn daily_changes(
    bars: &[DailyBar],
    ticker: &str,
    query: &DailyChangeQuery,
) -> Result<DailyChangeReport> {
    query.validate()?;

    let start = query.start.or_else(|| bars.iter().map(|b| b.date).min());
    let end = query.end.or_else(|| bars.iter().map(|b| b.date).max());

    let window: Vec<DailyBar> = bars
        .iter()
        .filter(|b| start.map_or(true, |s| b.date >= s) && end.map_or(true, |e| b.date <= e))
        .cloned()
        .collect();

    let mut changes: Vec<DailyChange> = daily_returns(&window)
        .into_iter()
        .map(|r| DailyChange {
            date: r.date,
            return_pct: r.return_pct,
        })
        .collect();

    match query.order {
        SortOrder::None => {}
        SortOrder::Asc => changes.sort_by(|a, b| a.return_pct.total_cmp(&b.return_pct)),
        SortOrder::Desc => changes.sort_by(|a, b| b.return_pct.total_cmp(&a.return_pct)),
    }

    let days_above = changes
        .iter()
        .filter(|c| c.return_pct > query.high_threshold)
        .count();
    let days_below = changes
        .iter()
        .filter(|c| c.return_pct < query.low_threshold)
        .count();

    Ok(DailyChangeReport {
        ticker: ticker.to_string(),
        start,
        end,
        high_threshold: query.high_threshold,
        low_threshold: query.low_threshold,
        days_above,
        days_below,
        changes,
    })
}
