//! Percentage returns derived from daily closes.
//!
//! Inputs are sorted by date (stable) before use, so callers may pass bars in
//! any order. Results are not rounded.

use returns_calendar_market_data::DailyBar;

use super::returns_model::{DailyReturn, MonthlyReturn};

/// One return per (year, month) with at least two bars and a positive first
/// close, ordered by year then month.
pub fn monthly_returns(bars: &[DailyBar]) -> Vec<MonthlyReturn> {
    let sorted = sorted_by_date(bars);

    sorted
        .chunk_by(|a, b| a.year() == b.year() && a.month() == b.month())
        .filter_map(|group| {
            let (first, last) = (group.first()?, group.last()?);
            if group.len() < 2 || first.close <= 0.0 {
                return None;
            }
            Some(MonthlyReturn {
                year: first.year(),
                month: first.month(),
                return_pct: (last.close / first.close - 1.0) * 100.0,
            })
        })
        .collect()
}

/// Day-over-day returns for every bar after the first whose previous close is
/// positive.
pub fn daily_returns(bars: &[DailyBar]) -> Vec<DailyReturn> {
    let sorted = sorted_by_date(bars);

    sorted
        .windows(2)
        .filter_map(|pair| {
            let (prev, bar) = (pair[0], pair[1]);
            if prev.close <= 0.0 {
                return None;
            }
            Some(DailyReturn {
                date: bar.date,
                year: bar.year(),
                month: bar.month(),
                day: bar.day(),
                weekday: bar.weekday_index(),
                return_pct: (bar.close / prev.close - 1.0) * 100.0,
            })
        })
        .collect()
}

fn sorted_by_date(bars: &[DailyBar]) -> Vec<&DailyBar> {
    let mut sorted: Vec<&DailyBar> = bars.iter().collect();
    sorted.sort_by_key(|bar| bar.date);
    sorted
}
