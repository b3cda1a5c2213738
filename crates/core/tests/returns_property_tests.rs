//! Property-based integration tests for the return calculators.
//!
//! These tests verify that the calculators and formatters keep their
//! structural guarantees for arbitrary price histories, using the `proptest`
//! crate for random test case generation.

use chrono::{Datelike, Duration, NaiveDate};
use proptest::prelude::*;
use returns_calendar_core::loader::sort_and_dedup;
use returns_calendar_core::returns::{
    daily_returns, format_daily, format_monthly, monthly_returns, MonthName,
};
use returns_calendar_market_data::DailyBar;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// Generators
// =============================================================================

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 1, 1).unwrap()
}

/// Generates a bar within roughly four years of the base date.
fn arb_bar() -> impl Strategy<Value = DailyBar> {
    (0i64..1500, 1.0f64..1000.0).prop_map(|(offset, close)| {
        DailyBar::from_close(base_date() + Duration::days(offset), close)
    })
}

/// Generates an unsorted history that may contain duplicate dates.
fn arb_history(max_len: usize) -> impl Strategy<Value = Vec<DailyBar>> {
    proptest::collection::vec(arb_bar(), 0..=max_len)
}

/// Generates a history with one bar per date.
fn arb_unique_history(max_len: usize) -> impl Strategy<Value = Vec<DailyBar>> {
    arb_history(max_len).prop_map(sort_and_dedup)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// One monthly return per (year, month) holding at least two bars.
    #[test]
    fn prop_monthly_count_matches_qualifying_months(bars in arb_unique_history(200)) {
        let mut per_month: BTreeMap<(i32, u32), usize> = BTreeMap::new();
        for bar in &bars {
            *per_month.entry((bar.date.year(), bar.date.month())).or_default() += 1;
        }
        let expected: Vec<(i32, u32)> = per_month
            .into_iter()
            .filter(|(_, count)| *count >= 2)
            .map(|(key, _)| key)
            .collect();

        let returns = monthly_returns(&bars);
        let actual: Vec<(i32, u32)> = returns.iter().map(|r| (r.year, r.month)).collect();
        prop_assert_eq!(actual, expected);
    }

    /// N bars with positive closes yield N - 1 chronological daily returns.
    #[test]
    fn prop_daily_count_is_n_minus_one(bars in arb_unique_history(200)) {
        let returns = daily_returns(&bars);
        prop_assert_eq!(returns.len(), bars.len().saturating_sub(1));

        for (r, pair) in returns.iter().zip(bars.windows(2)) {
            prop_assert_eq!(r.date, pair[1].date);
            let expected = (pair[1].close / pair[0].close - 1.0) * 100.0;
            prop_assert!((r.return_pct - expected).abs() < 1e-9);
        }
    }

    /// Input order does not change the results.
    #[test]
    fn prop_calculators_ignore_input_order(bars in arb_unique_history(100)) {
        let mut reversed = bars.clone();
        reversed.reverse();
        prop_assert_eq!(monthly_returns(&reversed), monthly_returns(&bars));
        prop_assert_eq!(daily_returns(&reversed), daily_returns(&bars));
    }

    /// Dedup keeps exactly one bar per date, in ascending order.
    #[test]
    fn prop_sort_and_dedup_is_strictly_ascending(bars in arb_history(200)) {
        let distinct: BTreeSet<NaiveDate> = bars.iter().map(|b| b.date).collect();
        let out = sort_and_dedup(bars);
        prop_assert_eq!(out.len(), distinct.len());
        prop_assert!(out.windows(2).all(|w| w[0].date < w[1].date));
    }

    /// Every grid row is aligned to the years and Total is set exactly for
    /// years that have at least one month.
    #[test]
    fn prop_monthly_grid_is_aligned(bars in arb_unique_history(200)) {
        let out = format_monthly(&monthly_returns(&bars), "TEST");
        prop_assert!(out.years.windows(2).all(|w| w[0] < w[1]));

        for month in MonthName::ALL {
            prop_assert_eq!(out.data.month(month).len(), out.years.len());
        }
        for (idx, total) in out.data.total().iter().enumerate() {
            let any_month = MonthName::ALL
                .iter()
                .any(|m| out.data.month(*m)[idx].is_some());
            prop_assert_eq!(total.is_some(), any_month);
        }
    }

    /// Daily arrays are sized to their calendar month and hold every return.
    #[test]
    fn prop_daily_arrays_hold_every_return(bars in arb_unique_history(200)) {
        let returns = daily_returns(&bars);
        let out = format_daily(&returns, "TEST");

        let mut cells = 0;
        for (year, months) in &out.data {
            for (month, days) in months {
                prop_assert_eq!(days.len(), month.days_in(*year));
                cells += days.iter().filter(|d| d.is_some()).count();
            }
        }
        prop_assert_eq!(cells, returns.len());
    }
}
