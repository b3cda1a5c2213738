//! Reshape flat return lists into year/month grids for the calendar UI.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use super::returns_model::{
    DailyReturn, DayCell, FormattedDailyReturns, FormattedMonthlyReturns, MonthName, MonthlyGrid,
    MonthlyReturn,
};

/// Build the month-by-year table, with a compounded `Total` per year.
pub fn format_monthly(returns: &[MonthlyReturn], ticker: &str) -> FormattedMonthlyReturns {
    let years = distinct_years(returns.iter().map(|r| r.year));
    let mut data = MonthlyGrid::with_years(years.len());

    for r in returns {
        let (Some(month), Ok(idx)) = (MonthName::from_number(r.month), years.binary_search(&r.year))
        else {
            warn!("Skipping monthly return with month {} in {}", r.month, r.year);
            continue;
        };
        data.set(month, idx, r.return_pct);
    }
    data.compute_totals();

    FormattedMonthlyReturns {
        years,
        data,
        ticker: ticker.to_string(),
    }
}

/// Build `data[year][month]` day arrays sized to the calendar month.
pub fn format_daily(returns: &[DailyReturn], ticker: &str) -> FormattedDailyReturns {
    let years = distinct_years(returns.iter().map(|r| r.year));
    let mut data: BTreeMap<i32, BTreeMap<MonthName, Vec<Option<DayCell>>>> = BTreeMap::new();

    for r in returns {
        let Some(month) = MonthName::from_number(r.month) else {
            warn!("Skipping daily return with month {} on {}", r.month, r.date);
            continue;
        };
        let days = data
            .entry(r.year)
            .or_default()
            .entry(month)
            .or_insert_with(|| vec![None; month.days_in(r.year)]);

        let slot = usize::try_from(r.day)
            .ok()
            .and_then(|day| day.checked_sub(1))
            .and_then(|idx| days.get_mut(idx));
        if let Some(slot) = slot {
            *slot = Some(DayCell {
                return_pct: r.return_pct,
                weekday: r.weekday,
            });
        }
    }

    FormattedDailyReturns {
        years,
        data,
        ticker: ticker.to_string(),
    }
}

fn distinct_years(years: impl Iterator<Item = i32>) -> Vec<i32> {
    years.collect::<BTreeSet<_>>().into_iter().collect()
}
