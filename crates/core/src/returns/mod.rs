//! Returns module - calculators, formatters and the request facade.

mod daily_changes;
mod returns_calculator;
mod returns_formatter;
mod returns_model;
mod returns_service;
mod returns_traits;

pub use daily_changes::{daily_changes, DailyChange, DailyChangeQuery, DailyChangeReport, SortOrder};
pub use returns_calculator::{daily_returns, monthly_returns};
pub use returns_formatter::{format_daily, format_monthly};
pub use returns_model::{
    DailyReturn, DayCell, FormattedDailyReturns, FormattedMonthlyReturns, MonthDays, MonthName,
    MonthlyGrid, MonthlyReturn,
};
pub use returns_service::ReturnsService;
pub use returns_traits::ReturnsServiceTrait;
