//! Return models and their response shapes.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Percentage change from the first to the last close of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub year: i32,
    /// 1-12
    pub month: u32,
    #[serde(rename = "return")]
    pub return_pct: f64,
}

/// Percentage change of a close against the previous trading day's close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyReturn {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u8,
    #[serde(rename = "return")]
    pub return_pct: f64,
}

/// Abbreviated month names, ordered by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MonthName {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl MonthName {
    pub const ALL: [MonthName; 12] = [
        MonthName::Jan,
        MonthName::Feb,
        MonthName::Mar,
        MonthName::Apr,
        MonthName::May,
        MonthName::Jun,
        MonthName::Jul,
        MonthName::Aug,
        MonthName::Sep,
        MonthName::Oct,
        MonthName::Nov,
        MonthName::Dec,
    ];

    /// Month for a 1-based month number.
    pub fn from_number(month: u32) -> Option<Self> {
        let idx = usize::try_from(month).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MonthName::Jan => "Jan",
            MonthName::Feb => "Feb",
            MonthName::Mar => "Mar",
            MonthName::Apr => "Apr",
            MonthName::May => "May",
            MonthName::Jun => "Jun",
            MonthName::Jul => "Jul",
            MonthName::Aug => "Aug",
            MonthName::Sep => "Sep",
            MonthName::Oct => "Oct",
            MonthName::Nov => "Nov",
            MonthName::Dec => "Dec",
        }
    }

    /// Number of calendar days of this month in `year`.
    pub fn days_in(self, year: i32) -> usize {
        match self {
            MonthName::Feb if is_leap_year(year) => 29,
            MonthName::Feb => 28,
            MonthName::Apr | MonthName::Jun | MonthName::Sep | MonthName::Nov => 30,
            _ => 31,
        }
    }
}

impl fmt::Display for MonthName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Month-by-year table of monthly returns.
///
/// Every row is aligned to the `years` of the enclosing response. Serializes
/// as an object with the keys `Jan`..`Dec` followed by `Total`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyGrid {
    months: [Vec<Option<f64>>; 12],
    total: Vec<Option<f64>>,
}

impl MonthlyGrid {
    /// Empty grid for `len` years.
    pub fn with_years(len: usize) -> Self {
        Self {
            months: std::array::from_fn(|_| vec![None; len]),
            total: vec![None; len],
        }
    }

    pub fn month(&self, month: MonthName) -> &[Option<f64>] {
        &self.months[month as usize]
    }

    pub fn total(&self) -> &[Option<f64>] {
        &self.total
    }

    pub(crate) fn set(&mut self, month: MonthName, year_idx: usize, value: f64) {
        if let Some(cell) = self.months[month as usize].get_mut(year_idx) {
            *cell = Some(value);
        }
    }

    /// Compound the present months of every year into the `Total` row.
    pub(crate) fn compute_totals(&mut self) {
        for (idx, total) in self.total.iter_mut().enumerate() {
            let mut growth = 1.0;
            let mut present = false;
            for row in &self.months {
                if let Some(Some(r)) = row.get(idx) {
                    growth *= 1.0 + r / 100.0;
                    present = true;
                }
            }
            *total = present.then(|| (growth - 1.0) * 100.0);
        }
    }
}

impl Serialize for MonthlyGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(13))?;
        for month in MonthName::ALL {
            map.serialize_entry(month.as_str(), self.month(month))?;
        }
        map.serialize_entry("Total", &self.total)?;
        map.end()
    }
}

/// Monthly returns shaped for the calendar table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedMonthlyReturns {
    /// Distinct years, ascending
    pub years: Vec<i32>,
    pub data: MonthlyGrid,
    pub ticker: String,
}

/// One trading day in the daily calendar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayCell {
    #[serde(rename = "return")]
    pub return_pct: f64,
    pub weekday: u8,
}

/// Day slots of one month; index `day - 1`, `None` for non-trading days.
pub type MonthDays = Vec<Option<DayCell>>;

/// Daily returns shaped for the calendar view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedDailyReturns {
    pub years: Vec<i32>,
    pub data: BTreeMap<i32, BTreeMap<MonthName, MonthDays>>,
    pub ticker: String,
}
