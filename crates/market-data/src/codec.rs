//! Daily bar CSV codec.
//!
//! Both the remote provider payload and the on-disk cache use the same
//! layout: a header row `Date,Open,High,Low,Close,Volume` followed by one
//! row per trading day with the date written as `YYYY-MM-DD`.
//!
//! Rows whose date or prices cannot be parsed are rejected and counted
//! instead of being carried forward as NaN.

use chrono::NaiveDate;
use csv::StringRecord;

use crate::errors::CodecError;
use crate::models::DailyBar;

/// Header row written in front of every serialized bar set.
pub const CSV_HEADER: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of parsing a CSV payload.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedBars {
    /// Rows that parsed cleanly, in input order
    pub bars: Vec<DailyBar>,
    /// Number of non-empty data rows seen after the header
    pub records: usize,
    /// Number of data rows that were rejected as malformed
    pub rejected: usize,
}

impl ParsedBars {
    /// True when the payload had no data rows at all.
    pub fn is_empty_payload(&self) -> bool {
        self.records == 0
    }
}

#[derive(Clone, Copy, Debug)]
struct Columns {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, &'static str> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
                .ok_or(name)
        };
        Ok(Self {
            date: find("Date")?,
            open: find("Open")?,
            high: find("High")?,
            low: find("Low")?,
            close: find("Close")?,
            volume: find("Volume").ok(),
        })
    }

    fn parse(&self, record: &StringRecord) -> Option<DailyBar> {
        let date = parse_date(record.get(self.date)?)?;
        let open = parse_price(record.get(self.open)?)?;
        let high = parse_price(record.get(self.high)?)?;
        let low = parse_price(record.get(self.low)?)?;
        let close = parse_price(record.get(self.close)?)?;
        let volume = match self.volume {
            Some(idx) => parse_volume(record.get(idx).unwrap_or(""))?,
            None => 0,
        };
        Some(DailyBar::new(date, open, high, low, close, volume))
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(value.get(..10)?, DATE_FORMAT).ok())
}

fn parse_price(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_volume(value: &str) -> Option<u64> {
    if value.is_empty() {
        return Some(0);
    }
    if let Ok(volume) = value.parse::<u64>() {
        return Some(volume);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64)
}

/// Parse CSV text with a header row into daily bars.
///
/// A payload without data rows parses successfully with `records == 0`,
/// whatever its header looks like; a payload with data rows but without one
/// of the required columns is an error.
pub fn parse_bars(text: &str) -> Result<ParsedBars, CodecError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let columns = Columns::locate(reader.headers()?);
    let mut parsed = ParsedBars::default();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        parsed.records += 1;

        let columns = columns.map_err(CodecError::MissingColumn)?;
        match columns.parse(&record) {
            Some(bar) => parsed.bars.push(bar),
            None => parsed.rejected += 1,
        }
    }

    Ok(parsed)
}

/// Serialize bars, in the given order, as CSV text with the standard header.
pub fn write_bars(bars: &[DailyBar]) -> Result<String, CodecError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for bar in bars {
        writer.write_record(&[
            bar.date.format(DATE_FORMAT).to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| CodecError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
