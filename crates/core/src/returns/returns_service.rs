use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::daily_changes::{daily_changes, DailyChangeQuery, DailyChangeReport};
use super::returns_calculator::{daily_returns, monthly_returns};
use super::returns_formatter::{format_daily, format_monthly};
use super::returns_model::{FormattedDailyReturns, FormattedMonthlyReturns};
use super::returns_traits::ReturnsServiceTrait;
use crate::errors::Result;
use crate::loader::DataLoader;
use crate::ticker::{cache_key, normalize_ticker};
use returns_calendar_market_data::DailyBar;

/// Resolves the ticker, loads its history and shapes the returns.
pub struct ReturnsService {
    loader: Arc<DataLoader>,
    default_ticker: String,
}

impl ReturnsService {
    pub fn new(loader: Arc<DataLoader>, default_ticker: impl Into<String>) -> Self {
        Self {
            loader,
            default_ticker: default_ticker.into(),
        }
    }

    /// Load bars and return them with the uppercased ticker.
    async fn load(&self, ticker: Option<&str>, refresh: bool) -> Result<(String, Vec<DailyBar>)> {
        let ticker = normalize_ticker(ticker, &self.default_ticker)?;
        let bars = self.loader.load(&ticker, refresh).await?;
        debug!("Loaded {} bars for {}", bars.len(), ticker);
        Ok((cache_key(&ticker), bars))
    }
}

#[async_trait]
impl ReturnsServiceTrait for ReturnsService {
    fn default_ticker(&self) -> &str {
        &self.default_ticker
    }

    async fn get_monthly_returns(
        &self,
        ticker: Option<&str>,
        refresh: bool,
    ) -> Result<FormattedMonthlyReturns> {
        let (ticker, bars) = self.load(ticker, refresh).await?;
        Ok(format_monthly(&monthly_returns(&bars), &ticker))
    }

    async fn get_daily_returns(
        &self,
        ticker: Option<&str>,
        refresh: bool,
    ) -> Result<FormattedDailyReturns> {
        let (ticker, bars) = self.load(ticker, refresh).await?;
        Ok(format_daily(&daily_returns(&bars), &ticker))
    }

    async fn get_daily_changes(
        &self,
        ticker: Option<&str>,
        refresh: bool,
        query: DailyChangeQuery,
    ) -> Result<DailyChangeReport> {
        // Reject a bad window before touching the network
        query.validate()?;
        let (ticker, bars) = self.load(ticker, refresh).await?;
        daily_changes(&bars, &ticker, &query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FileCacheStore;
    use crate::errors::Error;
    use crate::returns::MonthName;
    use chrono::NaiveDate;
    use returns_calendar_market_data::{MarketDataError, QuoteSource};
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct StaticSource {
        bars: Vec<DailyBar>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl QuoteSource for StaticSource {
        fn id(&self) -> &'static str {
            "STATIC"
        }

        async fn fetch_daily_bars(
            &self,
            ticker: &str,
        ) -> std::result::Result<Vec<DailyBar>, MarketDataError> {
            self.calls.lock().unwrap().push(ticker.to_string());
            Ok(self.bars.clone())
        }
    }

    fn bar(m: u32, d: u32, close: f64) -> DailyBar {
        DailyBar::from_close(NaiveDate::from_ymd_opt(2024, m, d).unwrap(), close)
    }

    fn service(source: Arc<StaticSource>, dir: &std::path::Path) -> ReturnsService {
        let store = Arc::new(FileCacheStore::new(dir, "TSLA"));
        let loader = Arc::new(DataLoader::new(source, store));
        ReturnsService::new(loader, "TSLA")
    }

    #[tokio::test]
    async fn test_monthly_returns_use_default_ticker() {
        let tmp = tempdir().unwrap();
        let source = Arc::new(StaticSource {
            bars: vec![bar(1, 2, 100.0), bar(1, 31, 110.0), bar(2, 1, 110.0), bar(2, 29, 104.5)],
            ..Default::default()
        });
        let svc = service(source.clone(), tmp.path());

        let out = svc.get_monthly_returns(None, false).await.unwrap();
        assert_eq!(out.ticker, "TSLA");
        assert_eq!(out.years, vec![2024]);
        let total = out.data.total()[0].unwrap();
        assert!((total - 4.5).abs() < 1e-9);
        assert_eq!(source.calls.lock().unwrap().as_slice(), ["TSLA"]);
    }

    #[tokio::test]
    async fn test_daily_returns_uppercase_ticker() {
        let tmp = tempdir().unwrap();
        let source = Arc::new(StaticSource {
            bars: vec![bar(3, 1, 10.0), bar(3, 4, 11.0)],
            ..Default::default()
        });
        let svc = service(source.clone(), tmp.path());

        let out = svc.get_daily_returns(Some(" aapl "), false).await.unwrap();
        assert_eq!(out.ticker, "AAPL");
        let march = &out.data[&2024][&MonthName::Mar];
        assert_eq!(march.len(), 31);
        assert!(march[3].is_some());
        assert_eq!(source.calls.lock().unwrap().as_slice(), ["aapl"]);
    }

    #[tokio::test]
    async fn test_invalid_ticker_never_loads() {
        let tmp = tempdir().unwrap();
        let source = Arc::new(StaticSource::default());
        let svc = service(source.clone(), tmp.path());

        let err = svc.get_monthly_returns(Some("../../etc"), false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidTicker(_)));
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_daily_changes_validates_before_loading() {
        let tmp = tempdir().unwrap();
        let source = Arc::new(StaticSource::default());
        let svc = service(source.clone(), tmp.path());

        let query = DailyChangeQuery {
            start: NaiveDate::from_ymd_opt(2024, 5, 1),
            end: NaiveDate::from_ymd_opt(2024, 4, 1),
            ..Default::default()
        };
        let err = svc.get_daily_changes(None, false, query).await.unwrap_err();
        assert!(err.is_validation());
        assert!(source.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_daily_changes_report() {
        let tmp = tempdir().unwrap();
        let source = Arc::new(StaticSource {
            bars: vec![bar(5, 1, 100.0), bar(5, 2, 115.0), bar(5, 3, 92.0)],
            ..Default::default()
        });
        let svc = service(source, tmp.path());

        let report = svc
            .get_daily_changes(Some("tsla"), false, DailyChangeQuery::default())
            .await
            .unwrap();
        assert_eq!(report.ticker, "TSLA");
        assert_eq!(report.changes.len(), 2);
        assert_eq!(report.days_above, 1);
        assert_eq!(report.days_below, 1);
    }
}
