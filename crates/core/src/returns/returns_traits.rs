use async_trait::async_trait;

use super::daily_changes::{DailyChangeQuery, DailyChangeReport};
use super::returns_model::{FormattedDailyReturns, FormattedMonthlyReturns};
use crate::errors::Result;

/// Trait for request-level return operations.
///
/// `ticker` is optional and falls back to the configured default; responses
/// carry the ticker uppercased.
#[async_trait]
pub trait ReturnsServiceTrait: Send + Sync {
    fn default_ticker(&self) -> &str;
    async fn get_monthly_returns(
        &self,
        ticker: Option<&str>,
        refresh: bool,
    ) -> Result<FormattedMonthlyReturns>;
    async fn get_daily_returns(
        &self,
        ticker: Option<&str>,
        refresh: bool,
    ) -> Result<FormattedDailyReturns>;
    async fn get_daily_changes(
        &self,
        ticker: Option<&str>,
        refresh: bool,
        query: DailyChangeQuery,
    ) -> Result<DailyChangeReport>;
}
