use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use returns_calendar_core::{
    errors::Error as CoreError,
    returns::{
        DailyChangeQuery, DailyChangeReport, FormattedDailyReturns, FormattedMonthlyReturns,
        SortOrder,
    },
};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};

/// `?ticker=TSLA&refresh=true`
#[derive(Debug, Default, Deserialize)]
pub struct ReturnsParams {
    pub ticker: Option<String>,
    pub refresh: Option<String>,
}

impl ReturnsParams {
    pub fn refresh(&self) -> bool {
        refresh_flag(self.refresh.as_deref())
    }
}

/// `?ticker&refresh&start&end&order&high&low`
#[derive(Debug, Default, Deserialize)]
pub struct ChangesParams {
    pub ticker: Option<String>,
    pub refresh: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub order: Option<String>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

impl ChangesParams {
    pub fn query(&self) -> Result<DailyChangeQuery, CoreError> {
        change_query(
            self.start.as_deref(),
            self.end.as_deref(),
            self.order.as_deref(),
            self.high,
            self.low,
        )
    }
}

/// Only the string `true` (any case) turns a refresh on.
pub(crate) fn refresh_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

pub(crate) fn change_query(
    start: Option<&str>,
    end: Option<&str>,
    order: Option<&str>,
    high: Option<f64>,
    low: Option<f64>,
) -> Result<DailyChangeQuery, CoreError> {
    let defaults = DailyChangeQuery::default();
    Ok(DailyChangeQuery {
        start: parse_day(start)?,
        end: parse_day(end)?,
        order: match order {
            Some(order) => order.parse()?,
            None => SortOrder::None,
        },
        high_threshold: high.unwrap_or(defaults.high_threshold),
        low_threshold: low.unwrap_or(defaults.low_threshold),
    })
}

fn parse_day(value: Option<&str>) -> Result<Option<NaiveDate>, CoreError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| CoreError::InvalidDateRange(format!("'{}' is not a YYYY-MM-DD date", v))),
    }
}

async fn get_monthly_returns(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReturnsParams>,
) -> ApiResult<Json<FormattedMonthlyReturns>> {
    let out = state
        .returns_service
        .get_monthly_returns(params.ticker.as_deref(), params.refresh())
        .await?;
    Ok(Json(out))
}

async fn get_daily_returns(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReturnsParams>,
) -> ApiResult<Json<FormattedDailyReturns>> {
    let out = state
        .returns_service
        .get_daily_returns(params.ticker.as_deref(), params.refresh())
        .await?;
    Ok(Json(out))
}

async fn get_daily_changes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChangesParams>,
) -> ApiResult<Json<DailyChangeReport>> {
    let query = params.query()?;
    let refresh = refresh_flag(params.refresh.as_deref());
    let out = state
        .returns_service
        .get_daily_changes(params.ticker.as_deref(), refresh, query)
        .await?;
    Ok(Json(out))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/monthly-returns", get(get_monthly_returns))
        .route("/daily-returns", get(get_daily_returns))
        .route("/daily-changes", get(get_daily_changes))
}
