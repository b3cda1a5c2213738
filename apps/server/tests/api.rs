use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use returns_calendar_market_data::{DailyBar, MarketDataError, QuoteSource};
use returns_calendar_server::{api::app_router, build_state_with_source, config::Config};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

struct FixedSource(Vec<DailyBar>);

#[async_trait]
impl QuoteSource for FixedSource {
    fn id(&self) -> &'static str {
        "FIXED"
    }

    async fn fetch_daily_bars(&self, ticker: &str) -> Result<Vec<DailyBar>, MarketDataError> {
        if self.0.is_empty() {
            return Err(MarketDataError::NoDataAvailable {
                ticker: ticker.to_string(),
            });
        }
        Ok(self.0.clone())
    }
}

fn bar(y: i32, m: u32, d: u32, close: f64) -> DailyBar {
    DailyBar::from_close(NaiveDate::from_ymd_opt(y, m, d).unwrap(), close)
}

fn sample_bars() -> Vec<DailyBar> {
    vec![
        bar(2023, 12, 1, 50.0),
        bar(2023, 12, 29, 55.0),
        bar(2024, 1, 2, 100.0),
        bar(2024, 1, 31, 110.0),
        bar(2024, 2, 1, 110.0),
        bar(2024, 2, 29, 104.5),
    ]
}

fn test_config(dir: &TempDir) -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        cache_dir: dir.path().join("data"),
        quote_url: "http://127.0.0.1:9/{ticker}".to_string(),
        default_ticker: "TSLA".to_string(),
        cache_max_age: Duration::from_secs(3600),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(10),
        static_dir: dir.path().join("public").display().to_string(),
    }
}

async fn build_test_router(dir: &TempDir, bars: Vec<DailyBar>) -> Router {
    let config = test_config(dir);
    let state = build_state_with_source(&config, Arc::new(FixedSource(bars)))
        .await
        .unwrap();
    app_router(state, &config)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::body::Bytes) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn healthz_works_and_sets_request_id() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, sample_bars()).await;

    let response = app
        .oneshot(Request::builder().uri("/api/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body, "ok".as_bytes());
}

#[tokio::test]
async fn server_time_is_rfc3339() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, sample_bars()).await;

    let (status, json) = get_json(&app, "/api/test").await;
    assert_eq!(status, StatusCode::OK);
    let text = json.as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(text).is_ok());
}

#[tokio::test]
async fn monthly_returns_for_requested_ticker() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, sample_bars()).await;

    let (status, json) = get_json(&app, "/api/monthly-returns?ticker=aapl&refresh=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ticker"], "AAPL");
    assert_eq!(json["years"], serde_json::json!([2023, 2024]));

    let jan = json["data"]["Jan"].as_array().unwrap();
    assert!(jan[0].is_null());
    assert!((jan[1].as_f64().unwrap() - 10.0).abs() < 1e-9);
    let total_2024 = json["data"]["Total"][1].as_f64().unwrap();
    assert!((total_2024 - 4.5).abs() < 1e-9);

    // The fetched history is cached and served under /data
    assert!(tmp.path().join("data").join("AAPL_daily.csv").exists());
    let (status, csv) = get(&app, "/data/AAPL_daily.csv").await;
    assert_eq!(status, StatusCode::OK);
    assert!(csv.starts_with(b"Date,Open,High,Low,Close,Volume"));
}

#[tokio::test]
async fn daily_returns_default_ticker() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, sample_bars()).await;

    let (status, json) = get_json(&app, "/api/daily-returns").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ticker"], "TSLA");

    let feb = json["data"]["2024"]["Feb"].as_array().unwrap();
    assert_eq!(feb.len(), 29);
    assert_eq!(feb[28]["weekday"], 4);
    assert!((feb[28]["return"].as_f64().unwrap() + 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn daily_changes_with_window_and_order() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, sample_bars()).await;

    let (status, json) = get_json(
        &app,
        "/api/daily-changes?start=2024-01-01&end=2024-02-29&order=desc&high=5&low=-4",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["start"], "2024-01-01");
    assert_eq!(json["end"], "2024-02-29");
    assert_eq!(json["changes"].as_array().unwrap().len(), 3);
    assert_eq!(json["changes"][0]["date"], "2024-01-31");
    assert_eq!(json["daysAbove"], 1);
    assert_eq!(json["daysBelow"], 1);
}

#[tokio::test]
async fn invalid_ticker_is_bad_request() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, sample_bars()).await;

    let (status, json) = get_json(&app, "/api/monthly-returns?ticker=..%2Fsecret").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid ticker: ../secret");
}

#[tokio::test]
async fn reversed_window_is_bad_request() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, sample_bars()).await;

    let (status, json) =
        get_json(&app, "/api/daily-changes?start=2024-03-01&end=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid date range"));
}

#[tokio::test]
async fn upstream_failure_without_cache_is_server_error() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, Vec::new()).await;

    let (status, json) = get_json(&app, "/api/daily-returns?ticker=ZZZZ").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "No data available for ZZZZ");
}

#[tokio::test]
async fn serves_index_html_for_unknown_route() {
    let tmp = tempdir().unwrap();
    let static_dir = tmp.path().join("public");
    std::fs::create_dir_all(&static_dir).unwrap();
    let index_path = static_dir.join("index.html");
    std::fs::write(&index_path, "<html>SPA</html>").unwrap();

    let static_service = ServeDir::new(&static_dir).fallback(ServeFile::new(index_path));
    let app = build_test_router(&tmp, sample_bars())
        .await
        .fallback_service(static_service);

    let (status, body) = get(&app, "/daily").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<html>SPA</html>".as_bytes());

    let (status, json) = get_json(&app, "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
}

#[tokio::test]
async fn request_id_is_echoed_when_supplied() {
    let tmp = tempdir().unwrap();
    let app = build_test_router(&tmp, sample_bars()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/readyz")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}
