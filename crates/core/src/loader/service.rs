use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use log::{debug, info, warn};
use returns_calendar_market_data::{DailyBar, QuoteSource};
use tokio::sync::Mutex;

use crate::cache::CacheStore;
use crate::constants::DEFAULT_MAX_CACHE_AGE;
use crate::errors::{CacheError, CorruptReason, Error, Result};
use crate::ticker::cache_key;

/// Loads the daily history of a ticker, refreshing the cache when needed.
///
/// Loads of the same ticker are serialized; different tickers load
/// concurrently.
pub struct DataLoader {
    source: Arc<dyn QuoteSource>,
    cache: Arc<dyn CacheStore>,
    max_age: Duration,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DataLoader {
    pub fn new(source: Arc<dyn QuoteSource>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            source,
            cache,
            max_age: DEFAULT_MAX_CACHE_AGE,
            locks: DashMap::new(),
        }
    }

    /// Override how long a refresh stays fresh.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Return the daily bars for `ticker`, sorted by date.
    ///
    /// The remote source is consulted when `force_refresh` is set, when the
    /// ticker has no cache file or when its last refresh is too old. A failed
    /// or empty remote answer falls back to the cache when one exists.
    /// Whenever cached rows are served without `force_refresh` they are
    /// topped up with any newer remote rows.
    pub async fn load(&self, ticker: &str, force_refresh: bool) -> Result<Vec<DailyBar>> {
        let key = cache_key(ticker);
        let lock = self.lock_for(&key);
        let result = {
            let _guard = lock.lock().await;
            self.load_locked(ticker, &key, force_refresh).await
        };
        drop(lock);
        // Only the map still holds the lock when no other load is waiting on it
        self.locks.remove_if(&key, |_, entry| Arc::strong_count(entry) == 1);
        result
    }

    async fn load_locked(
        &self,
        ticker: &str,
        key: &str,
        force_refresh: bool,
    ) -> Result<Vec<DailyBar>> {
        let cached = self.cache.exists(key).await;
        let attempt_remote = force_refresh || !cached || self.is_stale(key).await;

        if attempt_remote {
            debug!(
                "Fetching {} from {} (refresh={}, cached={})",
                ticker,
                self.source.id(),
                force_refresh,
                cached
            );
            match self.source.fetch_daily_bars(ticker).await {
                Ok(bars) if !bars.is_empty() => {
                    let bars = sort_and_dedup(bars);
                    self.persist(key, &bars).await;
                    return Ok(bars);
                }
                Ok(_) => {
                    if !cached {
                        return Err(Error::NoDataFound(key.to_string()));
                    }
                    warn!("{} returned no rows for {}, using cache", self.source.id(), key);
                }
                Err(e) => {
                    if !cached {
                        return Err(e.into());
                    }
                    warn!("Remote fetch failed for {}, using cache: {}", key, e);
                }
            }
        }

        let bars = self.read_cache(key).await?;
        if force_refresh {
            return Ok(bars);
        }
        Ok(self.top_up(ticker, key, bars).await)
    }

    /// Number of tickers with a load in flight.
    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.len()
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.entry(key.to_string()).or_default().value().clone()
    }

    async fn is_stale(&self, key: &str) -> bool {
        match self.cache.is_stale(key, self.max_age).await {
            Ok(stale) => stale,
            Err(e) => {
                warn!("Could not read refresh time for {}, treating as stale: {}", key, e);
                true
            }
        }
    }

    async fn read_cache(&self, key: &str) -> Result<Vec<DailyBar>> {
        self.cache.read(key).await.map_err(|e| match e {
            CacheError::Missing(_) => Error::NoCachedData(key.to_string()),
            CacheError::Corrupt {
                reason: CorruptReason::NoDataRows,
                ..
            } => Error::EmptyCache(key.to_string()),
            CacheError::Corrupt {
                reason: CorruptReason::NoUsableRows,
                ..
            } => Error::InvalidCache(key.to_string()),
            other => Error::Cache(other),
        })
    }

    /// Append remote rows newer than the cached ones. Never fails: remote
    /// errors leave the cached rows untouched.
    async fn top_up(&self, ticker: &str, key: &str, cached: Vec<DailyBar>) -> Vec<DailyBar> {
        let Some(latest) = cached.iter().map(|bar| bar.date).max() else {
            return cached;
        };

        let fetched = match self.source.fetch_daily_bars(ticker).await {
            Ok(bars) => bars,
            Err(e) => {
                warn!("Top-up for {} failed, serving cached rows: {}", key, e);
                return cached;
            }
        };

        let newer: Vec<DailyBar> = fetched.into_iter().filter(|bar| bar.date > latest).collect();
        if newer.is_empty() {
            return cached;
        }

        info!("Appending {} new rows to cached {}", newer.len(), key);
        let mut merged = cached;
        merged.extend(newer);
        let merged = sort_and_dedup(merged);
        self.persist(key, &merged).await;
        merged
    }

    /// Write the rows and record the refresh. Failures are logged only; the
    /// caller still gets the rows it already holds.
    async fn persist(&self, key: &str, bars: &[DailyBar]) {
        if let Err(e) = self.cache.write(key, bars).await {
            warn!("Failed to write cache for {}: {}", key, e);
            return;
        }
        let now = Utc::now().timestamp_millis();
        if let Err(e) = self.cache.set_refresh_timestamp(key, now).await {
            warn!("Failed to record refresh time for {}: {}", key, e);
        }
    }
}

/// Sort bars by date and keep one bar per date, the later occurrence winning.
pub fn sort_and_dedup(mut bars: Vec<DailyBar>) -> Vec<DailyBar> {
    bars.sort_by_key(|bar| bar.date);
    let mut out: Vec<DailyBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}
