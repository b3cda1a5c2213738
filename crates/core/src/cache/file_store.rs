use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, warn};
use returns_calendar_market_data::{parse_bars, write_bars, DailyBar};
use tokio::fs;
use tokio::sync::Mutex;

use super::metadata::RefreshMetadata;
use super::store::CacheStore;
use crate::constants::{CACHE_FILE_SUFFIX, METADATA_FILE_NAME};
use crate::errors::{CacheError, CorruptReason};

/// Cache store keeping one CSV file per ticker and a shared `metadata.json`
/// inside a single directory.
///
/// The directory and the metadata file are created on first use. Every file
/// is written to a temporary sibling and renamed into place.
pub struct FileCacheStore {
    dir: PathBuf,
    default_ticker: String,
    metadata_lock: Mutex<()>,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>, default_ticker: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            default_ticker: default_ticker.into().to_uppercase(),
            metadata_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the history file for a cache key.
    pub fn data_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}{}", ticker, CACHE_FILE_SUFFIX))
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE_NAME)
    }

    /// Create the cache directory and the initial metadata file if missing.
    pub async fn initialize(&self) -> Result<(), CacheError> {
        let _guard = self.metadata_lock.lock().await;
        self.ensure_initialized().await
    }

    /// Caller must hold `metadata_lock`.
    async fn ensure_initialized(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let path = self.metadata_path();
        if !path_exists(&path).await {
            debug!("Creating cache metadata at {}", path.display());
            let initial = RefreshMetadata::initial(&self.default_ticker);
            let json = serde_json::to_vec_pretty(&initial)?;
            write_atomic(&path, &json).await?;
        }
        Ok(())
    }

    /// Caller must hold `metadata_lock`.
    async fn load_metadata(&self) -> Result<RefreshMetadata, CacheError> {
        self.ensure_initialized().await?;
        let path = self.metadata_path();
        let bytes = fs::read(&path).await.map_err(|e| io_error(&path, e))?;
        match serde_json::from_slice(&bytes) {
            Ok(metadata) => Ok(metadata),
            Err(e) => {
                warn!(
                    "Ignoring unreadable cache metadata {}: {}",
                    path.display(),
                    e
                );
                Ok(RefreshMetadata::initial(&self.default_ticker))
            }
        }
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn exists(&self, ticker: &str) -> bool {
        path_exists(&self.data_path(ticker)).await
    }

    async fn read(&self, ticker: &str) -> Result<Vec<DailyBar>, CacheError> {
        let path = self.data_path(ticker);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CacheError::Missing(ticker.to_string()))
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        let corrupt = |reason| CacheError::Corrupt {
            ticker: ticker.to_string(),
            reason,
        };

        let parsed = match parse_bars(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Cache file {} failed to parse: {}", path.display(), e);
                return Err(corrupt(CorruptReason::NoUsableRows));
            }
        };

        if parsed.is_empty_payload() {
            return Err(corrupt(CorruptReason::NoDataRows));
        }
        if parsed.bars.is_empty() {
            return Err(corrupt(CorruptReason::NoUsableRows));
        }
        if parsed.rejected > 0 {
            warn!(
                "Skipped {} malformed rows in {}",
                parsed.rejected,
                path.display()
            );
        }

        Ok(parsed.bars)
    }

    async fn write(&self, ticker: &str, bars: &[DailyBar]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let text = write_bars(bars)?;
        let path = self.data_path(ticker);
        write_atomic(&path, text.as_bytes()).await?;
        debug!("Wrote {} bars to {}", bars.len(), path.display());
        Ok(())
    }

    async fn refresh_timestamp(&self, ticker: &str) -> Result<Option<i64>, CacheError> {
        let _guard = self.metadata_lock.lock().await;
        Ok(self.load_metadata().await?.timestamp(ticker))
    }

    async fn set_refresh_timestamp(
        &self,
        ticker: &str,
        timestamp: i64,
    ) -> Result<(), CacheError> {
        let _guard = self.metadata_lock.lock().await;
        let mut metadata = self.load_metadata().await?;
        metadata.set_timestamp(ticker, timestamp);
        let json = serde_json::to_vec_pretty(&metadata)?;
        write_atomic(&self.metadata_path(), &json).await
    }
}

async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CacheError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)
        .await
        .map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).await.map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.display().to_string(),
        source,
    }
}
