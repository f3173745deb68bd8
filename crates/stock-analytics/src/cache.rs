//! Caching layer for fetched payloads to reduce API calls
//!
//! Entries carry their write time so each caller can decide how old is too
//! old. Two stores are provided: [`DiskCache`] keeps one JSON file per key and
//! survives restarts, [`MemoryCache`] lives inside the process.

use async_trait::async_trait;
use cached::{Cached, TimedCache};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::{CacheBackend, StockConfig};
use crate::error::{Result, StockError};

/// A cached payload and the time it was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Seconds since the Unix epoch at write time
    pub ts: f64,
    /// The cached payload
    pub data: Value,
}

impl CacheEntry {
    /// Wrap a payload stamped with the current time
    pub fn now(data: Value) -> Self {
        Self {
            ts: now_secs(),
            data,
        }
    }

    /// Whether the entry is older than `max_age`
    pub fn is_expired(&self, max_age: Option<Duration>) -> bool {
        match max_age {
            Some(max_age) => now_secs() - self.ts > max_age.as_secs_f64(),
            None => false,
        }
    }
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Key for a cached historical series
pub fn historical_key(symbol: &str, interval: &str, outputsize: u32) -> String {
    format!("historical:{}:{interval}:{outputsize}", symbol.to_uppercase())
}

/// Key for a cached quote
pub fn quote_key(symbol: &str) -> String {
    format!("quote:{}", symbol.to_uppercase())
}

/// Key → JSON blob store with age-based expiry
///
/// Reads and writes for different keys are independent; concurrent writes to
/// the same key resolve last-writer-wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Load the payload stored under `key` unless it is older than `max_age`
    ///
    /// Expired and unreadable entries are evicted and reported as missing.
    async fn load(&self, key: &str, max_age: Option<Duration>) -> Option<Value>;

    /// Store `data` under `key`
    async fn save(&self, key: &str, data: Value) -> Result<()>;

    /// Remove every entry
    async fn clear(&self) -> Result<()>;
}

/// Build the store selected by the configuration
pub fn from_config(config: &StockConfig) -> Result<Arc<dyn CacheStore>> {
    match config.cache_backend {
        CacheBackend::Disk => Ok(Arc::new(DiskCache::new(&config.cache_dir)?)),
        CacheBackend::Memory => Ok(Arc::new(MemoryCache::new(
            config.cache_ttl_historical.max(config.cache_ttl_quote),
        ))),
    }
}

/// Thread-safe in-process cache
///
/// The `TimedCache` lifespan bounds how long any entry is retained; the
/// per-call `max_age` is checked against the stored write time.
pub struct MemoryCache {
    cache: Arc<RwLock<TimedCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Create a new cache retaining entries for at most `lifespan`
    pub fn new(lifespan: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(lifespan))),
        }
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for MemoryCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn load(&self, key: &str, max_age: Option<Duration>) -> Option<Value> {
        let mut cache = self.cache.write().await;
        let key = key.to_string();
        let entry = cache.cache_get(&key).cloned()?;

        if entry.is_expired(max_age) {
            tracing::debug!("Evicting expired cache entry: {}", key);
            let _ = cache.cache_remove(&key);
            return None;
        }

        Some(entry.data)
    }

    async fn save(&self, key: &str, data: Value) -> Result<()> {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key.to_string(), CacheEntry::now(data));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
        Ok(())
    }
}

/// File-backed cache, one JSON document per key
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

impl DiskCache {
    /// Open (and create if needed) a cache rooted at `dir`
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            StockError::CacheError(format!("cannot create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    /// The cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding the entry for `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{digest:x}.json"))
    }

    async fn evict(path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::debug!("Could not remove cache file {}: {}", path.display(), e);
        }
    }
}

#[async_trait]
impl CacheStore for DiskCache {
    async fn load(&self, key: &str, max_age: Option<Duration>) -> Option<Value> {
        let path = self.path_for(key);
        let bytes = tokio::fs::read(&path).await.ok()?;

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry for {}: {}", key, e);
                Self::evict(&path).await;
                return None;
            },
        };

        if entry.is_expired(max_age) {
            tracing::debug!("Evicting expired cache entry: {}", key);
            Self::evict(&path).await;
            return None;
        }

        Some(entry.data)
    }

    async fn save(&self, key: &str, data: Value) -> Result<()> {
        let path = self.path_for(key);
        let body = serde_json::to_vec(&CacheEntry::now(data))?;

        // Write then rename so readers never observe a half-written file.
        let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("json.{}.{seq}.tmp", std::process::id()));
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                Self::evict(&path).await;
            }
        }
        Ok(())
    }
}
