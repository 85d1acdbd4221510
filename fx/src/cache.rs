//! Persistent rate cache with read-time staleness checks.
//!
//! The cache holds a single entry under a fixed key. It is overwritten on
//! every successful fetch and never expired by deletion: whether the entry
//! is too old is decided by [`is_stale`] when it is read.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cardfx_common::{EpochMillis, ExchangeRateSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{FxError, FxResult};

/// Storage key of the cached rate entry.
pub const CACHE_KEY: &str = "exchange_rates_cache";

/// Key-value storage backing the rate cache.
pub trait CacheStore: Send + Sync {
    /// Read the value stored under `key`, or `None` when nothing is stored.
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn write(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Stores each key as a JSON file in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the cache files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for FileStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing the cache encoding.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.entries.lock().insert(key.to_string(), value.into());
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A persisted rate set with the time it was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedRates {
    /// Rates as KRW per unit of foreign currency.
    pub rates: ExchangeRateSet,
    /// Fetch time in epoch milliseconds.
    pub timestamp: EpochMillis,
}

impl CachedRates {
    /// Check whether this entry is older than the refresh interval.
    pub fn is_stale(&self, now: EpochMillis, refresh_interval_ms: i64) -> bool {
        is_stale(self.timestamp, now, refresh_interval_ms)
    }
}

/// True iff more than `refresh_interval_ms` has elapsed since `timestamp`.
///
/// An age exactly equal to the interval is still fresh.
pub fn is_stale(timestamp: EpochMillis, now: EpochMillis, refresh_interval_ms: i64) -> bool {
    now.saturating_sub(timestamp) > refresh_interval_ms
}

/// Rate cache over a [`CacheStore`].
#[derive(Clone)]
pub struct RateCache {
    store: Arc<dyn CacheStore>,
    key: String,
}

impl RateCache {
    /// Create a cache using the default key.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_key(store, CACHE_KEY)
    }

    /// Create a cache using a custom key.
    pub fn with_key(store: Arc<dyn CacheStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Load the cached entry.
    ///
    /// Missing, unreadable or malformed entries all yield `None`.
    pub fn load(&self) -> Option<CachedRates> {
        let raw = match self.store.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        let cached: CachedRates = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Malformed cache entry, treating as miss");
                return None;
            }
        };

        let malformed = cached
            .rates
            .iter()
            .any(|(_, rate)| !rate.is_finite() || rate < 0.0);
        if malformed || cached.rates.is_unset() {
            warn!(key = %self.key, "Cache entry holds no usable rates, treating as miss");
            return None;
        }

        debug!(key = %self.key, timestamp = cached.timestamp, "Cache hit");
        Some(cached)
    }

    /// Persist a rate set with its fetch time, replacing any previous entry.
    pub fn save(&self, rates: &ExchangeRateSet, timestamp: EpochMillis) -> FxResult<()> {
        let entry = CachedRates {
            rates: *rates,
            timestamp,
        };
        let encoded = serde_json::to_string(&entry)?;
        self.store
            .write(&self.key, &encoded)
            .map_err(|e| FxError::CacheWrite(e.to_string()))?;

        debug!(key = %self.key, timestamp, "Rates cached");
        Ok(())
    }
}
