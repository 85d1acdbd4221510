//! Rate engine configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CACHE_KEY;
use crate::provider::DEFAULT_API_URL;

/// Configuration for fetching and caching rates.
#[derive(Debug, Clone)]
pub struct FxConfig {
    /// Latest-rates endpoint quoting against KRW.
    pub api_url: String,
    /// Directory holding the rate cache file.
    pub cache_dir: PathBuf,
    /// Key of the cached entry.
    pub cache_key: String,
    /// Age after which cached rates are refreshed in the background.
    pub refresh_interval: Duration,
    /// Timeout for a single rate request.
    pub request_timeout: Duration,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_dir: PathBuf::from(".cardfx"),
            cache_key: CACHE_KEY.to_string(),
            refresh_interval: Duration::from_secs(60 * 60),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl FxConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CARDFX_API_URL") {
            config.api_url = url;
        }

        if let Ok(dir) = std::env::var("CARDFX_CACHE_DIR") {
            config.cache_dir = PathBuf::from(dir);
        }

        if let Ok(secs) = std::env::var("CARDFX_REFRESH_INTERVAL_SECS") {
            if let Ok(secs) = secs.parse() {
                config.refresh_interval = Duration::from_secs(secs);
            }
        }

        if let Ok(secs) = std::env::var("CARDFX_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    /// Refresh interval in milliseconds, as compared against cache timestamps.
    pub fn refresh_interval_ms(&self) -> i64 {
        i64::try_from(self.refresh_interval.as_millis()).unwrap_or(i64::MAX)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_url.is_empty() {
            return Err("API URL cannot be empty".to_string());
        }

        if self.cache_key.is_empty() {
            return Err("Cache key cannot be empty".to_string());
        }

        if self.refresh_interval.is_zero() {
            return Err("Refresh interval cannot be zero".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }
}
