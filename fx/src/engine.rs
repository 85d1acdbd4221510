//! Rate provider: owns the in-memory rate set and decides how it is refreshed.
//!
//! On startup the provider prefers the cached entry. A stale entry is shown
//! immediately and refreshed by a background fetch, whose failures are
//! silent. Without a cached entry a foreground fetch runs; when it fails and
//! nothing is loaded yet, approximate rates are shown instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cardfx_common::{now_millis, EpochMillis, ExchangeRateSet};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::cache::{is_stale, CachedRates, FileStore, RateCache};
use crate::config::FxConfig;
use crate::conversion::{compute, ConversionRequest, ConversionResult, ValidationError};
use crate::display::FETCH_FAILED_ALERT;
use crate::error::{FxError, FxResult};
use crate::provider::{OpenErApiSource, Quotes, RateSource};

/// Where the current rates came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateStamp {
    /// Fetched from the rate source at the given epoch milliseconds.
    Fetched(EpochMillis),
    /// Fallback estimates after a failed fetch.
    Estimated,
}

/// Receives rate updates and user-facing notices.
pub trait RateListener: Send + Sync {
    /// New rates are in memory.
    fn on_rates_updated(&self, rates: &ExchangeRateSet, stamp: &RateStamp);

    /// A foreground fetch started (`true`) or finished (`false`).
    fn on_loading(&self, _loading: bool) {}

    /// A failure the user should see.
    fn on_alert(&self, _message: &str) {}
}

/// Listener that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl RateListener for NoopListener {
    fn on_rates_updated(&self, _rates: &ExchangeRateSet, _stamp: &RateStamp) {}
}

/// How a fetch reports to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Blocking from the user's view: loading indicator and failure alert.
    Foreground,
    /// Silent refresh of rates that are already displayed.
    Background,
}

/// Result of a fetch attempt.
#[derive(Debug)]
pub enum FetchOutcome {
    /// New rates were loaded, cached and published.
    Updated(ExchangeRateSet),
    /// Another fetch was running; nothing was requested.
    AlreadyInFlight,
    /// Background fetch failed; current rates were kept.
    Suppressed(FxError),
    /// Foreground fetch failed with nothing loaded; estimates were published.
    UsingEstimates(FxError),
    /// Foreground fetch failed; previously loaded rates were kept.
    Failed(FxError),
}

impl FetchOutcome {
    /// Check whether fresh rates were loaded.
    pub fn is_updated(&self) -> bool {
        matches!(self, FetchOutcome::Updated(_))
    }

    /// Get the fetch error, if the fetch failed.
    pub fn error(&self) -> Option<&FxError> {
        match self {
            FetchOutcome::Suppressed(e)
            | FetchOutcome::UsingEstimates(e)
            | FetchOutcome::Failed(e) => Some(e),
            FetchOutcome::Updated(_) | FetchOutcome::AlreadyInFlight => None,
        }
    }
}

/// How the provider came up.
#[derive(Debug)]
pub enum Startup {
    /// Cached rates were published. `refresh` holds the background fetch
    /// spawned because they were stale.
    Cached {
        refresh: Option<JoinHandle<FetchOutcome>>,
    },
    /// No usable cache; a foreground fetch ran.
    Fetched(FetchOutcome),
}

/// Provider lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    /// No rates loaded.
    Uninitialized,
    /// Rates fetched within the refresh interval.
    Fresh,
    /// Rates older than the refresh interval, or estimates.
    Stale,
}

#[derive(Debug, Clone, Copy, Default)]
struct Snapshot {
    rates: ExchangeRateSet,
    stamp: Option<RateStamp>,
}

struct Inner {
    source: Arc<dyn RateSource>,
    cache: RateCache,
    listener: Arc<dyn RateListener>,
    refresh_interval_ms: i64,
    snapshot: RwLock<Snapshot>,
    fetching: AtomicBool,
}

/// Holds the current exchange rates and refreshes them.
///
/// Cloning is cheap and yields a handle to the same state.
#[derive(Clone)]
pub struct RateProvider {
    inner: Arc<Inner>,
}

impl RateProvider {
    /// Create a provider with nothing loaded.
    pub fn new(
        source: Arc<dyn RateSource>,
        cache: RateCache,
        listener: Arc<dyn RateListener>,
        refresh_interval_ms: i64,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache,
                listener,
                refresh_interval_ms,
                snapshot: RwLock::new(Snapshot::default()),
                fetching: AtomicBool::new(false),
            }),
        }
    }

    /// Create a provider for the live rate API with a file-backed cache.
    pub fn from_config(config: &FxConfig, listener: Arc<dyn RateListener>) -> FxResult<Self> {
        let source = Arc::new(OpenErApiSource::new(
            config.api_url.clone(),
            config.request_timeout,
        )?);
        let store = Arc::new(FileStore::new(config.cache_dir.clone()));
        let cache = RateCache::with_key(store, config.cache_key.clone());

        Ok(Self::new(
            source,
            cache,
            listener,
            config.refresh_interval_ms(),
        ))
    }

    /// Load rates at startup.
    ///
    /// Cached rates are published right away; if stale, one background
    /// fetch is spawned on the current tokio runtime. Without a cache
    /// entry a foreground fetch is awaited.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Startup {
        let Some(cached) = self.load_cached() else {
            info!("No cached rates, fetching");
            return Startup::Fetched(self.fetch(FetchMode::Foreground).await);
        };

        let now = now_millis();
        let refresh = if cached.is_stale(now, self.inner.refresh_interval_ms) {
            info!(
                age_ms = now - cached.timestamp,
                "Cached rates are stale, refreshing in background"
            );
            let provider = self.clone();
            Some(tokio::spawn(async move {
                provider.fetch(FetchMode::Background).await
            }))
        } else {
            debug!("Cached rates are fresh");
            None
        };

        Startup::Cached { refresh }
    }

    /// Publish the cached entry, if any, without fetching.
    pub fn load_cached(&self) -> Option<CachedRates> {
        let cached = self.inner.cache.load()?;
        self.publish(cached.rates, RateStamp::Fetched(cached.timestamp));
        Some(cached)
    }

    /// Fetch current rates from the source.
    ///
    /// Only currencies the source quotes are replaced. At most one fetch
    /// runs at a time; a concurrent call returns
    /// [`FetchOutcome::AlreadyInFlight`].
    #[instrument(skip(self))]
    pub async fn fetch(&self, mode: FetchMode) -> FetchOutcome {
        let Some(_in_flight) = InFlightGuard::acquire(&self.inner.fetching) else {
            debug!("Fetch already in flight");
            return FetchOutcome::AlreadyInFlight;
        };

        let loading = match mode {
            FetchMode::Foreground => Some(LoadingGuard::show(self.inner.listener.as_ref())),
            FetchMode::Background => None,
        };
        let result = self.inner.source.fetch_quotes().await;
        drop(loading);

        match result {
            Ok(quotes) => self.apply_quotes(&quotes),
            Err(err) => self.handle_failure(mode, err),
        }
    }

    /// Current in-memory rates.
    pub fn rates(&self) -> ExchangeRateSet {
        self.inner.snapshot.read().rates
    }

    /// Origin of the current rates, `None` before anything is loaded.
    pub fn stamp(&self) -> Option<RateStamp> {
        self.inner.snapshot.read().stamp
    }

    /// Lifecycle state as of `now`.
    pub fn state(&self, now: EpochMillis) -> ProviderState {
        match self.stamp() {
            None => ProviderState::Uninitialized,
            Some(RateStamp::Fetched(ts)) if !is_stale(ts, now, self.inner.refresh_interval_ms) => {
                ProviderState::Fresh
            }
            Some(_) => ProviderState::Stale,
        }
    }

    /// Check whether a fetch is running.
    pub fn is_fetching(&self) -> bool {
        self.inner.fetching.load(Ordering::Acquire)
    }

    /// Price a purchase with the current rates.
    pub fn calculate(
        &self,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ValidationError> {
        compute(request, &self.rates())
    }

    fn publish(&self, rates: ExchangeRateSet, stamp: RateStamp) {
        *self.inner.snapshot.write() = Snapshot {
            rates,
            stamp: Some(stamp),
        };
        self.inner.listener.on_rates_updated(&rates, &stamp);
    }

    fn apply_quotes(&self, quotes: &Quotes) -> FetchOutcome {
        let now = now_millis();
        let rates = self
            .rates()
            .merged_with(quotes.iter().map(|(currency, quote)| (*currency, 1.0 / quote)));

        info!(
            source = self.inner.source.name(),
            quoted = quotes.len(),
            rates = ?rates,
            "Exchange rates updated"
        );

        self.publish(rates, RateStamp::Fetched(now));

        if let Err(e) = self.inner.cache.save(&rates, now) {
            warn!(error = %e, "Failed to cache exchange rates");
        }

        FetchOutcome::Updated(rates)
    }

    fn handle_failure(&self, mode: FetchMode, err: FxError) -> FetchOutcome {
        if mode == FetchMode::Background {
            warn!(error = %err, "Background rate refresh failed, keeping current rates");
            return FetchOutcome::Suppressed(err);
        }

        warn!(error = %err, retryable = err.is_retryable(), "Failed to fetch exchange rates");

        let outcome = if self.rates().is_unset() {
            info!("Using estimated exchange rates");
            self.publish(ExchangeRateSet::fallback(), RateStamp::Estimated);
            FetchOutcome::UsingEstimates(err)
        } else {
            FetchOutcome::Failed(err)
        };

        self.inner.listener.on_alert(FETCH_FAILED_ALERT);
        outcome
    }
}

/// Marks a fetch as in flight until dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shows the loading indicator until dropped.
struct LoadingGuard<'a>(&'a dyn RateListener);

impl<'a> LoadingGuard<'a> {
    fn show(listener: &'a dyn RateListener) -> Self {
        listener.on_loading(true);
        Self(listener)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.on_loading(false);
    }
}
