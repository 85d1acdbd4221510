//! Startup scenarios against a file-backed cache, one provider per "session".

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cardfx_common::{now_millis, CardIssuer, Currency, ExchangeRateSet};
use cardfx_fx::display::{rates_summary, stamp_label, LOAD_FAILED_MARKER};
use cardfx_fx::{
    ConversionDisplay, ConversionRequest, FetchOutcome, FileStore, FxError, FxResult,
    NoopListener, Quotes, RateCache, RateProvider, RateSource, RateStamp, Startup,
};
use parking_lot::Mutex;

const HOUR_MS: i64 = 3_600_000;

#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<VecDeque<FxResult<Quotes>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn ok(&self, quotes: &[(Currency, f64)]) {
        self.responses
            .lock()
            .push_back(Ok(quotes.iter().copied().collect()));
    }

    fn fail(&self, err: FxError) {
        self.responses.lock().push_back(Err(err));
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for ScriptedSource {
    fn name(&self) -> &str {
        "SCRIPTED"
    }

    async fn fetch_quotes(&self) -> FxResult<Quotes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Err(FxError::Network("unscripted".to_string())))
    }
}

fn session(dir: &Path, source: Arc<ScriptedSource>) -> RateProvider {
    let cache = RateCache::new(Arc::new(FileStore::new(dir)));
    RateProvider::new(source, cache, Arc::new(NoopListener), HOUR_MS)
}

fn file_cache(dir: &Path) -> RateCache {
    RateCache::new(Arc::new(FileStore::new(dir)))
}

#[tokio::test]
async fn cached_rates_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(ScriptedSource::default());
    source.ok(&[
        (Currency::Jpy, 0.1),
        (Currency::Usd, 0.0008),
        (Currency::Try, 0.025),
    ]);

    let first = session(dir.path(), source.clone());
    assert!(matches!(
        first.initialize().await,
        Startup::Fetched(FetchOutcome::Updated(_))
    ));

    let second = session(dir.path(), source.clone());
    assert!(matches!(
        second.initialize().await,
        Startup::Cached { refresh: None }
    ));

    assert_eq!(source.calls(), 1);
    assert_eq!(second.rates(), first.rates());
    assert_eq!(
        rates_summary(&second.rates()),
        "1 JPY = 10.00 원 | 1 USD = 1250.00 원 | 1 TRY = 40.00 원"
    );
}

#[tokio::test]
async fn stale_file_cache_is_refreshed_in_background() {
    let dir = tempfile::tempdir().unwrap();
    let stale_ts = now_millis() - 2 * HOUR_MS;
    file_cache(dir.path())
        .save(&ExchangeRateSet::new(9.0, 1300.0, 40.0), stale_ts)
        .unwrap();

    let source = Arc::new(ScriptedSource::default());
    source.ok(&[(Currency::Usd, 0.0008)]);

    let provider = session(dir.path(), source.clone());
    let Startup::Cached {
        refresh: Some(refresh),
    } = provider.initialize().await
    else {
        panic!("stale cache should trigger a background refresh");
    };
    assert_eq!(provider.stamp(), Some(RateStamp::Fetched(stale_ts)));

    assert!(refresh.await.unwrap().is_updated());
    assert_eq!(source.calls(), 1);

    let persisted = file_cache(dir.path()).load().unwrap();
    assert!(persisted.timestamp > stale_ts);
    assert_eq!(persisted.rates.get(Currency::Jpy), 9.0);
    assert!((persisted.rates.get(Currency::Usd) - 1250.0).abs() < 1e-9);
}

#[tokio::test]
async fn corrupt_cache_falls_back_to_foreground_fetch() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("exchange_rates_cache.json"), "{oops").unwrap();

    let source = Arc::new(ScriptedSource::default());
    source.fail(FxError::Timeout);

    let provider = session(dir.path(), source.clone());
    let startup = provider.initialize().await;

    assert!(matches!(
        startup,
        Startup::Fetched(FetchOutcome::UsingEstimates(FxError::Timeout))
    ));
    assert_eq!(provider.rates(), ExchangeRateSet::fallback());
    assert_eq!(
        stamp_label(&provider.stamp().unwrap()),
        LOAD_FAILED_MARKER
    );

    // The estimates still price a purchase.
    let request = ConversionRequest::new(100.0, Currency::Usd, CardIssuer::Kb);
    let display = ConversionDisplay::from(&provider.calculate(&request).unwrap());
    assert_eq!(display.total, "135,945 원");
}

#[tokio::test]
async fn manual_retry_after_failure_replaces_estimates() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(ScriptedSource::default());
    source.fail(FxError::HttpStatus(500));
    source.ok(&[(Currency::Jpy, 0.1)]);

    let provider = session(dir.path(), source.clone());
    provider.initialize().await;
    assert_eq!(provider.stamp(), Some(RateStamp::Estimated));

    let retry = provider.fetch(cardfx_fx::FetchMode::Foreground).await;
    assert!(retry.is_updated());

    let rates = provider.rates();
    assert!((rates.get(Currency::Jpy) - 10.0).abs() < 1e-9);
    // Currencies missing from the response keep their estimate.
    assert_eq!(rates.get(Currency::Usd), 1350.0);
    assert!(matches!(provider.stamp(), Some(RateStamp::Fetched(_))));
    assert!(file_cache(dir.path()).load().is_some());
}
