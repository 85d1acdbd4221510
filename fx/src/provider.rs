//! Remote rate sources.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use cardfx_common::{is_valid_rate, Currency};
use serde::Deserialize;
use tracing::debug;

use crate::error::{FxError, FxResult};

/// Quoted rates as units of foreign currency per 1 KRW.
///
/// Only currencies the source actually quoted are present.
pub type Quotes = BTreeMap<Currency, f64>;

/// Trait for remote exchange rate sources.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch the latest KRW-based quotes for the supported currencies.
    async fn fetch_quotes(&self) -> FxResult<Quotes>;
}

/// Default endpoint quoting every currency against KRW.
pub const DEFAULT_API_URL: &str = "https://open.er-api.com/v6/latest/KRW";

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

/// Decode a latest-rates response body into quotes.
///
/// A response without a `rates` mapping is an error; a mapping that lacks
/// some currency, or quotes it as zero, simply leaves that currency out.
pub fn parse_quotes(body: &str) -> FxResult<Quotes> {
    let response: LatestRatesResponse =
        serde_json::from_str(body).map_err(|e| FxError::MalformedResponse(e.to_string()))?;

    if response.result.as_deref() == Some("error") {
        return Err(FxError::Provider(
            response.error_type.unwrap_or_else(|| "unknown".to_string()),
        ));
    }

    let rates = response.rates.ok_or(FxError::MissingRates)?;

    Ok(Currency::ALL
        .into_iter()
        .filter_map(|currency| {
            rates
                .get(currency.code())
                .copied()
                .filter(|quote| is_valid_rate(*quote))
                .map(|quote| (currency, quote))
        })
        .collect())
}

/// Rate source backed by the open.er-api.com latest-rates endpoint.
pub struct OpenErApiSource {
    client: reqwest::Client,
    url: String,
}

impl OpenErApiSource {
    /// Create a source for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FxError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RateSource for OpenErApiSource {
    fn name(&self) -> &str {
        "OPEN_ER_API"
    }

    async fn fetch_quotes(&self) -> FxResult<Quotes> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let quotes = parse_quotes(&body)?;

        debug!(
            source = self.name(),
            quoted = quotes.len(),
            "Received rate quotes"
        );

        Ok(quotes)
    }
}

/// Scripted rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    responses: parking_lot::Mutex<std::collections::VecDeque<FxResult<Quotes>>>,
    calls: std::sync::atomic::AtomicUsize,
    gate: Option<std::sync::Arc<tokio::sync::Notify>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    /// Create a source with no scripted responses.
    pub fn new() -> Self {
        Self {
            responses: parking_lot::Mutex::new(std::collections::VecDeque::new()),
            calls: std::sync::atomic::AtomicUsize::new(0),
            gate: None,
        }
    }

    /// Hold every fetch until the gate is notified.
    pub fn with_gate(mut self, gate: std::sync::Arc<tokio::sync::Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Queue a successful response.
    pub fn push_quotes(&self, quotes: &[(Currency, f64)]) {
        self.responses
            .lock()
            .push_back(Ok(quotes.iter().copied().collect()));
    }

    /// Queue a failing response.
    pub fn push_error(&self, err: FxError) {
        self.responses.lock().push_back(Err(err));
    }

    /// Number of fetches started so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockRateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &str {
        "MOCK"
    }

    async fn fetch_quotes(&self) -> FxResult<Quotes> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(FxError::Network("no scripted response".to_string())))
    }
}
