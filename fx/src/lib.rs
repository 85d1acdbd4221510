//! cardfx Rate Engine
//!
//! Exchange rate caching, refresh policy and card fee calculation for
//! estimating the KRW cost of a foreign-currency card purchase.
//!
//! # Features
//!
//! - Single-entry persistent rate cache with read-time staleness checks
//! - Foreground and silent background refresh from a remote rate source
//! - Fallback estimates when no rates can be loaded
//! - Card issuer and foreign-transaction fee breakdown
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cardfx_fx::{ConversionRequest, FxConfig, NoopListener, RateProvider};
//!
//! let provider = RateProvider::from_config(&FxConfig::from_env(), Arc::new(NoopListener))?;
//! provider.initialize().await;
//!
//! let request = ConversionRequest::parse("100", "USD", "kb")?;
//! let result = provider.calculate(&request)?;
//! ```

pub mod cache;
pub mod config;
pub mod conversion;
pub mod display;
pub mod engine;
pub mod error;
pub mod provider;

pub use cache::{is_stale, CacheStore, CachedRates, FileStore, MemoryStore, RateCache};
pub use config::FxConfig;
pub use conversion::{compute, ConversionRequest, ConversionResult, ValidationError};
pub use display::ConversionDisplay;
pub use engine::{
    FetchMode, FetchOutcome, NoopListener, ProviderState, RateListener, RateProvider, RateStamp,
    Startup,
};
pub use error::{FxError, FxResult};
pub use provider::{OpenErApiSource, Quotes, RateSource};
