//! Subcommand implementations.
//!
//! Each command builds a [`RateProvider`] from the configuration and hands it
//! to a flow that only depends on the provider, so the flows run the same
//! against the live API and a scripted source.

use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use cardfx_common::{CardIssuer, Currency, ExchangeRateSet, FOREIGN_FEE_PERCENT};
use cardfx_fx::display::{rates_summary, validation_alert, ConversionDisplay};
use cardfx_fx::{
    ConversionRequest, ConversionResult, FetchMode, FetchOutcome, FxConfig, RateProvider, Startup,
    ValidationError,
};

use crate::console::{print_breakdown, ConsoleListener};

#[derive(Serialize)]
struct CalcOutput<'a> {
    result: &'a ConversionResult,
    display: &'a ConversionDisplay,
}

/// Price a purchase with the current rates.
pub async fn calc(
    config: &FxConfig,
    amount: &str,
    currency: Currency,
    card: CardIssuer,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let request = match parse_request(amount, currency, card) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("[!] {}", validation_alert(&e));
            return Ok(ExitCode::FAILURE);
        }
    };

    let provider = RateProvider::from_config(config, Arc::new(ConsoleListener::new(json)))?;
    match price(&provider, &request, json).await? {
        Some(_) => Ok(ExitCode::SUCCESS),
        None => Ok(ExitCode::FAILURE),
    }
}

/// Show the current rates, refreshing them if the cache is stale.
pub async fn rates(config: &FxConfig) -> anyhow::Result<ExitCode> {
    let provider = RateProvider::from_config(config, Arc::new(ConsoleListener::new(false)))?;
    show_rates(&provider).await;

    Ok(ExitCode::SUCCESS)
}

/// Fetch rates in the foreground, keeping cached rates if the fetch fails.
pub async fn refresh(config: &FxConfig) -> anyhow::Result<ExitCode> {
    let provider = RateProvider::from_config(config, Arc::new(ConsoleListener::new(false)))?;

    match refresh_rates(&provider).await {
        FetchOutcome::Updated(rates) => {
            debug!(rates = %rates_summary(&rates), "Manual refresh succeeded");
            Ok(ExitCode::SUCCESS)
        }
        outcome => {
            if let Some(e) = outcome.error() {
                warn!(error = %e, "Manual refresh failed");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// List the card fee table.
pub fn cards() {
    for card in CardIssuer::ALL {
        println!(
            "{:<10}{:<12}{}%",
            card.code(),
            card.display_name(),
            card.fee_percent()
        );
    }
    println!("Foreign transaction fee: {}% on every card", FOREIGN_FEE_PERCENT);
}

/// Parse and check a request before any rates are loaded.
fn parse_request(
    amount: &str,
    currency: Currency,
    card: CardIssuer,
) -> Result<ConversionRequest, ValidationError> {
    let request = ConversionRequest::parse(amount, currency.code(), card.code())?;
    request.validate()?;
    Ok(request)
}

/// Load rates, then print the breakdown. `None` when the request was rejected.
async fn price(
    provider: &RateProvider,
    request: &ConversionRequest,
    json: bool,
) -> anyhow::Result<Option<ConversionResult>> {
    let startup = provider.initialize().await;

    let priced = match provider.calculate(request) {
        Ok(result) => {
            let display = ConversionDisplay::from(&result);
            if json {
                let output = CalcOutput {
                    result: &result,
                    display: &display,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_breakdown(&display);
            }
            Some(result)
        }
        Err(e) => {
            eprintln!("[!] {}", validation_alert(&e));
            None
        }
    };

    finish_refresh(startup).await;
    Ok(priced)
}

/// Load rates and wait for any background refresh.
async fn show_rates(provider: &RateProvider) -> ExchangeRateSet {
    let startup = provider.initialize().await;
    finish_refresh(startup).await;
    provider.rates()
}

/// Publish cached rates, then fetch in the foreground.
async fn refresh_rates(provider: &RateProvider) -> FetchOutcome {
    if provider.load_cached().is_none() {
        debug!("No cached rates before manual refresh");
    }
    provider.fetch(FetchMode::Foreground).await
}

/// Let a background refresh finish so its result reaches the cache.
async fn finish_refresh(startup: Startup) {
    let Startup::Cached {
        refresh: Some(handle),
    } = startup
    else {
        return;
    };

    match handle.await {
        Ok(outcome) => debug!(updated = outcome.is_updated(), "Background refresh finished"),
        Err(e) => warn!(error = %e, "Background refresh task failed"),
    }
}
