//! Card purchase conversion and fee calculation.

use cardfx_common::{
    is_valid_rate, CardIssuer, Currency, ExchangeRateSet, ParseError, FOREIGN_FEE_PERCENT,
};
use serde::Serialize;
use thiserror::Error;

/// Rejections of a conversion request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Amount is not a finite number greater than zero.
    #[error("Invalid amount")]
    InvalidAmount,

    /// Currency code is not supported.
    #[error("Unsupported currency: {0}")]
    UnknownCurrency(String),

    /// Card issuer code is not in the fee table.
    #[error("Unknown card issuer: {0}")]
    UnknownCardIssuer(String),

    /// No usable rate is loaded for the currency.
    #[error("No exchange rate available for {0}")]
    RateUnavailable(Currency),
}

impl From<ParseError> for ValidationError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnknownCurrency(code) => ValidationError::UnknownCurrency(code),
            ParseError::UnknownCardIssuer(code) => ValidationError::UnknownCardIssuer(code),
        }
    }
}

/// A foreign-currency card purchase to price in KRW.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRequest {
    /// Purchase amount in the foreign currency.
    pub amount: f64,
    /// Currency of the purchase.
    pub currency: Currency,
    /// Card used to pay.
    pub card: CardIssuer,
}

impl ConversionRequest {
    /// Create a new request.
    pub fn new(amount: f64, currency: Currency, card: CardIssuer) -> Self {
        Self {
            amount,
            currency,
            card,
        }
    }

    /// Check the amount is a finite number greater than zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::InvalidAmount);
        }
        Ok(())
    }

    /// Build a request from raw form inputs.
    ///
    /// The amount text may carry `,` grouping separators and surrounding
    /// whitespace. Range checks are left to [`ConversionRequest::validate`].
    pub fn parse(
        amount_text: &str,
        currency_code: &str,
        card_code: &str,
    ) -> Result<Self, ValidationError> {
        let cleaned: String = amount_text.trim().chars().filter(|c| *c != ',').collect();
        let amount = cleaned
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidAmount)?;

        Ok(Self {
            amount,
            currency: Currency::from_code(currency_code)?,
            card: CardIssuer::from_code(card_code)?,
        })
    }
}

/// Breakdown of the KRW cost of a purchase.
///
/// All amounts are unrounded; rounding is a presentation concern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionResult {
    pub amount: f64,
    pub currency: Currency,
    pub card: CardIssuer,
    /// KRW per unit of `currency`.
    pub rate: f64,
    pub converted: f64,
    pub card_fee: f64,
    pub card_fee_percent: f64,
    pub foreign_fee: f64,
    pub foreign_fee_percent: f64,
    pub total: f64,
}

/// Price a purchase against a rate set.
pub fn compute(
    request: &ConversionRequest,
    rates: &ExchangeRateSet,
) -> Result<ConversionResult, ValidationError> {
    request.validate()?;

    let rate = rates.get(request.currency);
    if !is_valid_rate(rate) {
        return Err(ValidationError::RateUnavailable(request.currency));
    }

    let card_fee_percent = request.card.fee_percent();
    let converted = request.amount * rate;
    let card_fee = converted * (card_fee_percent / 100.0);
    let foreign_fee = converted * (FOREIGN_FEE_PERCENT / 100.0);
    let total = converted + card_fee + foreign_fee;

    Ok(ConversionResult {
        amount: request.amount,
        currency: request.currency,
        card: request.card,
        rate,
        converted,
        card_fee,
        card_fee_percent,
        foreign_fee,
        foreign_fee_percent: FOREIGN_FEE_PERCENT,
        total,
    })
}
