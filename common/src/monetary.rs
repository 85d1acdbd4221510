//! Currency and exchange rate types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Foreign currencies the calculator converts into KRW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Japanese yen.
    Jpy,
    /// US dollar.
    Usd,
    /// Turkish lira.
    Try,
}

impl Currency {
    /// All supported currencies, in display order.
    pub const ALL: [Currency; 3] = [Currency::Jpy, Currency::Usd, Currency::Try];

    /// Parse a currency from its ISO 4217 code, ignoring case.
    pub fn from_code(code: &str) -> Result<Self, ParseError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "JPY" => Ok(Currency::Jpy),
            "USD" => Ok(Currency::Usd),
            "TRY" => Ok(Currency::Try),
            _ => Err(ParseError::UnknownCurrency(code.to_string())),
        }
    }

    /// Get the currency code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Jpy => "JPY",
            Currency::Usd => "USD",
            Currency::Try => "TRY",
        }
    }

    /// Get the currency symbol shown next to foreign amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Jpy => "¥",
            Currency::Usd => "$",
            Currency::Try => "₺",
        }
    }

    fn index(self) -> usize {
        match self {
            Currency::Jpy => 0,
            Currency::Usd => 1,
            Currency::Try => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

/// Approximate KRW rates used when no live or cached rate exists.
pub mod fallback {
    /// KRW per 1 JPY.
    pub const JPY: f64 = 9.80;
    /// KRW per 1 USD.
    pub const USD: f64 = 1350.0;
    /// KRW per 1 TRY.
    pub const TRY: f64 = 42.0;
}

/// Exchange rates expressed as KRW per 1 unit of each foreign currency.
///
/// A rate of `0.0` means the rate is unknown. The set is replaced as a
/// whole; [`ExchangeRateSet::merged_with`] builds a new value rather than
/// mutating in place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RatesRepr", into = "RatesRepr")]
pub struct ExchangeRateSet {
    rates: [f64; 3],
}

impl ExchangeRateSet {
    /// Create an empty set where every rate is unset.
    pub fn unset() -> Self {
        Self::default()
    }

    /// Create a set from explicit JPY, USD and TRY rates.
    pub fn new(jpy: f64, usd: f64, r#try: f64) -> Self {
        Self {
            rates: [jpy, usd, r#try],
        }
    }

    /// The hardcoded approximate rates.
    pub fn fallback() -> Self {
        Self::new(fallback::JPY, fallback::USD, fallback::TRY)
    }

    /// Get the rate for a currency (0.0 when unset).
    pub fn get(&self, currency: Currency) -> f64 {
        self.rates[currency.index()]
    }

    /// Check whether the rate for a currency is usable.
    pub fn has_rate(&self, currency: Currency) -> bool {
        is_valid_rate(self.get(currency))
    }

    /// True when no currency has a rate yet.
    pub fn is_unset(&self) -> bool {
        self.rates.iter().all(|rate| *rate == 0.0)
    }

    /// Iterate over currencies paired with their rates.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        Currency::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Build a new set where the supplied currencies take the given rates
    /// and every other currency keeps its current value.
    pub fn merged_with<I>(&self, updates: I) -> Self
    where
        I: IntoIterator<Item = (Currency, f64)>,
    {
        let mut next = *self;
        for (currency, rate) in updates {
            next.rates[currency.index()] = rate;
        }
        next
    }
}

/// Check that a rate is finite and strictly positive.
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

#[derive(Serialize, Deserialize)]
struct RatesRepr {
    #[serde(rename = "JPY", default)]
    jpy: f64,
    #[serde(rename = "USD", default)]
    usd: f64,
    #[serde(rename = "TRY", default)]
    r#try: f64,
}

impl From<RatesRepr> for ExchangeRateSet {
    fn from(repr: RatesRepr) -> Self {
        Self::new(repr.jpy, repr.usd, repr.r#try)
    }
}

impl From<ExchangeRateSet> for RatesRepr {
    fn from(set: ExchangeRateSet) -> Self {
        Self {
            jpy: set.get(Currency::Jpy),
            usd: set.get(Currency::Usd),
            r#try: set.get(Currency::Try),
        }
    }
}
