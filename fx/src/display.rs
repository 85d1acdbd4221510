//! Presentation strings for conversion results and rate status.
//!
//! Amounts are rounded to whole KRW here and nowhere else.

use cardfx_common::{format_seoul, is_valid_rate, Currency, ExchangeRateSet};
use serde::Serialize;

use crate::conversion::{ConversionResult, ValidationError};
use crate::engine::RateStamp;

/// Unit suffix for KRW amounts.
pub const WON: &str = "원";

/// Label shown instead of a timestamp when estimates are in use.
pub const LOAD_FAILED_MARKER: &str = "환율 정보 로드 실패";

/// Alert shown when a foreground fetch fails.
pub const FETCH_FAILED_ALERT: &str =
    "환율 정보를 가져오는데 실패했습니다. 잠시 후 다시 시도해주세요.";

/// Alert shown when the amount is not a positive number.
pub const INVALID_AMOUNT_ALERT: &str = "올바른 금액을 입력해주세요.";

/// Loading indicator text for foreground fetches.
pub const LOADING_MESSAGE: &str = "환율 정보를 불러오는 중...";

/// Formatted breakdown ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionDisplay {
    pub original_amount: String,
    pub rate: String,
    pub converted: String,
    pub card_fee: String,
    pub foreign_fee: String,
    pub total: String,
}

impl From<&ConversionResult> for ConversionDisplay {
    fn from(result: &ConversionResult) -> Self {
        Self {
            original_amount: format!(
                "{} {}",
                format_grouped(result.amount, 3),
                result.currency.symbol()
            ),
            rate: format_rate(result.currency, result.rate),
            converted: format_krw(result.converted),
            card_fee: format!(
                "{} ({}%)",
                format_krw(result.card_fee),
                result.card_fee_percent
            ),
            foreign_fee: format!(
                "{} ({}%)",
                format_krw(result.foreign_fee),
                result.foreign_fee_percent
            ),
            total: format_krw(result.total),
        }
    }
}

/// `1 USD = 1350.00 원`
pub fn format_rate(currency: Currency, rate: f64) -> String {
    format!("1 {} = {:.2} {}", currency.code(), rate, WON)
}

/// Round to whole won and group thousands: `135,945 원`.
pub fn format_krw(amount: f64) -> String {
    format!("{} {}", format_grouped(amount, 0), WON)
}

/// One line listing every known rate, separated by ` | `.
pub fn rates_summary(rates: &ExchangeRateSet) -> String {
    rates
        .iter()
        .filter(|(_, rate)| is_valid_rate(*rate))
        .map(|(currency, rate)| format_rate(currency, rate))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Last-updated label for a rate stamp.
pub fn stamp_label(stamp: &RateStamp) -> String {
    match stamp {
        RateStamp::Fetched(millis) => {
            format_seoul(*millis).unwrap_or_else(|| LOAD_FAILED_MARKER.to_string())
        }
        RateStamp::Estimated => LOAD_FAILED_MARKER.to_string(),
    }
}

/// User-facing message for a rejected request.
pub fn validation_alert(err: &ValidationError) -> String {
    match err {
        ValidationError::InvalidAmount => INVALID_AMOUNT_ALERT.to_string(),
        other => other.to_string(),
    }
}

/// Format a number with `,` thousands separators and at most
/// `max_fraction` fraction digits, dropping trailing zeros.
pub fn format_grouped(value: f64, max_fraction: usize) -> String {
    // Round half away from zero before formatting; `{:.N}` rounds ties to even.
    let factor = 10f64.powi(max_fraction as i32);
    let rounded = (value.abs() * factor).round() / factor;
    let fixed = format!("{:.*}", max_fraction, rounded);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::{compute, ConversionRequest};
    use cardfx_common::CardIssuer;

    #[test]
    fn test_breakdown_strings() {
        let rates = ExchangeRateSet::new(9.8, 1350.0, 42.0);
        let request = ConversionRequest::new(100.0, Currency::Usd, CardIssuer::Kb);
        let display = ConversionDisplay::from(&compute(&request, &rates).unwrap());

        assert_eq!(display.original_amount, "100 $");
        assert_eq!(display.rate, "1 USD = 1350.00 원");
        assert_eq!(display.converted, "135,000 원");
        assert_eq!(display.card_fee, "675 원 (0.5%)");
        assert_eq!(display.foreign_fee, "270 원 (0.2%)");
        assert_eq!(display.total, "135,945 원");
    }

    #[test]
    fn test_fractional_original_amount() {
        let rates = ExchangeRateSet::new(9.8, 1350.0, 42.0);
        let request = ConversionRequest::new(12_345.678_9, Currency::Jpy, CardIssuer::Woori);
        let display = ConversionDisplay::from(&compute(&request, &rates).unwrap());

        assert_eq!(display.original_amount, "12,345.679 ¥");
        assert_eq!(display.card_fee, "665 원 (0.55%)");
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(0.0, 0), "0");
        assert_eq!(format_grouped(999.4, 0), "999");
        assert_eq!(format_grouped(999.5, 0), "1,000");
        assert_eq!(format_grouped(1_234_567.0, 0), "1,234,567");
        assert_eq!(format_grouped(1234.5, 3), "1,234.5");
        assert_eq!(format_grouped(-1234.0, 0), "-1,234");
        assert_eq!(format_grouped(-0.0001, 0), "0");
    }

    #[test]
    fn test_rates_summary_skips_unset() {
        let full = ExchangeRateSet::new(9.8, 1350.0, 42.0);
        assert_eq!(
            rates_summary(&full),
            "1 JPY = 9.80 원 | 1 USD = 1350.00 원 | 1 TRY = 42.00 원"
        );

        let partial = ExchangeRateSet::new(9.8, 1350.0, 0.0);
        assert_eq!(rates_summary(&partial), "1 JPY = 9.80 원 | 1 USD = 1350.00 원");

        assert_eq!(rates_summary(&ExchangeRateSet::unset()), "");
    }

    #[test]
    fn test_stamp_labels() {
        assert_eq!(stamp_label(&RateStamp::Estimated), LOAD_FAILED_MARKER);
        // 2024-01-15T05:30:05Z
        assert_eq!(
            stamp_label(&RateStamp::Fetched(1_705_296_605_000)),
            "2024. 01. 15. 14:30:05"
        );
    }

    #[test]
    fn test_validation_alert() {
        assert_eq!(
            validation_alert(&ValidationError::InvalidAmount),
            INVALID_AMOUNT_ALERT
        );
        assert_eq!(
            validation_alert(&ValidationError::RateUnavailable(Currency::Try)),
            "No exchange rate available for TRY"
        );
    }
}
