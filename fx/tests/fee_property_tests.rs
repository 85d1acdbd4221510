//! Property-based tests for the fee calculation.

use cardfx_common::{CardIssuer, Currency, ExchangeRateSet, FOREIGN_FEE_PERCENT};
use cardfx_fx::{compute, ConversionRequest, ValidationError};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn arb_currency() -> impl Strategy<Value = Currency> {
    prop_oneof![Just(Currency::Jpy), Just(Currency::Usd), Just(Currency::Try)]
}

fn arb_card() -> impl Strategy<Value = CardIssuer> {
    prop_oneof![
        Just(CardIssuer::Woori),
        Just(CardIssuer::Shinhan),
        Just(CardIssuer::Kb),
        Just(CardIssuer::Samsung),
        Just(CardIssuer::Hyundai),
    ]
}

fn arb_rates() -> impl Strategy<Value = ExchangeRateSet> {
    (0.01f64..50.0, 100.0f64..5000.0, 1.0f64..200.0)
        .prop_map(|(jpy, usd, r#try)| ExchangeRateSet::new(jpy, usd, r#try))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Larger purchases always cost more in every component.
    #[test]
    fn prop_monotonic_in_amount(
        amount in 0.01f64..1_000_000.0,
        extra in 0.01f64..1_000_000.0,
        currency in arb_currency(),
        card in arb_card(),
        rates in arb_rates(),
    ) {
        let small = compute(&ConversionRequest::new(amount, currency, card), &rates).unwrap();
        let large = compute(&ConversionRequest::new(amount + extra, currency, card), &rates).unwrap();

        prop_assert!(large.converted > small.converted);
        prop_assert!(large.card_fee > small.card_fee);
        prop_assert!(large.foreign_fee > small.foreign_fee);
        prop_assert!(large.total > small.total);
    }

    /// Scaling the amount scales every component by the same factor.
    #[test]
    fn prop_scales_proportionally(
        amount in 0.01f64..100_000.0,
        factor in 1.0f64..100.0,
        currency in arb_currency(),
        card in arb_card(),
        rates in arb_rates(),
    ) {
        let base = compute(&ConversionRequest::new(amount, currency, card), &rates).unwrap();
        let scaled = compute(&ConversionRequest::new(amount * factor, currency, card), &rates).unwrap();

        prop_assert!(close(scaled.converted, base.converted * factor));
        prop_assert!(close(scaled.card_fee, base.card_fee * factor));
        prop_assert!(close(scaled.foreign_fee, base.foreign_fee * factor));
        prop_assert!(close(scaled.total, base.total * factor));
    }

    /// The total is the converted amount plus both fees, and the foreign fee
    /// does not depend on the card.
    #[test]
    fn prop_total_is_sum_of_parts(
        amount in 0.01f64..1_000_000.0,
        currency in arb_currency(),
        card in arb_card(),
        rates in arb_rates(),
    ) {
        let result = compute(&ConversionRequest::new(amount, currency, card), &rates).unwrap();

        prop_assert!(close(result.total, result.converted + result.card_fee + result.foreign_fee));
        prop_assert!(close(result.foreign_fee, result.converted * FOREIGN_FEE_PERCENT / 100.0));
        prop_assert!(close(result.card_fee, result.converted * card.fee_percent() / 100.0));
        prop_assert_eq!(result.rate, rates.get(currency));
    }

    /// Non-positive amounts are rejected whatever the rates.
    #[test]
    fn prop_non_positive_amounts_rejected(
        amount in -1_000_000.0f64..=0.0,
        currency in arb_currency(),
        card in arb_card(),
        rates in arb_rates(),
    ) {
        prop_assert_eq!(
            compute(&ConversionRequest::new(amount, currency, card), &rates),
            Err(ValidationError::InvalidAmount)
        );
    }
}
