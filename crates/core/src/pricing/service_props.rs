//! Property-based tests for line pricing.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use faktura_shared::types::{DiscountId, OwnerId, TaxRateId};

use super::service::PricingService;
use super::types::{LinePricingInput, TaxBehavior};
use crate::catalog::{Discount, DiscountKind, TaxRate};

/// Strategy for a valid quantity (0.001 to 10,000 in thousandths).
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|millis| Decimal::new(millis, 3))
}

/// Strategy for a unit amount in minor units.
fn unit_amount_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000_000i64
}

/// Strategy for a tax rate in basis points.
fn rate_bp_strategy() -> impl Strategy<Value = i64> {
    0i64..=10_000i64
}

fn tax_behavior_strategy() -> impl Strategy<Value = TaxBehavior> {
    prop_oneof![Just(TaxBehavior::Exclusive), Just(TaxBehavior::Inclusive)]
}

fn discount_strategy() -> impl Strategy<Value = Option<Discount>> {
    prop_oneof![
        Just(None),
        (1i64..=10_000i64).prop_map(|bp| Some(make_discount(DiscountKind::Percent, bp))),
        (1i64..1_000_000i64).prop_map(|v| Some(make_discount(DiscountKind::Fixed, v))),
    ]
}

fn make_tax_rate(bp: i64) -> TaxRate {
    TaxRate {
        id: TaxRateId::new(),
        owner_id: OwnerId::new(),
        name: "Tax".to_string(),
        rate_basis_points: bp,
        country_code: "DE".to_string(),
        is_active: true,
        valid_from: None,
        valid_until: None,
    }
}

fn make_discount(kind: DiscountKind, value: i64) -> Discount {
    Discount {
        id: DiscountId::new(),
        owner_id: OwnerId::new(),
        code: "PROP".to_string(),
        kind,
        value,
        is_active: true,
        valid_from: None,
        valid_until: None,
        redemption_limit: None,
        redemption_count: 0,
    }
}

fn pricing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every priced line keeps its internal identity: the total is the
    /// taxable base plus tax under exclusive behavior and exactly the
    /// taxable base under inclusive behavior.
    #[test]
    fn prop_line_identity_holds(
        quantity in quantity_strategy(),
        unit_amount in unit_amount_strategy(),
        rate_bp in rate_bp_strategy(),
        behavior in tax_behavior_strategy(),
        discount in discount_strategy(),
    ) {
        let rate = make_tax_rate(rate_bp);
        let line = PricingService::price_line(&LinePricingInput {
            quantity,
            unit_amount,
            tax_behavior: behavior,
            tax_rate: Some(&rate),
            discount: discount.as_ref(),
            pricing_date: pricing_date(),
        }).unwrap();

        prop_assert!(line.subtotal >= 0);
        prop_assert!((0..=line.subtotal).contains(&line.discount_amount));
        prop_assert_eq!(line.taxable_base, line.subtotal - line.discount_amount);
        prop_assert!(line.tax_amount >= 0);
        match behavior {
            TaxBehavior::Exclusive => {
                prop_assert_eq!(line.total, line.taxable_base + line.tax_amount);
            }
            TaxBehavior::Inclusive => {
                prop_assert_eq!(line.total, line.taxable_base);
                prop_assert!(line.tax_amount <= line.taxable_base);
            }
        }
    }

    /// Document totals equal the exact integer sum of line totals, with no
    /// rounding drift, under both tax modes.
    #[test]
    fn prop_document_total_is_sum_of_line_totals(
        lines in prop::collection::vec(
            (quantity_strategy(), unit_amount_strategy(), rate_bp_strategy()),
            0..8,
        ),
        behavior in tax_behavior_strategy(),
    ) {
        let rates: Vec<_> = lines.iter().map(|(_, _, bp)| make_tax_rate(*bp)).collect();
        let priced: Vec<_> = lines
            .iter()
            .zip(&rates)
            .map(|((quantity, unit_amount, _), rate)| {
                PricingService::price_line(&LinePricingInput {
                    quantity: *quantity,
                    unit_amount: *unit_amount,
                    tax_behavior: behavior,
                    tax_rate: Some(rate),
                    discount: None,
                    pricing_date: pricing_date(),
                })
                .unwrap()
            })
            .collect();

        let totals = PricingService::document_totals(&priced);
        let line_sum: i64 = priced.iter().map(|l| l.total).sum();
        prop_assert_eq!(totals.total, line_sum);
        prop_assert_eq!(totals.subtotal + totals.tax_total, totals.total);
    }

    /// Inclusive pricing never inflates the amount the customer pays: the
    /// line total equals the discounted subtotal regardless of the rate.
    #[test]
    fn prop_inclusive_total_is_rate_independent(
        quantity in quantity_strategy(),
        unit_amount in unit_amount_strategy(),
        rate_bp in rate_bp_strategy(),
    ) {
        let rate = make_tax_rate(rate_bp);
        let line = PricingService::price_line(&LinePricingInput {
            quantity,
            unit_amount,
            tax_behavior: TaxBehavior::Inclusive,
            tax_rate: Some(&rate),
            discount: None,
            pricing_date: pricing_date(),
        }).unwrap();
        prop_assert_eq!(line.total, line.subtotal);
    }

    /// Pricing the same input twice gives identical results; per-line
    /// rounding makes a reprint reproducible.
    #[test]
    fn prop_pricing_is_deterministic(
        quantity in quantity_strategy(),
        unit_amount in unit_amount_strategy(),
        rate_bp in rate_bp_strategy(),
        behavior in tax_behavior_strategy(),
    ) {
        let rate = make_tax_rate(rate_bp);
        let input = LinePricingInput {
            quantity,
            unit_amount,
            tax_behavior: behavior,
            tax_rate: Some(&rate),
            discount: None,
            pricing_date: pricing_date(),
        };
        let first = PricingService::price_line(&input).unwrap();
        let second = PricingService::price_line(&input).unwrap();
        prop_assert_eq!(first, second);
    }
}
