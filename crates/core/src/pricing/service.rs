//! Line-item pricing service.

use rust_decimal::Decimal;

use faktura_shared::types::money::{
    BASIS_POINT_SCALE, apply_basis_points, mul_div_half_up, scale_by_quantity,
};

use super::error::PricingError;
use super::types::{DocumentTotals, LinePricingInput, PricedLine, TaxBehavior};
use crate::catalog::DiscountKind;

/// Minimum accepted quantity.
const MIN_QUANTITY_MILLIS: i64 = 1; // 0.001

/// Stateless per-line pricing.
///
/// All rounding is round-half-up and happens per line, never deferred to the
/// document total, so any single line is reproducible in isolation.
pub struct PricingService;

impl PricingService {
    /// Prices a single line.
    ///
    /// Steps:
    /// 1. `subtotal = round(quantity * unit_amount)`
    /// 2. Discount: percent is `round(subtotal * bp / 10000)` capped at the
    ///    subtotal; fixed is `min(value, subtotal)`
    /// 3. `taxable_base = subtotal - discount`
    /// 4. Tax: exclusive adds `round(base * rate / 10000)` on top; inclusive
    ///    carves `base - round(base * 10000 / (10000 + rate))` out of the base
    ///
    /// # Errors
    ///
    /// Returns `PricingError` for out-of-range inputs or catalog references
    /// that are not applicable on the pricing date.
    pub fn price_line(input: &LinePricingInput<'_>) -> Result<PricedLine, PricingError> {
        if input.quantity < Decimal::new(MIN_QUANTITY_MILLIS, 3) {
            return Err(PricingError::InvalidQuantity(input.quantity));
        }
        if input.unit_amount < 0 {
            return Err(PricingError::NegativeUnitAmount(input.unit_amount));
        }
        if let Some(rate) = input.tax_rate
            && !rate.is_applicable_on(input.pricing_date)
        {
            return Err(PricingError::TaxRateNotApplicable(rate.id));
        }
        if let Some(discount) = input.discount
            && !discount.is_applicable_on(input.pricing_date)
        {
            return Err(PricingError::DiscountNotApplicable(discount.id));
        }

        let subtotal = scale_by_quantity(input.quantity, input.unit_amount)
            .ok_or(PricingError::AmountOverflow)?;

        let discount_amount = match input.discount {
            None => 0,
            Some(d) => match d.kind {
                DiscountKind::Percent => apply_basis_points(subtotal, d.value).min(subtotal),
                DiscountKind::Fixed => d.value.min(subtotal),
            },
        };

        let taxable_base = subtotal - discount_amount;

        let (tax_amount, total) = match input.tax_rate {
            None => (0, taxable_base),
            Some(rate) => match input.tax_behavior {
                TaxBehavior::Exclusive => {
                    let tax = apply_basis_points(taxable_base, rate.rate_basis_points);
                    let total = taxable_base
                        .checked_add(tax)
                        .ok_or(PricingError::AmountOverflow)?;
                    (tax, total)
                }
                TaxBehavior::Inclusive => {
                    let net = mul_div_half_up(
                        taxable_base,
                        BASIS_POINT_SCALE,
                        BASIS_POINT_SCALE + rate.rate_basis_points,
                    );
                    (taxable_base - net, taxable_base)
                }
            },
        };

        Ok(PricedLine {
            subtotal,
            discount_amount,
            taxable_base,
            tax_amount,
            total,
            tax_rate_basis_points: input.tax_rate.map(|r| r.rate_basis_points),
        })
    }

    /// Aggregates priced lines into document totals.
    ///
    /// `total` is always the exact integer sum of line totals; `subtotal` is
    /// derived so that `total = subtotal + tax_total` holds in both tax modes.
    #[must_use]
    pub fn document_totals(lines: &[PricedLine]) -> DocumentTotals {
        let total: i64 = lines.iter().map(|l| l.total).sum();
        let tax_total: i64 = lines.iter().map(|l| l.tax_amount).sum();
        DocumentTotals {
            subtotal: total - tax_total,
            tax_total,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use faktura_shared::types::{DiscountId, OwnerId, TaxRateId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::catalog::{Discount, TaxRate};

    fn pricing_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    fn tax_rate(bp: i64) -> TaxRate {
        TaxRate {
            id: TaxRateId::new(),
            owner_id: OwnerId::new(),
            name: format!("Tax {bp}bp"),
            rate_basis_points: bp,
            country_code: "DE".to_string(),
            is_active: true,
            valid_from: None,
            valid_until: None,
        }
    }

    fn discount(kind: DiscountKind, value: i64) -> Discount {
        Discount {
            id: DiscountId::new(),
            owner_id: OwnerId::new(),
            code: "TEST".to_string(),
            kind,
            value,
            is_active: true,
            valid_from: None,
            valid_until: None,
            redemption_limit: None,
            redemption_count: 0,
        }
    }

    fn input<'a>(
        quantity: Decimal,
        unit_amount: i64,
        behavior: TaxBehavior,
        rate: Option<&'a TaxRate>,
        disc: Option<&'a Discount>,
    ) -> LinePricingInput<'a> {
        LinePricingInput {
            quantity,
            unit_amount,
            tax_behavior: behavior,
            tax_rate: rate,
            discount: disc,
            pricing_date: pricing_date(),
        }
    }

    #[test]
    fn test_exclusive_tax_adds_on_top() {
        // quantity 3, unit 1000, 18% exclusive
        let rate = tax_rate(1800);
        let line = PricingService::price_line(&input(
            dec!(3),
            1000,
            TaxBehavior::Exclusive,
            Some(&rate),
            None,
        ))
        .unwrap();
        assert_eq!(line.subtotal, 3000);
        assert_eq!(line.tax_amount, 540);
        assert_eq!(line.total, 3540);
    }

    #[test]
    fn test_inclusive_tax_is_carved_out() {
        // Same line, inclusive: total stays 3000, embedded tax
        // 3000 - round(3000 * 10000 / 11800) = 3000 - 2542 = 458
        let rate = tax_rate(1800);
        let line = PricingService::price_line(&input(
            dec!(3),
            1000,
            TaxBehavior::Inclusive,
            Some(&rate),
            None,
        ))
        .unwrap();
        assert_eq!(line.total, 3000);
        assert_eq!(line.tax_amount, 458);
    }

    #[test]
    fn test_no_tax_rate_means_zero_tax() {
        let line =
            PricingService::price_line(&input(dec!(2), 500, TaxBehavior::Exclusive, None, None))
                .unwrap();
        assert_eq!(line.subtotal, 1000);
        assert_eq!(line.tax_amount, 0);
        assert_eq!(line.total, 1000);
    }

    #[test]
    fn test_percent_discount_applies_before_tax() {
        let rate = tax_rate(1000);
        let disc = discount(DiscountKind::Percent, 1000); // 10%
        let line = PricingService::price_line(&input(
            dec!(1),
            10_000,
            TaxBehavior::Exclusive,
            Some(&rate),
            Some(&disc),
        ))
        .unwrap();
        assert_eq!(line.discount_amount, 1000);
        assert_eq!(line.taxable_base, 9000);
        assert_eq!(line.tax_amount, 900);
        assert_eq!(line.total, 9900);
    }

    #[test]
    fn test_fixed_discount_is_capped_at_subtotal() {
        let disc = discount(DiscountKind::Fixed, 5000);
        let line = PricingService::price_line(&input(
            dec!(1),
            3000,
            TaxBehavior::Exclusive,
            None,
            Some(&disc),
        ))
        .unwrap();
        assert_eq!(line.discount_amount, 3000);
        assert_eq!(line.taxable_base, 0);
        assert_eq!(line.total, 0);
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-1))]
    #[case(dec!(0.0005))]
    fn test_bad_quantity_rejected(#[case] quantity: Decimal) {
        let result =
            PricingService::price_line(&input(quantity, 1000, TaxBehavior::Exclusive, None, None));
        assert_eq!(result, Err(PricingError::InvalidQuantity(quantity)));
    }

    #[test]
    fn test_negative_unit_amount_rejected() {
        let result =
            PricingService::price_line(&input(dec!(1), -5, TaxBehavior::Exclusive, None, None));
        assert_eq!(result, Err(PricingError::NegativeUnitAmount(-5)));
    }

    #[test]
    fn test_expired_tax_rate_rejected() {
        let mut rate = tax_rate(1800);
        rate.valid_until = Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        let result = PricingService::price_line(&input(
            dec!(1),
            1000,
            TaxBehavior::Exclusive,
            Some(&rate),
            None,
        ));
        assert_eq!(result, Err(PricingError::TaxRateNotApplicable(rate.id)));
    }

    #[test]
    fn test_exhausted_discount_rejected() {
        let mut disc = discount(DiscountKind::Percent, 500);
        disc.redemption_limit = Some(3);
        disc.redemption_count = 3;
        let result = PricingService::price_line(&input(
            dec!(1),
            1000,
            TaxBehavior::Exclusive,
            None,
            Some(&disc),
        ));
        assert_eq!(result, Err(PricingError::DiscountNotApplicable(disc.id)));
    }

    #[test]
    fn test_fractional_quantity_rounds_half_up() {
        // 1.5 * 333 = 499.5 -> 500
        let line =
            PricingService::price_line(&input(dec!(1.5), 333, TaxBehavior::Exclusive, None, None))
                .unwrap();
        assert_eq!(line.subtotal, 500);
    }

    #[test]
    fn test_document_totals_exclusive() {
        let rate = tax_rate(1800);
        let a = PricingService::price_line(&input(
            dec!(3),
            1000,
            TaxBehavior::Exclusive,
            Some(&rate),
            None,
        ))
        .unwrap();
        let b =
            PricingService::price_line(&input(dec!(1), 250, TaxBehavior::Exclusive, None, None))
                .unwrap();
        let totals = PricingService::document_totals(&[a, b]);
        assert_eq!(totals.subtotal, 3250);
        assert_eq!(totals.tax_total, 540);
        assert_eq!(totals.total, 3790);
        assert_eq!(totals.total, a.total + b.total);
    }

    #[test]
    fn test_document_totals_inclusive() {
        let rate = tax_rate(1800);
        let a = PricingService::price_line(&input(
            dec!(3),
            1000,
            TaxBehavior::Inclusive,
            Some(&rate),
            None,
        ))
        .unwrap();
        let totals = PricingService::document_totals(&[a]);
        assert_eq!(totals.total, 3000);
        assert_eq!(totals.tax_total, 458);
        assert_eq!(totals.subtotal, 2542);
        assert_eq!(totals.subtotal + totals.tax_total, totals.total);
    }

    #[test]
    fn test_empty_document_is_all_zero() {
        assert_eq!(PricingService::document_totals(&[]), DocumentTotals::default());
    }
}
