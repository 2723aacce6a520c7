//! Pricing domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{Discount, TaxRate};

/// Whether a line's stated unit price already contains tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBehavior {
    /// Unit prices contain tax; the tax figure is carved out of the total.
    Inclusive,
    /// Unit prices exclude tax; the tax figure is added on top.
    Exclusive,
}

/// Input to price a single line.
#[derive(Debug, Clone)]
pub struct LinePricingInput<'a> {
    /// Quantity, a positive decimal (minimum 0.001).
    pub quantity: Decimal,
    /// Unit price in minor units, non-negative.
    pub unit_amount: i64,
    /// Tax behavior of the parent document.
    pub tax_behavior: TaxBehavior,
    /// Tax rate to apply, if any.
    pub tax_rate: Option<&'a TaxRate>,
    /// Discount to apply, if any.
    pub discount: Option<&'a Discount>,
    /// Date applicability windows are checked against.
    pub pricing_date: NaiveDate,
}

/// Result of pricing a single line. All figures are minor-unit integers.
///
/// Under exclusive tax `total = taxable_base + tax_amount`; under inclusive
/// tax the base already contains the tax and `total = taxable_base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    /// `round(quantity * unit_amount)` before discount.
    pub subtotal: i64,
    /// Discount carved off the subtotal, never exceeding it.
    pub discount_amount: i64,
    /// Subtotal after discount; the base tax applies to.
    pub taxable_base: i64,
    /// Tax amount (embedded when inclusive, added when exclusive).
    pub tax_amount: i64,
    /// Line total as the customer pays it.
    pub total: i64,
    /// The basis-point rate the line was priced with, frozen for history.
    pub tax_rate_basis_points: Option<i64>,
}

/// Document-level totals aggregated from priced lines.
///
/// `total = subtotal + tax_total` holds in both tax modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Net amount before tax.
    pub subtotal: i64,
    /// Total tax across lines.
    pub tax_total: i64,
    /// Gross amount payable.
    pub total: i64,
}
