//! Pricing error types.

use faktura_shared::types::{DiscountId, TaxRateId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while pricing a line.
///
/// All of these are detected before any state is mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Quantity must be at least 0.001.
    #[error("Quantity must be at least 0.001, got {0}")]
    InvalidQuantity(Decimal),

    /// Unit amount cannot be negative.
    #[error("Unit amount cannot be negative, got {0}")]
    NegativeUnitAmount(i64),

    /// Tax rate is inactive or outside its validity window.
    #[error("Tax rate {0} is not applicable on the pricing date")]
    TaxRateNotApplicable(TaxRateId),

    /// Discount is inactive, expired, or out of redemptions.
    #[error("Discount {0} is not applicable on the pricing date")]
    DiscountNotApplicable(DiscountId),

    /// The line amount does not fit in 64 bits.
    #[error("Line amount overflows the representable range")]
    AmountOverflow,
}
