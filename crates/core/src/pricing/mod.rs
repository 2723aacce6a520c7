//! Per-line price computation.
//!
//! The pricer turns `{quantity, unit_amount, tax behavior, catalog refs}`
//! into integer minor-unit figures:
//! - Line subtotal, discount amount, taxable base, tax amount, line total
//! - Document totals as the exact sum of line figures
//! - All rounding is per-line so a single line reprints identically
//!   regardless of its siblings

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PricingError;
pub use service::PricingService;
pub use types::{DocumentTotals, LinePricingInput, PricedLine, TaxBehavior};
