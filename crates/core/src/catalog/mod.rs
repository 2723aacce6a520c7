//! Tax rates and discount codes.
//!
//! Catalog entities are owner-scoped multipliers and subtractors referenced
//! by invoice line items:
//! - Tax rates expressed in basis points with optional validity windows
//! - Discount codes (percent or fixed) with redemption caps
//! - Validation rules applied before persistence

pub mod error;
pub mod service;
pub mod types;

pub use error::CatalogError;
pub use service::CatalogService;
pub use types::{Discount, DiscountKind, NewDiscount, NewTaxRate, TaxRate};
