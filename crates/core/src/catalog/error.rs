//! Catalog error types.

use thiserror::Error;

/// Errors that can occur when validating catalog entities.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Name must not be empty.
    #[error("Name must not be empty")]
    EmptyName,

    /// Code must not be empty.
    #[error("Code must not be empty")]
    EmptyCode,

    /// Tax rate basis points out of range.
    #[error("Tax rate must be between 0 and 10000 basis points, got {0}")]
    InvalidTaxRate(i64),

    /// Country code must be two uppercase letters.
    #[error("Invalid country code: {0}")]
    InvalidCountryCode(String),

    /// Percent discount out of range.
    #[error("Percent discount must be between 1 and 10000 basis points, got {0}")]
    InvalidPercentValue(i64),

    /// Fixed discount must be positive.
    #[error("Fixed discount must be positive, got {0}")]
    InvalidFixedValue(i64),

    /// Validity window is inverted.
    #[error("Validity window end {until} is not after start {from}")]
    InvalidValidityWindow {
        /// Window start (inclusive).
        from: chrono::NaiveDate,
        /// Window end (exclusive).
        until: chrono::NaiveDate,
    },

    /// Redemption limit must be positive.
    #[error("Redemption limit must be positive, got {0}")]
    InvalidRedemptionLimit(i64),
}
