//! Catalog validation service.

use super::error::CatalogError;
use super::types::{DiscountKind, NewDiscount, NewTaxRate};

/// Stateless validation for catalog entities.
///
/// Persistence lives elsewhere; this service only decides whether an input
/// is acceptable before any row is written.
pub struct CatalogService;

impl CatalogService {
    /// Validates a tax rate input.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if any field is out of range.
    pub fn validate_tax_rate(input: &NewTaxRate) -> Result<(), CatalogError> {
        if input.name.trim().is_empty() {
            return Err(CatalogError::EmptyName);
        }
        if !(0..=10_000).contains(&input.rate_basis_points) {
            return Err(CatalogError::InvalidTaxRate(input.rate_basis_points));
        }
        if input.country_code.len() != 2
            || !input.country_code.chars().all(|c| c.is_ascii_uppercase())
        {
            return Err(CatalogError::InvalidCountryCode(input.country_code.clone()));
        }
        Self::validate_window(input.valid_from, input.valid_until)?;
        Ok(())
    }

    /// Validates a discount input.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if any field is out of range.
    pub fn validate_discount(input: &NewDiscount) -> Result<(), CatalogError> {
        if input.code.trim().is_empty() {
            return Err(CatalogError::EmptyCode);
        }
        match input.kind {
            DiscountKind::Percent => {
                if !(1..=10_000).contains(&input.value) {
                    return Err(CatalogError::InvalidPercentValue(input.value));
                }
            }
            DiscountKind::Fixed => {
                if input.value <= 0 {
                    return Err(CatalogError::InvalidFixedValue(input.value));
                }
            }
        }
        if let Some(limit) = input.redemption_limit
            && limit <= 0
        {
            return Err(CatalogError::InvalidRedemptionLimit(limit));
        }
        Self::validate_window(input.valid_from, input.valid_until)?;
        Ok(())
    }

    fn validate_window(
        from: Option<chrono::NaiveDate>,
        until: Option<chrono::NaiveDate>,
    ) -> Result<(), CatalogError> {
        if let (Some(from), Some(until)) = (from, until)
            && until <= from
        {
            return Err(CatalogError::InvalidValidityWindow { from, until });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use faktura_shared::types::{DiscountId, OwnerId, TaxRateId};
    use rstest::rstest;

    use super::*;
    use crate::catalog::types::{Discount, TaxRate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tax_rate_input() -> NewTaxRate {
        NewTaxRate {
            name: "VAT 18%".to_string(),
            rate_basis_points: 1800,
            country_code: "DE".to_string(),
            valid_from: None,
            valid_until: None,
        }
    }

    fn discount_input() -> NewDiscount {
        NewDiscount {
            code: "LAUNCH10".to_string(),
            kind: DiscountKind::Percent,
            value: 1000,
            valid_from: None,
            valid_until: None,
            redemption_limit: None,
        }
    }

    #[test]
    fn test_valid_tax_rate_passes() {
        assert!(CatalogService::validate_tax_rate(&tax_rate_input()).is_ok());
    }

    #[rstest]
    #[case(-1)]
    #[case(10_001)]
    fn test_tax_rate_out_of_range_rejected(#[case] bp: i64) {
        let mut input = tax_rate_input();
        input.rate_basis_points = bp;
        assert_eq!(
            CatalogService::validate_tax_rate(&input),
            Err(CatalogError::InvalidTaxRate(bp))
        );
    }

    #[rstest]
    #[case("de")]
    #[case("DEU")]
    #[case("")]
    fn test_bad_country_code_rejected(#[case] code: &str) {
        let mut input = tax_rate_input();
        input.country_code = code.to_string();
        assert!(matches!(
            CatalogService::validate_tax_rate(&input),
            Err(CatalogError::InvalidCountryCode(_))
        ));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut input = tax_rate_input();
        input.valid_from = Some(date(2026, 6, 1));
        input.valid_until = Some(date(2026, 1, 1));
        assert!(matches!(
            CatalogService::validate_tax_rate(&input),
            Err(CatalogError::InvalidValidityWindow { .. })
        ));
    }

    #[rstest]
    #[case(DiscountKind::Percent, 0)]
    #[case(DiscountKind::Percent, 10_001)]
    #[case(DiscountKind::Fixed, 0)]
    #[case(DiscountKind::Fixed, -500)]
    fn test_bad_discount_value_rejected(#[case] kind: DiscountKind, #[case] value: i64) {
        let mut input = discount_input();
        input.kind = kind;
        input.value = value;
        assert!(CatalogService::validate_discount(&input).is_err());
    }

    #[test]
    fn test_zero_redemption_limit_rejected() {
        let mut input = discount_input();
        input.redemption_limit = Some(0);
        assert_eq!(
            CatalogService::validate_discount(&input),
            Err(CatalogError::InvalidRedemptionLimit(0))
        );
    }

    #[test]
    fn test_tax_rate_window_is_half_open() {
        let rate = TaxRate {
            id: TaxRateId::new(),
            owner_id: OwnerId::new(),
            name: "VAT".to_string(),
            rate_basis_points: 1800,
            country_code: "DE".to_string(),
            is_active: true,
            valid_from: Some(date(2026, 1, 1)),
            valid_until: Some(date(2026, 7, 1)),
        };
        assert!(!rate.is_applicable_on(date(2025, 12, 31)));
        assert!(rate.is_applicable_on(date(2026, 1, 1)));
        assert!(rate.is_applicable_on(date(2026, 6, 30)));
        assert!(!rate.is_applicable_on(date(2026, 7, 1)));
    }

    #[test]
    fn test_inactive_rate_is_never_applicable() {
        let rate = TaxRate {
            id: TaxRateId::new(),
            owner_id: OwnerId::new(),
            name: "VAT".to_string(),
            rate_basis_points: 1800,
            country_code: "DE".to_string(),
            is_active: false,
            valid_from: None,
            valid_until: None,
        };
        assert!(!rate.is_applicable_on(date(2026, 1, 1)));
    }

    #[test]
    fn test_discount_redemption_cap() {
        let mut discount = Discount {
            id: DiscountId::new(),
            owner_id: OwnerId::new(),
            code: "LAUNCH10".to_string(),
            kind: DiscountKind::Percent,
            value: 1000,
            is_active: true,
            valid_from: None,
            valid_until: None,
            redemption_limit: Some(2),
            redemption_count: 1,
        };
        assert!(discount.is_applicable_on(date(2026, 1, 1)));
        discount.redemption_count = 2;
        assert!(!discount.is_applicable_on(date(2026, 1, 1)));
    }
}
