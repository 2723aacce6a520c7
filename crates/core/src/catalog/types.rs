//! Catalog domain types: tax rates and discount codes.

use chrono::NaiveDate;
use faktura_shared::types::{DiscountId, OwnerId, TaxRateId};
use serde::{Deserialize, Serialize};

/// A tax rate expressed in basis points (1/100 of a percent).
///
/// Once a line item on an issued invoice references a rate, the line keeps
/// the basis-point value it was priced with; editing the catalog entry never
/// changes historical documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    /// Unique identifier.
    pub id: TaxRateId,
    /// Owning account.
    pub owner_id: OwnerId,
    /// Display name, e.g. "VAT 18%".
    pub name: String,
    /// Rate in basis points (10000 = 100%).
    pub rate_basis_points: i64,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Whether the rate may be attached to new lines.
    pub is_active: bool,
    /// Start of the validity window (inclusive).
    pub valid_from: Option<NaiveDate>,
    /// End of the validity window (exclusive).
    pub valid_until: Option<NaiveDate>,
}

impl TaxRate {
    /// Returns true if the rate is active and `date` falls inside the
    /// half-open validity window `[valid_from, valid_until)`.
    #[must_use]
    pub fn is_applicable_on(&self, date: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(from) = self.valid_from
            && date < from
        {
            return false;
        }
        if let Some(until) = self.valid_until
            && date >= until
        {
            return false;
        }
        true
    }
}

/// Discount kind: percentage of the line subtotal or a fixed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Value is in basis points of the line subtotal.
    Percent,
    /// Value is a fixed amount in minor units.
    Fixed,
}

/// A discount code redeemable against invoice line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Unique identifier.
    pub id: DiscountId,
    /// Owning account.
    pub owner_id: OwnerId,
    /// Code, unique per owner.
    pub code: String,
    /// Percent or fixed.
    pub kind: DiscountKind,
    /// Basis points if percent, minor units if fixed.
    pub value: i64,
    /// Whether the discount may be attached to new lines.
    pub is_active: bool,
    /// Start of the validity window (inclusive).
    pub valid_from: Option<NaiveDate>,
    /// End of the validity window (exclusive).
    pub valid_until: Option<NaiveDate>,
    /// Maximum number of redemptions, if capped.
    pub redemption_limit: Option<i64>,
    /// Number of redemptions so far.
    pub redemption_count: i64,
}

impl Discount {
    /// Returns true if the discount is active, inside its validity window on
    /// `date`, and has redemptions left.
    #[must_use]
    pub fn is_applicable_on(&self, date: NaiveDate) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(from) = self.valid_from
            && date < from
        {
            return false;
        }
        if let Some(until) = self.valid_until
            && date >= until
        {
            return false;
        }
        self.has_redemptions_left()
    }

    /// Returns true if the redemption cap has not been reached.
    #[must_use]
    pub fn has_redemptions_left(&self) -> bool {
        match self.redemption_limit {
            Some(limit) => self.redemption_count < limit,
            None => true,
        }
    }
}

/// Input for creating or updating a tax rate.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTaxRate {
    /// Display name.
    pub name: String,
    /// Rate in basis points.
    pub rate_basis_points: i64,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: String,
    /// Start of the validity window (inclusive).
    pub valid_from: Option<NaiveDate>,
    /// End of the validity window (exclusive).
    pub valid_until: Option<NaiveDate>,
}

/// Input for creating or updating a discount.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDiscount {
    /// Code, unique per owner.
    pub code: String,
    /// Percent or fixed.
    pub kind: DiscountKind,
    /// Basis points if percent, minor units if fixed.
    pub value: i64,
    /// Start of the validity window (inclusive).
    pub valid_from: Option<NaiveDate>,
    /// End of the validity window (exclusive).
    pub valid_until: Option<NaiveDate>,
    /// Maximum number of redemptions, if capped.
    pub redemption_limit: Option<i64>,
}
