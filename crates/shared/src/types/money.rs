//! Money in integer minor units with currency.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every stored amount is an `i64` in the currency's minor unit (cents,
//! yen, ...). Percentages are basis points (10000 bp = 100%).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of basis points in 100%.
pub const BASIS_POINT_SCALE: i64 = 10_000;

/// Represents a monetary amount with currency.
///
/// The amount is an integer in the currency's minor unit; decimal rendering
/// happens only at display/export boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit (e.g., cents).
    pub amount: i64,
    /// ISO 4217 currency code (e.g., "USD", "IDR").
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Indonesian Rupiah
    Idr,
    /// Euro
    Eur,
    /// Singapore Dollar
    Sgd,
    /// Japanese Yen
    Jpy,
}

impl Money {
    /// Creates a new Money instance.
    #[must_use]
    pub const fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.amount < 0
    }

    /// Adds another amount of the same currency.
    ///
    /// Returns `None` on currency mismatch or overflow.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        Some(Self {
            amount: self.amount.checked_add(other.amount)?,
            currency: self.currency,
        })
    }

    /// Renders the amount as a decimal string for display or export.
    ///
    /// Storage stays integer; this is the only sanctioned conversion to
    /// decimal form.
    #[must_use]
    pub fn to_decimal_string(&self) -> String {
        Decimal::new(self.amount, self.currency.exponent()).to_string()
    }
}

impl Currency {
    /// Number of minor-unit digits for this currency.
    #[must_use]
    pub const fn exponent(self) -> u32 {
        match self {
            Self::Jpy | Self::Idr => 0,
            Self::Usd | Self::Eur | Self::Sgd => 2,
        }
    }
}

/// Multiplies `amount * numerator / denominator` rounding half-up.
///
/// Operands must be non-negative; intermediate math runs in i128 so the
/// product cannot overflow for any realistic invoice amount.
#[must_use]
pub fn mul_div_half_up(amount: i64, numerator: i64, denominator: i64) -> i64 {
    debug_assert!(amount >= 0 && numerator >= 0 && denominator > 0);
    let product = i128::from(amount) * i128::from(numerator);
    let den = i128::from(denominator);
    // floor((2p + d) / 2d) == round-half-up(p / d) for non-negative p
    let rounded = (product * 2 + den) / (den * 2);
    i64::try_from(rounded).unwrap_or(i64::MAX)
}

/// Applies a basis-point rate to an amount, rounding half-up.
#[must_use]
pub fn apply_basis_points(amount: i64, basis_points: i64) -> i64 {
    mul_div_half_up(amount, basis_points, BASIS_POINT_SCALE)
}

/// Multiplies a decimal quantity by an integer unit amount, rounding the
/// result half-up to the nearest minor unit.
///
/// Returns `None` if the product does not fit in an `i64`.
#[must_use]
pub fn scale_by_quantity(quantity: Decimal, unit_amount: i64) -> Option<i64> {
    let raw = quantity.checked_mul(Decimal::from(unit_amount))?;
    raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Idr => write!(f, "IDR"),
            Self::Eur => write!(f, "EUR"),
            Self::Sgd => write!(f, "SGD"),
            Self::Jpy => write!(f, "JPY"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "IDR" => Ok(Self::Idr),
            "EUR" => Ok(Self::Eur),
            "SGD" => Ok(Self::Sgd),
            "JPY" => Ok(Self::Jpy),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
