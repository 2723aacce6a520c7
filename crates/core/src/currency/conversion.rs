//! Pure conversion arithmetic over externally supplied rates.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use faktura_shared::types::money::Currency;

/// An exchange rate as delivered by the external rate source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateQuote {
    /// Major-unit rate: one unit of `from` buys `rate` units of `to`.
    pub rate: Decimal,
    /// When the source produced the rate.
    pub fetched_at: DateTime<Utc>,
}

impl RateQuote {
    /// Age of the quote relative to `now`.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.fetched_at
    }
}

/// Converts a minor-unit amount between currencies using a major-unit rate.
///
/// The amount is lifted to major units with the source exponent, multiplied
/// by the rate, and rounded half-up into the target's minor units. Returns
/// `None` on arithmetic overflow.
#[must_use]
pub fn convert_minor(amount: i64, from: Currency, to: Currency, rate: Decimal) -> Option<i64> {
    let major = Decimal::new(amount, from.exponent());
    let converted = major.checked_mul(rate)?;
    let scaled = converted.checked_mul(Decimal::from(10i64.checked_pow(to.exponent())?))?;
    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    // 35.40 USD at 0.9 = 31.86 EUR
    #[case(3540, Currency::Usd, Currency::Eur, dec!(0.9), Some(3186))]
    // 10.00 USD at 147.2 = 1472 JPY (zero-exponent target)
    #[case(1000, Currency::Usd, Currency::Jpy, dec!(147.2), Some(1472))]
    // 1472 JPY at 0.0068 = 10.01 USD, half-up from 10.0096
    #[case(1472, Currency::Jpy, Currency::Usd, dec!(0.0068), Some(1001))]
    // Identity rate
    #[case(3540, Currency::Usd, Currency::Usd, dec!(1), Some(3540))]
    // Zero amount
    #[case(0, Currency::Usd, Currency::Eur, dec!(0.9), Some(0))]
    fn test_convert_minor(
        #[case] amount: i64,
        #[case] from: Currency,
        #[case] to: Currency,
        #[case] rate: Decimal,
        #[case] expected: Option<i64>,
    ) {
        assert_eq!(convert_minor(amount, from, to, rate), expected);
    }

    #[test]
    fn test_half_up_at_the_boundary() {
        // 0.01 USD * 0.125 = 0.125 EUR cents, below the midpoint -> 0
        assert_eq!(
            convert_minor(1, Currency::Usd, Currency::Eur, dec!(0.125)),
            Some(0)
        );
        // 0.01 USD * 0.5 = 0.5 EUR cents, exactly the midpoint -> 1
        assert_eq!(
            convert_minor(1, Currency::Usd, Currency::Eur, dec!(0.5)),
            Some(1)
        );
    }

    #[test]
    fn test_quote_age() {
        let fetched = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let now = DateTime::parse_from_rfc3339("2026-03-01T13:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let quote = RateQuote {
            rate: dec!(0.9),
            fetched_at: fetched,
        };
        assert_eq!(quote.age(now), chrono::Duration::minutes(90));
    }
}
