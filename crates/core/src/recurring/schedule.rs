//! Calendar-aware schedule arithmetic.

use chrono::{Datelike, Days, Months, NaiveDate};

use super::types::BillingInterval;

/// Advances a billing date by `interval_count * interval`.
///
/// Month-based cadences add whole months and clamp the day to the last
/// valid day of the target month (Jan 31 + 1 month = Feb 28). Without an
/// anchor day the clamped day carries forward on subsequent advances
/// (Feb 28 + 1 month = Mar 28); with `billing_day_of_month` set, each
/// advance re-anchors to that day, clamped per month (... = Mar 31).
///
/// Returns `None` if the result leaves chrono's representable range.
#[must_use]
pub fn advance_date(
    current: NaiveDate,
    interval: BillingInterval,
    interval_count: u32,
    billing_day_of_month: Option<u32>,
) -> Option<NaiveDate> {
    if let Some(months_per) = interval.months() {
        let months = months_per.checked_mul(interval_count)?;
        let advanced = current.checked_add_months(Months::new(months))?;
        match billing_day_of_month {
            None => Some(advanced),
            Some(day) => clamp_to_day(advanced, day),
        }
    } else {
        let days_per = interval.days()?;
        let days = days_per.checked_mul(u64::from(interval_count))?;
        current.checked_add_days(Days::new(days))
    }
}

/// Sets the day-of-month, clamping to the month's last valid day.
fn clamp_to_day(date: NaiveDate, day: u32) -> Option<NaiveDate> {
    date.with_day(day).or_else(|| {
        // Requested day exceeds month length; take the last day instead.
        let first_of_next = date
            .with_day(1)?
            .checked_add_months(Months::new(1))?;
        first_of_next.checked_sub_days(Days::new(1))
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_clamps_to_short_month() {
        // 2026 is not a leap year
        assert_eq!(
            advance_date(date(2026, 1, 31), BillingInterval::Monthly, 1, None),
            Some(date(2026, 2, 28))
        );
    }

    #[test]
    fn test_monthly_without_anchor_keeps_clamped_day() {
        // Jan 31 -> Feb 28 -> Mar 28: the clamp is permanent without an anchor
        let feb = advance_date(date(2026, 1, 31), BillingInterval::Monthly, 1, None).unwrap();
        assert_eq!(feb, date(2026, 2, 28));
        let mar = advance_date(feb, BillingInterval::Monthly, 1, None).unwrap();
        assert_eq!(mar, date(2026, 3, 28));
    }

    #[test]
    fn test_monthly_with_anchor_recovers_after_short_month() {
        // With billing day 31, March snaps back to the 31st
        let feb = advance_date(date(2026, 1, 31), BillingInterval::Monthly, 1, Some(31)).unwrap();
        assert_eq!(feb, date(2026, 2, 28));
        let mar = advance_date(feb, BillingInterval::Monthly, 1, Some(31)).unwrap();
        assert_eq!(mar, date(2026, 3, 31));
    }

    #[test]
    fn test_leap_year_february() {
        assert_eq!(
            advance_date(date(2028, 1, 31), BillingInterval::Monthly, 1, None),
            Some(date(2028, 2, 29))
        );
    }

    #[rstest]
    #[case(BillingInterval::Daily, 1, date(2026, 3, 2))]
    #[case(BillingInterval::Daily, 10, date(2026, 3, 11))]
    #[case(BillingInterval::Weekly, 1, date(2026, 3, 8))]
    #[case(BillingInterval::Weekly, 2, date(2026, 3, 15))]
    fn test_day_based_intervals(
        #[case] interval: BillingInterval,
        #[case] count: u32,
        #[case] expected: NaiveDate,
    ) {
        assert_eq!(
            advance_date(date(2026, 3, 1), interval, count, None),
            Some(expected)
        );
    }

    #[test]
    fn test_quarterly_and_yearly() {
        assert_eq!(
            advance_date(date(2026, 11, 30), BillingInterval::Quarterly, 1, None),
            Some(date(2027, 2, 28))
        );
        assert_eq!(
            advance_date(date(2026, 2, 28), BillingInterval::Yearly, 1, None),
            Some(date(2027, 2, 28))
        );
    }

    #[test]
    fn test_multi_month_count() {
        assert_eq!(
            advance_date(date(2026, 1, 15), BillingInterval::Monthly, 3, None),
            Some(date(2026, 4, 15))
        );
    }

    #[test]
    fn test_anchor_day_in_long_month() {
        assert_eq!(
            advance_date(date(2026, 4, 30), BillingInterval::Monthly, 1, Some(31)),
            Some(date(2026, 5, 31))
        );
    }
}
