//! Recurring invoice lifecycle and generation decisions.

use chrono::NaiveDate;

use super::error::RecurringError;
use super::schedule::advance_date;
use super::types::{
    GenerationPlan, NewRecurringInvoice, RecurringLineItem, RecurringSchedule, RecurringStatus,
};
use crate::invoice::LineItemInput;

/// Stateless recurring invoice logic.
///
/// The repository layer executes a `GenerationPlan` atomically (snapshot,
/// issue, advance) with a compare-and-swap on the previous billing date;
/// this service only decides what that unit should do.
pub struct RecurringService;

impl RecurringService {
    /// Validates a recurring invoice creation input.
    ///
    /// # Errors
    ///
    /// Returns `RecurringError` if any schedule field is out of range.
    pub fn validate_new(input: &NewRecurringInvoice) -> Result<(), RecurringError> {
        if input.name.trim().is_empty() {
            return Err(RecurringError::EmptyName);
        }
        if input.interval_count == 0 {
            return Err(RecurringError::InvalidIntervalCount(input.interval_count));
        }
        if let Some(day) = input.billing_day_of_month {
            if input.interval.months().is_none() {
                return Err(RecurringError::BillingDayNotApplicable);
            }
            if !(1..=31).contains(&day) {
                return Err(RecurringError::InvalidBillingDay(day));
            }
        }
        if let Some(end) = input.end_date
            && end <= input.start_date
        {
            return Err(RecurringError::InvalidEndDate {
                start: input.start_date,
                end,
            });
        }
        if input.occurrences_limit == Some(0) {
            return Err(RecurringError::InvalidOccurrencesLimit);
        }
        Ok(())
    }

    /// Pauses an active template.
    ///
    /// # Errors
    ///
    /// Returns `RecurringError::InvalidTransition` from any other status.
    pub fn pause(status: RecurringStatus) -> Result<RecurringStatus, RecurringError> {
        match status {
            RecurringStatus::Active => Ok(RecurringStatus::Paused),
            from => Err(RecurringError::InvalidTransition {
                from,
                action: "pause",
            }),
        }
    }

    /// Resumes a paused template.
    ///
    /// # Errors
    ///
    /// Returns `RecurringError::InvalidTransition` from any other status.
    pub fn resume(status: RecurringStatus) -> Result<RecurringStatus, RecurringError> {
        match status {
            RecurringStatus::Paused => Ok(RecurringStatus::Active),
            from => Err(RecurringError::InvalidTransition {
                from,
                action: "resume",
            }),
        }
    }

    /// Cancels an active or paused template. Terminal.
    ///
    /// # Errors
    ///
    /// Returns `RecurringError::InvalidTransition` from terminal statuses.
    pub fn cancel(status: RecurringStatus) -> Result<RecurringStatus, RecurringError> {
        match status {
            RecurringStatus::Active | RecurringStatus::Paused => Ok(RecurringStatus::Cancelled),
            from => Err(RecurringError::InvalidTransition {
                from,
                action: "cancel",
            }),
        }
    }

    /// Decides whether and how one generation step should run.
    ///
    /// `manual` bypasses the date gate but never the status gate: operators
    /// may bill early, but only from an active template. The returned plan's
    /// `period` is the previous billing date, which the repository uses as
    /// the compare-and-swap key.
    ///
    /// # Errors
    ///
    /// Returns `RecurringError::NotActive` for non-active templates,
    /// `RecurringError::NotDue` for scheduler calls ahead of the gate, and
    /// `RecurringError::NoTemplateLines` for empty templates.
    pub fn decide_generation(
        schedule: &RecurringSchedule,
        line_count: usize,
        today: NaiveDate,
        manual: bool,
    ) -> Result<GenerationPlan, RecurringError> {
        if !schedule.status.can_generate() {
            return Err(RecurringError::NotActive(schedule.status));
        }
        if !manual && schedule.next_billing_date > today {
            return Err(RecurringError::NotDue(schedule.next_billing_date));
        }
        if line_count == 0 {
            return Err(RecurringError::NoTemplateLines);
        }

        let next_billing_date = advance_date(
            schedule.next_billing_date,
            schedule.interval,
            schedule.interval_count,
            schedule.billing_day_of_month,
        )
        .ok_or(RecurringError::ScheduleOverflow)?;

        let occurrences_count = schedule.occurrences_count + 1;
        let limit_reached = schedule
            .occurrences_limit
            .is_some_and(|limit| occurrences_count >= limit);
        let past_end = schedule.end_date.is_some_and(|end| next_billing_date > end);

        Ok(GenerationPlan {
            period: schedule.next_billing_date,
            next_billing_date,
            occurrences_count,
            status: if limit_reached || past_end {
                RecurringStatus::Completed
            } else {
                RecurringStatus::Active
            },
        })
    }

    /// Snapshots template lines into draft line inputs.
    ///
    /// Generated invoices carry copies; the template stays mutable without
    /// ever touching documents it already produced.
    #[must_use]
    pub fn snapshot_lines(lines: &[RecurringLineItem]) -> Vec<LineItemInput> {
        lines
            .iter()
            .map(|line| LineItemInput {
                description: line.description.clone(),
                quantity: line.quantity,
                unit_amount: line.unit_amount,
                tax_rate_id: line.tax_rate_id,
                discount_id: line.discount_id,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use faktura_shared::types::CustomerId;
    use faktura_shared::types::money::Currency;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::pricing::TaxBehavior;
    use crate::recurring::types::BillingInterval;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly_schedule(next: NaiveDate) -> RecurringSchedule {
        RecurringSchedule {
            interval: BillingInterval::Monthly,
            interval_count: 1,
            billing_day_of_month: None,
            start_date: date(2026, 1, 31),
            end_date: None,
            occurrences_limit: None,
            occurrences_count: 0,
            next_billing_date: next,
            status: RecurringStatus::Active,
        }
    }

    fn new_input() -> NewRecurringInvoice {
        NewRecurringInvoice {
            name: "Monthly retainer".to_string(),
            customer_id: CustomerId::new(),
            currency: Currency::Usd,
            tax_behavior: TaxBehavior::Exclusive,
            net_terms_days: 14,
            interval: BillingInterval::Monthly,
            interval_count: 1,
            billing_day_of_month: None,
            start_date: date(2026, 1, 31),
            end_date: None,
            occurrences_limit: None,
        }
    }

    #[test]
    fn test_generation_advances_through_short_months() {
        // Start Jan 31: first generation bills Jan 31, next lands Feb 28,
        // the one after that Mar 28.
        let schedule = monthly_schedule(date(2026, 1, 31));
        let plan =
            RecurringService::decide_generation(&schedule, 1, date(2026, 1, 31), false).unwrap();
        assert_eq!(plan.period, date(2026, 1, 31));
        assert_eq!(plan.next_billing_date, date(2026, 2, 28));
        assert_eq!(plan.occurrences_count, 1);
        assert_eq!(plan.status, RecurringStatus::Active);

        let mut schedule = monthly_schedule(plan.next_billing_date);
        schedule.occurrences_count = plan.occurrences_count;
        let plan =
            RecurringService::decide_generation(&schedule, 1, date(2026, 2, 28), false).unwrap();
        assert_eq!(plan.next_billing_date, date(2026, 3, 28));
    }

    #[test]
    fn test_scheduler_call_before_gate_is_not_due() {
        let schedule = monthly_schedule(date(2026, 5, 1));
        assert_eq!(
            RecurringService::decide_generation(&schedule, 1, date(2026, 4, 30), false),
            Err(RecurringError::NotDue(date(2026, 5, 1)))
        );
    }

    #[test]
    fn test_manual_call_bypasses_date_gate_only() {
        let mut schedule = monthly_schedule(date(2026, 5, 1));
        assert!(RecurringService::decide_generation(&schedule, 1, date(2026, 4, 1), true).is_ok());

        schedule.status = RecurringStatus::Paused;
        assert_eq!(
            RecurringService::decide_generation(&schedule, 1, date(2026, 4, 1), true),
            Err(RecurringError::NotActive(RecurringStatus::Paused))
        );
    }

    #[test]
    fn test_empty_template_cannot_generate() {
        let schedule = monthly_schedule(date(2026, 1, 31));
        assert_eq!(
            RecurringService::decide_generation(&schedule, 0, date(2026, 2, 1), false),
            Err(RecurringError::NoTemplateLines)
        );
    }

    #[test]
    fn test_occurrence_limit_completes_the_template() {
        let mut schedule = monthly_schedule(date(2026, 1, 31));
        schedule.occurrences_limit = Some(3);
        schedule.occurrences_count = 2;
        let plan =
            RecurringService::decide_generation(&schedule, 1, date(2026, 1, 31), false).unwrap();
        assert_eq!(plan.occurrences_count, 3);
        assert_eq!(plan.status, RecurringStatus::Completed);
    }

    #[test]
    fn test_end_date_completes_the_template() {
        let mut schedule = monthly_schedule(date(2026, 1, 31));
        schedule.end_date = Some(date(2026, 2, 15));
        let plan =
            RecurringService::decide_generation(&schedule, 1, date(2026, 1, 31), false).unwrap();
        // Next date Feb 28 exceeds the end date, so this was the last run.
        assert_eq!(plan.status, RecurringStatus::Completed);
    }

    #[rstest]
    #[case(RecurringStatus::Paused)]
    #[case(RecurringStatus::Cancelled)]
    #[case(RecurringStatus::Completed)]
    fn test_only_active_generates(#[case] status: RecurringStatus) {
        let mut schedule = monthly_schedule(date(2026, 1, 31));
        schedule.status = status;
        assert_eq!(
            RecurringService::decide_generation(&schedule, 1, date(2026, 2, 1), false),
            Err(RecurringError::NotActive(status))
        );
    }

    #[test]
    fn test_operator_transitions() {
        assert_eq!(
            RecurringService::pause(RecurringStatus::Active),
            Ok(RecurringStatus::Paused)
        );
        assert_eq!(
            RecurringService::resume(RecurringStatus::Paused),
            Ok(RecurringStatus::Active)
        );
        assert_eq!(
            RecurringService::cancel(RecurringStatus::Active),
            Ok(RecurringStatus::Cancelled)
        );
        assert_eq!(
            RecurringService::cancel(RecurringStatus::Paused),
            Ok(RecurringStatus::Cancelled)
        );
    }

    #[rstest]
    #[case(RecurringStatus::Cancelled)]
    #[case(RecurringStatus::Completed)]
    fn test_terminal_statuses_reject_operator_actions(#[case] status: RecurringStatus) {
        assert!(RecurringService::pause(status).is_err());
        assert!(RecurringService::resume(status).is_err());
        assert!(RecurringService::cancel(status).is_err());
    }

    #[test]
    fn test_validate_new_rejects_bad_schedules() {
        let mut input = new_input();
        input.interval_count = 0;
        assert_eq!(
            RecurringService::validate_new(&input),
            Err(RecurringError::InvalidIntervalCount(0))
        );

        let mut input = new_input();
        input.billing_day_of_month = Some(32);
        assert_eq!(
            RecurringService::validate_new(&input),
            Err(RecurringError::InvalidBillingDay(32))
        );

        let mut input = new_input();
        input.interval = BillingInterval::Weekly;
        input.billing_day_of_month = Some(15);
        assert_eq!(
            RecurringService::validate_new(&input),
            Err(RecurringError::BillingDayNotApplicable)
        );

        let mut input = new_input();
        input.end_date = Some(date(2026, 1, 1));
        assert!(matches!(
            RecurringService::validate_new(&input),
            Err(RecurringError::InvalidEndDate { .. })
        ));

        let mut input = new_input();
        input.occurrences_limit = Some(0);
        assert_eq!(
            RecurringService::validate_new(&input),
            Err(RecurringError::InvalidOccurrencesLimit)
        );
    }

    #[test]
    fn test_snapshot_copies_template_lines() {
        let lines = vec![RecurringLineItem {
            id: faktura_shared::types::RecurringLineItemId::new(),
            description: "Retainer".to_string(),
            quantity: dec!(1),
            unit_amount: 150_000,
            tax_rate_id: None,
            discount_id: None,
        }];
        let snapshot = RecurringService::snapshot_lines(&lines);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].description, "Retainer");
        assert_eq!(snapshot[0].unit_amount, 150_000);
    }
}
