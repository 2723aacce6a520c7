//! Recurring invoice error types.

use chrono::NaiveDate;
use thiserror::Error;

use super::types::RecurringStatus;

/// Errors that can occur on recurring invoices.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurringError {
    /// Name must not be empty.
    #[error("Recurring invoice name must not be empty")]
    EmptyName,

    /// Interval count must be at least 1.
    #[error("Interval count must be at least 1, got {0}")]
    InvalidIntervalCount(u32),

    /// Billing day must be between 1 and 31.
    #[error("Billing day of month must be between 1 and 31, got {0}")]
    InvalidBillingDay(u32),

    /// Billing day only applies to month-based cadences.
    #[error("Billing day of month is only valid for monthly, quarterly, or yearly intervals")]
    BillingDayNotApplicable,

    /// End date must come after the start date.
    #[error("End date {end} is not after start date {start}")]
    InvalidEndDate {
        /// Schedule start.
        start: NaiveDate,
        /// Rejected end date.
        end: NaiveDate,
    },

    /// Occurrences limit must be at least 1.
    #[error("Occurrences limit must be at least 1")]
    InvalidOccurrencesLimit,

    /// Only active templates can generate.
    #[error("Recurring invoice in status {0} cannot generate; only active templates can")]
    NotActive(RecurringStatus),

    /// The schedule gate has not been reached.
    #[error("Next billing date {0} has not been reached")]
    NotDue(NaiveDate),

    /// The requested operator transition is not allowed.
    #[error("Cannot {action} a recurring invoice in status {from}")]
    InvalidTransition {
        /// Current status.
        from: RecurringStatus,
        /// Attempted action: "pause", "resume", or "cancel".
        action: &'static str,
    },

    /// A template needs at least one line to generate from.
    #[error("Cannot generate from a template with no line items")]
    NoTemplateLines,

    /// Date arithmetic left the representable calendar range.
    #[error("Schedule advancement out of calendar range")]
    ScheduleOverflow,
}
