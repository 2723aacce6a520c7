//! Recurring invoice domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use faktura_shared::types::money::Currency;
use faktura_shared::types::{CustomerId, DiscountId, RecurringLineItemId, TaxRateId};

use crate::pricing::TaxBehavior;

/// Recurring invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringStatus {
    /// Eligible for generation.
    Active,
    /// Temporarily suspended by an operator.
    Paused,
    /// Stopped by an operator. Terminal.
    Cancelled,
    /// Ran out of occurrences or passed its end date. Terminal.
    Completed,
}

impl RecurringStatus {
    /// Returns true if the template may generate invoices.
    #[must_use]
    pub fn can_generate(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

impl std::fmt::Display for RecurringStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// Billing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    /// Every day.
    Daily,
    /// Every seven days.
    Weekly,
    /// Every calendar month.
    Monthly,
    /// Every three calendar months.
    Quarterly,
    /// Every twelve calendar months.
    Yearly,
}

impl BillingInterval {
    /// Months per interval for month-based cadences, `None` for day-based.
    #[must_use]
    pub const fn months(self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Yearly => Some(12),
            Self::Daily | Self::Weekly => None,
        }
    }

    /// Days per interval for day-based cadences, `None` for month-based.
    #[must_use]
    pub const fn days(self) -> Option<u64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Monthly | Self::Quarterly | Self::Yearly => None,
        }
    }
}

/// The schedule state of a recurring invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSchedule {
    /// Billing cadence.
    pub interval: BillingInterval,
    /// Number of intervals between generations, at least 1.
    pub interval_count: u32,
    /// Anchor day for month-based cadences; when set, advancement re-anchors
    /// to this day (clamped to month length) instead of drifting.
    pub billing_day_of_month: Option<u32>,
    /// First billing date.
    pub start_date: NaiveDate,
    /// Last date a document may be scheduled for, if bounded.
    pub end_date: Option<NaiveDate>,
    /// Maximum number of generations, if capped.
    pub occurrences_limit: Option<u32>,
    /// Generations so far.
    pub occurrences_count: u32,
    /// Next date a document is due to be generated.
    pub next_billing_date: NaiveDate,
    /// Lifecycle status.
    pub status: RecurringStatus,
}

/// A template line, same shape as an invoice line but never priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringLineItem {
    /// Unique identifier.
    pub id: RecurringLineItemId,
    /// Human-readable description.
    pub description: String,
    /// Quantity, a positive decimal.
    pub quantity: Decimal,
    /// Unit price in minor units.
    pub unit_amount: i64,
    /// Catalog tax rate to price generated lines with, if any.
    pub tax_rate_id: Option<TaxRateId>,
    /// Catalog discount to price generated lines with, if any.
    pub discount_id: Option<DiscountId>,
}

/// Input for creating a recurring invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecurringInvoice {
    /// Template name, e.g. "Monthly retainer".
    pub name: String,
    /// Customer generated invoices are addressed to.
    pub customer_id: CustomerId,
    /// Currency of generated invoices.
    pub currency: Currency,
    /// Tax behavior of generated invoices.
    pub tax_behavior: TaxBehavior,
    /// Net terms of generated invoices.
    pub net_terms_days: i32,
    /// Billing cadence.
    pub interval: BillingInterval,
    /// Number of intervals between generations.
    pub interval_count: u32,
    /// Anchor day for month-based cadences.
    pub billing_day_of_month: Option<u32>,
    /// First billing date.
    pub start_date: NaiveDate,
    /// Last date a document may be scheduled for.
    pub end_date: Option<NaiveDate>,
    /// Maximum number of generations.
    pub occurrences_limit: Option<u32>,
}

/// The atomic outcome of one generation step.
///
/// The repository layer must persist the new invoice and this advance as a
/// single unit keyed on the previous `next_billing_date`; a caller that
/// loses that race observes the already-advanced date and must not create
/// a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationPlan {
    /// Billing period the generated invoice covers (the old next date).
    pub period: NaiveDate,
    /// Schedule date after this generation.
    pub next_billing_date: NaiveDate,
    /// Occurrence counter after this generation.
    pub occurrences_count: u32,
    /// Status after this generation; `Completed` when the limit or end
    /// date has been reached.
    pub status: RecurringStatus,
}
