//! Invoice domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use faktura_shared::types::{CustomerId, DiscountId, TaxRateId};
use faktura_shared::types::money::Currency;

use crate::pricing::TaxBehavior;

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Mutable working copy; the only state allowing line-item edits.
    Draft,
    /// Issued and awaiting payment.
    Issued,
    /// Some, but not all, of the total has been paid.
    PartiallyPaid,
    /// Fully paid; amount due is zero.
    Paid,
    /// Past the due date with an outstanding balance.
    PastDue,
    /// Cancelled before full payment. Terminal.
    Void,
}

impl InvoiceStatus {
    /// Returns true if line items may be added, edited, or removed.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if the whole document may be deleted.
    #[must_use]
    pub fn is_deletable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true if payments may be recorded against the document.
    #[must_use]
    pub fn is_payable(&self) -> bool {
        matches!(self, Self::Issued | Self::PartiallyPaid | Self::PastDue)
    }

    /// Returns true if the document may be voided.
    ///
    /// Fully paid and already-void documents cannot be voided.
    #[must_use]
    pub fn is_voidable(&self) -> bool {
        !matches!(self, Self::Paid | Self::Void)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::PastDue => "past_due",
            Self::Void => "void",
        };
        write!(f, "{s}")
    }
}

/// A sequence number assigned at issuance, unique per owner and year.
///
/// Numbers are monotonic and gap-tolerant; voiding an invoice never frees
/// its number for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceNumber {
    /// Calendar year of issuance.
    pub year: i32,
    /// Position within the owner's sequence for that year, starting at 1.
    pub sequence: i64,
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "INV-{}-{:04}", self.year, self.sequence)
    }
}

/// Input for creating a draft invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInvoice {
    /// Customer the document is addressed to.
    pub customer_id: CustomerId,
    /// Document currency; every line and payment uses it.
    pub currency: Currency,
    /// Whether unit prices contain tax.
    pub tax_behavior: TaxBehavior,
    /// Days after issuance until the document is due.
    pub net_terms_days: i32,
}

/// Input for adding or editing a line item.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItemInput {
    /// Human-readable description.
    pub description: String,
    /// Quantity, a positive decimal (minimum 0.001).
    pub quantity: Decimal,
    /// Unit price in minor units.
    pub unit_amount: i64,
    /// Catalog tax rate to price with, if any.
    pub tax_rate_id: Option<TaxRateId>,
    /// Catalog discount to price with, if any.
    pub discount_id: Option<DiscountId>,
}

/// Result of issuing a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IssueOutcome {
    /// Assigned sequence number.
    pub number: InvoiceNumber,
    /// Issuance date.
    pub issued_at: NaiveDate,
    /// Due date: issuance plus net terms.
    pub due_at: NaiveDate,
    /// Status the document issues into. A zero total has nothing due and
    /// issues directly as paid.
    pub status: InvoiceStatus,
}
