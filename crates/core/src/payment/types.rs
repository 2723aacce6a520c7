//! Payment and credit note domain types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use faktura_shared::types::money::Currency;
use faktura_shared::types::{CreditNoteId, CustomerId, InvoiceId, OwnerId};

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer.
    BankTransfer,
    /// Cash.
    Cash,
    /// Check.
    Check,
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// Offset from a credit note application.
    CreditNote,
    /// Anything else.
    Other,
}

/// Input for recording a payment against an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPayment {
    /// Amount in minor units, positive and at most the invoice's amount due.
    pub amount: i64,
    /// Date the payment was received.
    pub payment_date: NaiveDate,
    /// How the payment was made.
    pub method: PaymentMethod,
    /// External reference, e.g. a bank statement line.
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Derived paid/due figures recomputed from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentTally {
    /// Sum of active payments.
    pub amount_paid: i64,
    /// `total - amount_paid`, never negative.
    pub amount_due: i64,
}

/// Credit note lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditNoteStatus {
    /// Value remains to be applied.
    Available,
    /// Fully consumed.
    Applied,
}

/// A standalone store of value applicable across a customer's invoices.
///
/// `remaining_amount` only ever decreases; the difference between `amount`
/// and `remaining_amount` is always the exact sum of recorded applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNote {
    /// Unique identifier.
    pub id: CreditNoteId,
    /// Owning account.
    pub owner_id: OwnerId,
    /// Customer the value belongs to.
    pub customer_id: CustomerId,
    /// Invoice the note was raised against, if any.
    pub source_invoice_id: Option<InvoiceId>,
    /// Currency of the stored value.
    pub currency: Currency,
    /// Total value at creation, in minor units.
    pub amount: i64,
    /// Unconsumed value, in minor units.
    pub remaining_amount: i64,
    /// Available or fully applied.
    pub status: CreditNoteStatus,
    /// Why the note was issued.
    pub reason: String,
    /// Display number, e.g. "CN-2026-0007".
    pub number: String,
}

/// Input for creating a credit note.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCreditNote {
    /// Customer the value belongs to.
    pub customer_id: CustomerId,
    /// Invoice the note is raised against, if any.
    pub source_invoice_id: Option<InvoiceId>,
    /// Currency of the stored value.
    pub currency: Currency,
    /// Total value in minor units, positive.
    pub amount: i64,
    /// Why the note is issued.
    pub reason: String,
}

/// Result of applying credit note value to an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationOutcome {
    /// Remaining value after the application.
    pub new_remaining: i64,
    /// Status after the application; `Applied` once remaining hits zero.
    pub new_status: CreditNoteStatus,
    /// Payment to append to the target invoice's ledger.
    pub payment: NewPayment,
}
