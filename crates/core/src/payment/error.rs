//! Payment and credit note error types.

use thiserror::Error;

use faktura_shared::types::money::Currency;

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the payment ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// Payment amounts must be positive.
    #[error("Payment amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// Paying more than is due would push the invoice negative.
    #[error("Payment of {amount} exceeds amount due {amount_due}")]
    ExceedsAmountDue {
        /// Attempted payment amount.
        amount: i64,
        /// Outstanding balance at the time of the attempt.
        amount_due: i64,
    },

    /// Drafts and void documents cannot accept payments.
    #[error("Invoice in status {0} cannot accept payments")]
    InvoiceNotPayable(InvoiceStatus),

    /// The ledger sums to more than the invoice total. Indicates a lost
    /// serialization guarantee, not bad caller input.
    #[error("Recorded payments {paid} exceed invoice total {total}")]
    LedgerExceedsTotal {
        /// Sum of ledger events.
        paid: i64,
        /// Invoice total.
        total: i64,
    },

    /// Ledger sum does not fit in 64 bits.
    #[error("Payment ledger sum overflows the representable range")]
    AmountOverflow,
}

/// Errors that can occur on credit notes.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CreditNoteError {
    /// Credit note amounts must be positive.
    #[error("Credit note amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// Reason must not be empty.
    #[error("Credit note reason must not be empty")]
    EmptyReason,

    /// Application exceeds the unconsumed value.
    #[error("Application of {amount} exceeds remaining credit {remaining}")]
    ExceedsRemaining {
        /// Attempted application amount.
        amount: i64,
        /// Unconsumed value at the time of the attempt.
        remaining: i64,
    },

    /// Application exceeds the invoice's outstanding balance.
    #[error("Application of {amount} exceeds invoice amount due {amount_due}")]
    ExceedsAmountDue {
        /// Attempted application amount.
        amount: i64,
        /// Outstanding balance of the target invoice.
        amount_due: i64,
    },

    /// The target invoice cannot accept payments.
    #[error("Invoice in status {0} cannot accept credit note applications")]
    InvoiceNotPayable(InvoiceStatus),

    /// Credit note and invoice currencies differ.
    #[error("Credit note currency {credit_note} does not match invoice currency {invoice}")]
    CurrencyMismatch {
        /// Currency of the credit note.
        credit_note: Currency,
        /// Currency of the target invoice.
        invoice: Currency,
    },

    /// Notes with recorded applications are part of the audit trail.
    #[error("Credit note with {0} application(s) cannot be deleted")]
    HasApplications(usize),
}
