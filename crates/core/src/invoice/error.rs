//! Invoice error types.

use thiserror::Error;

use super::types::InvoiceStatus;

/// Errors that can occur during invoice operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    /// Line items may only change while the document is a draft.
    #[error("Line items cannot be modified in status {0}; only draft invoices are editable")]
    NotEditable(InvoiceStatus),

    /// Only drafts may be deleted.
    #[error("Invoice in status {0} cannot be deleted; only drafts can")]
    NotDeletable(InvoiceStatus),

    /// Only drafts may be issued.
    #[error("Invoice in status {0} cannot be issued; only drafts can")]
    NotIssuable(InvoiceStatus),

    /// Paid and void documents cannot be voided.
    #[error("Invoice in status {0} cannot be voided")]
    NotVoidable(InvoiceStatus),

    /// A draft needs at least one line item before issuance.
    #[error("Cannot issue an invoice with no line items")]
    NoLineItems,

    /// Net terms must be non-negative.
    #[error("Net terms must be non-negative, got {0}")]
    InvalidNetTerms(i32),

    /// Line description must not be empty.
    #[error("Line item description must not be empty")]
    EmptyDescription,

    /// Due date arithmetic left the representable calendar range.
    #[error("Due date out of range for net terms {0}")]
    DueDateOutOfRange(i32),
}
