//! Invoice aggregate and status state machine.
//!
//! An invoice starts as a mutable draft of line items and becomes an
//! immutable, auditable financial document at issuance:
//! - `draft -> issued -> partially_paid -> paid`, with `past_due` overlaying
//!   unpaid documents past their due date and `void` as the pre-paid terminal
//! - Line items may only change while the document is a draft
//! - Issuance assigns a sequence number unique per owner and year
//! - Status is derived from the payment ledger, never stored authoritatively

pub mod error;
pub mod events;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::InvoiceError;
pub use events::InvoiceEvent;
pub use service::InvoiceService;
pub use types::{InvoiceNumber, InvoiceStatus, IssueOutcome, LineItemInput, NewInvoice};
