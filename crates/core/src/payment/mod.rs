//! Payment ledger and credit note accounting.
//!
//! The ledger of payment events is the single accounting trail an invoice's
//! paid/due figures are derived from:
//! - Payments are immutable once created; deleting one triggers a
//!   recalculation from the remaining events
//! - Credit notes are standalone stores of value consumed across invoices;
//!   each application also records a payment so the ledger stays authoritative
//! - No sequence of events can push an invoice past its total or a credit
//!   note below zero

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::{CreditNoteError, PaymentError};
pub use service::PaymentService;
pub use types::{
    ApplicationOutcome, CreditNote, CreditNoteStatus, NewCreditNote, NewPayment, PaymentMethod,
    PaymentTally,
};
