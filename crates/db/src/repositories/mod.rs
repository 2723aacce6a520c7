//! Repository layer for data access.
//!
//! Each repository owns the persistence of one aggregate and calls into the
//! core services for every business decision. Concurrency control is
//! optimistic throughout: invoices and credit notes carry a version column,
//! recurring templates use their next billing date as a compare-and-swap key.

pub mod catalog;
pub mod credit_note;
pub mod dashboard;
pub mod invoice;
pub mod payment;
pub mod recurring;
mod support;

pub use catalog::{CatalogRepoError, CatalogRepository};
pub use credit_note::{ApplicationResult, CreditNoteRepoError, CreditNoteRepository};
pub use dashboard::{CurrencyOutstanding, DashboardRepoError, DashboardRepository, StatusCount};
pub use invoice::{InvoiceFilter, InvoiceRepoError, InvoiceRepository, InvoiceWithItems};
pub use payment::{PaymentOutcome, PaymentRepoError, PaymentRepository};
pub use recurring::{RecurringRepoError, RecurringRepository, RecurringWithLines};
