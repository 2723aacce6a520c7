//! Recurring invoice schedules and generation.
//!
//! A recurring invoice is a template that instantiates real invoices on a
//! cadence:
//! - `active <-> paused`, `cancelled` by operator action, `completed` set
//!   automatically when the occurrence limit or end date is reached
//! - Calendar-aware schedule advancement with day-of-month clamping
//! - A generation decision that the repository layer executes atomically so
//!   one period never yields two invoices

pub mod error;
pub mod schedule;
pub mod service;
pub mod types;

#[cfg(test)]
mod schedule_props;

pub use error::RecurringError;
pub use schedule::advance_date;
pub use service::RecurringService;
pub use types::{
    BillingInterval, GenerationPlan, NewRecurringInvoice, RecurringLineItem, RecurringSchedule,
    RecurringStatus,
};
