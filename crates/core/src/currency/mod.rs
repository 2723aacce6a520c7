//! Minor-unit currency conversion.
//!
//! Conversion is display-side only: dashboard and export figures may be
//! converted through an external rate, but the integer amounts stored on
//! invoices, payments, and credit notes are always in the document's own
//! currency and never touched by a rate.

pub mod conversion;

pub use conversion::{RateQuote, convert_minor};
