//! Core invoicing logic for Faktura.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `catalog` - Tax rates and discount codes with validity windows
//! - `pricing` - Per-line price, discount, and tax computation
//! - `invoice` - Invoice aggregate and its status state machine
//! - `payment` - Payment ledger and credit note accounting
//! - `recurring` - Recurring invoice schedules and generation
//! - `currency` - Minor-unit conversion against external exchange rates

pub mod catalog;
pub mod currency;
pub mod invoice;
pub mod payment;
pub mod pricing;
pub mod recurring;
