//! `SeaORM` entity definitions.

pub mod credit_note_applications;
pub mod credit_notes;
pub mod discounts;
pub mod invoice_events;
pub mod invoice_line_items;
pub mod invoice_sequences;
pub mod invoices;
pub mod payments;
pub mod recurring_invoices;
pub mod recurring_line_items;
pub mod sea_orm_active_enums;
pub mod tax_rates;
