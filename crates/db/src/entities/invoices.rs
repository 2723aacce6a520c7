//! `SeaORM` Entity for the invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{InvoiceStatus, TaxBehavior};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub customer_id: Uuid,
    pub currency: String,
    pub tax_behavior: TaxBehavior,
    pub net_terms_days: i32,
    pub status: InvoiceStatus,
    /// Assigned at issuance, e.g. "INV-2026-0042". Never reused.
    pub number: Option<String>,
    pub sequence_year: Option<i32>,
    pub sequence_number: Option<i64>,
    pub subtotal: i64,
    pub tax_total: i64,
    pub total: i64,
    pub amount_paid: i64,
    pub amount_due: i64,
    pub issued_at: Option<Date>,
    pub due_at: Option<Date>,
    /// Optimistic concurrency guard; every mutation bumps it.
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_line_items::Entity")]
    InvoiceLineItems,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
    #[sea_orm(has_many = "super::invoice_events::Entity")]
    InvoiceEvents,
}

impl Related<super::invoice_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceLineItems.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::invoice_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
