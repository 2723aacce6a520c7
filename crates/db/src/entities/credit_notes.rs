//! `SeaORM` Entity for the credit_notes table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use faktura_core::payment;
use faktura_shared::types::money::Currency;
use faktura_shared::types::{CreditNoteId, CustomerId, InvoiceId, OwnerId};

use super::sea_orm_active_enums::CreditNoteStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub customer_id: Uuid,
    pub source_invoice_id: Option<Uuid>,
    pub currency: String,
    pub amount: i64,
    pub remaining_amount: i64,
    pub status: CreditNoteStatus,
    pub reason: String,
    pub number: String,
    /// Optimistic concurrency guard; every application bumps it.
    pub version: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::credit_note_applications::Entity")]
    CreditNoteApplications,
}

impl Related<super::credit_note_applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditNoteApplications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Maps the row onto the domain type, failing on a corrupt currency code.
    ///
    /// # Errors
    ///
    /// Returns the stored code if it is not a supported currency.
    pub fn to_domain(&self) -> Result<payment::CreditNote, String> {
        Ok(payment::CreditNote {
            id: CreditNoteId::from_uuid(self.id),
            owner_id: OwnerId::from_uuid(self.owner_id),
            customer_id: CustomerId::from_uuid(self.customer_id),
            source_invoice_id: self.source_invoice_id.map(InvoiceId::from_uuid),
            currency: Currency::from_str(&self.currency)?,
            amount: self.amount,
            remaining_amount: self.remaining_amount,
            status: self.status.into(),
            reason: self.reason.clone(),
            number: self.number.clone(),
        })
    }
}
