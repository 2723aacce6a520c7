//! `SeaORM` Entity for the discounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use faktura_core::catalog;
use faktura_shared::types::{DiscountId, OwnerId};

use super::sea_orm_active_enums::DiscountKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub is_active: bool,
    pub valid_from: Option<Date>,
    pub valid_until: Option<Date>,
    pub redemption_limit: Option<i64>,
    pub redemption_count: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_line_items::Entity")]
    InvoiceLineItems,
}

impl Related<super::invoice_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Maps the row onto the domain type used by the pricer.
    #[must_use]
    pub fn to_domain(&self) -> catalog::Discount {
        catalog::Discount {
            id: DiscountId::from_uuid(self.id),
            owner_id: OwnerId::from_uuid(self.owner_id),
            code: self.code.clone(),
            kind: self.kind.into(),
            value: self.value,
            is_active: self.is_active,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            redemption_limit: self.redemption_limit,
            redemption_count: self.redemption_count,
        }
    }
}
