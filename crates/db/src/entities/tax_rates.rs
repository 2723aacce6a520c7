//! `SeaORM` Entity for the tax_rates table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use faktura_core::catalog;
use faktura_shared::types::{OwnerId, TaxRateId};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tax_rates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub rate_basis_points: i64,
    pub country_code: String,
    pub is_active: bool,
    pub valid_from: Option<Date>,
    pub valid_until: Option<Date>,
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
    pub fn to_domain(&self) -> catalog::TaxRate {
        catalog::TaxRate {
            id: TaxRateId::from_uuid(self.id),
            owner_id: OwnerId::from_uuid(self.owner_id),
            name: self.name.clone(),
            rate_basis_points: self.rate_basis_points,
            country_code: self.country_code.clone(),
            is_active: self.is_active,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
        }
    }
}
