//! `SeaORM` Entity for the recurring_line_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use faktura_core::recurring;
use faktura_shared::types::{DiscountId, RecurringLineItemId, TaxRateId};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_line_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recurring_invoice_id: Uuid,
    pub position: i32,
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((12, 3)))")]
    pub quantity: Decimal,
    pub unit_amount: i64,
    pub tax_rate_id: Option<Uuid>,
    pub discount_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recurring_invoices::Entity",
        from = "Column::RecurringInvoiceId",
        to = "super::recurring_invoices::Column::Id"
    )]
    RecurringInvoices,
}

impl Related<super::recurring_invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringInvoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Maps the row onto the template line type used for snapshots.
    #[must_use]
    pub fn to_domain(&self) -> recurring::RecurringLineItem {
        recurring::RecurringLineItem {
            id: RecurringLineItemId::from_uuid(self.id),
            description: self.description.clone(),
            quantity: self.quantity,
            unit_amount: self.unit_amount,
            tax_rate_id: self.tax_rate_id.map(TaxRateId::from_uuid),
            discount_id: self.discount_id.map(DiscountId::from_uuid),
        }
    }
}
