//! `SeaORM` Entity for the recurring_invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use faktura_core::recurring;

use super::sea_orm_active_enums::{BillingInterval, RecurringStatus, TaxBehavior};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub currency: String,
    pub tax_behavior: TaxBehavior,
    pub net_terms_days: i32,
    pub billing_interval: BillingInterval,
    pub interval_count: i32,
    pub billing_day_of_month: Option<i32>,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub occurrences_limit: Option<i32>,
    pub occurrences_count: i32,
    /// Generation compare-and-swap key: one successful generation per value.
    pub next_billing_date: Date,
    pub status: RecurringStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recurring_line_items::Entity")]
    RecurringLineItems,
}

impl Related<super::recurring_line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecurringLineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Maps the schedule columns onto the domain schedule type.
    #[must_use]
    pub fn to_schedule(&self) -> recurring::RecurringSchedule {
        recurring::RecurringSchedule {
            interval: self.billing_interval.into(),
            interval_count: u32::try_from(self.interval_count).unwrap_or(1),
            billing_day_of_month: self
                .billing_day_of_month
                .and_then(|d| u32::try_from(d).ok()),
            start_date: self.start_date,
            end_date: self.end_date,
            occurrences_limit: self
                .occurrences_limit
                .and_then(|l| u32::try_from(l).ok()),
            occurrences_count: u32::try_from(self.occurrences_count).unwrap_or(0),
            next_billing_date: self.next_billing_date,
            status: self.status.into(),
        }
    }
}
