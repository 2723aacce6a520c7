//! Dashboard repository for aggregate reporting queries.
//!
//! Sums stay per currency here; cross-currency consolidation happens in the
//! API layer, where exchange rates are available.

use chrono::NaiveDate;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Statement,
};
use serde::Serialize;

use faktura_shared::types::OwnerId;

use crate::entities::{invoices, recurring_invoices, sea_orm_active_enums};

/// Error types for dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardRepoError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Invoice count for one status.
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct StatusCount {
    /// Invoice status.
    pub status: sea_orm_active_enums::InvoiceStatus,
    /// Number of invoices in that status.
    pub count: i64,
}

/// Per-currency billing totals.
#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct CurrencyOutstanding {
    /// ISO 4217 currency code.
    pub currency: String,
    /// Sum of open balances across payable invoices, in minor units.
    pub outstanding: i64,
    /// Portion of the outstanding sum that is past due.
    pub overdue: i64,
    /// Sum collected across non-void invoices.
    pub collected: i64,
}

/// Dashboard repository.
#[derive(Debug)]
// `DatabaseConnection` is not `Clone` when sea-orm's `mock` feature is on
// (enabled for this crate's own tests), so only derive `Clone` outside tests.
#[cfg_attr(not(test), derive(Clone))]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Counts an owner's invoices per status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn status_breakdown(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<StatusCount>, DashboardRepoError> {
        Ok(invoices::Entity::find()
            .select_only()
            .column(invoices::Column::Status)
            .column_as(invoices::Column::Id.count(), "count")
            .filter(invoices::Column::OwnerId.eq(owner_id.into_inner()))
            .group_by(invoices::Column::Status)
            .into_model::<StatusCount>()
            .all(&self.db)
            .await?)
    }

    /// Sums outstanding, overdue, and collected totals per currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn totals_by_currency(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<CurrencyOutstanding>, DashboardRepoError> {
        // SUM(bigint) is numeric in Postgres; cast it back down.
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT currency, \
                    CAST(COALESCE(SUM(amount_due) FILTER (WHERE status IN \
                        ('issued', 'partially_paid', 'past_due')), 0) AS BIGINT) AS outstanding, \
                    CAST(COALESCE(SUM(amount_due) FILTER (WHERE status = 'past_due'), 0) \
                        AS BIGINT) AS overdue, \
                    CAST(COALESCE(SUM(amount_paid) FILTER (WHERE status <> 'void'), 0) \
                        AS BIGINT) AS collected \
             FROM invoices \
             WHERE owner_id = $1 \
             GROUP BY currency \
             ORDER BY currency",
            [owner_id.into_inner().into()],
        );
        Ok(CurrencyOutstanding::find_by_statement(stmt)
            .all(&self.db)
            .await?)
    }

    /// Lists active templates due on or before `until`, soonest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn upcoming_recurring(
        &self,
        owner_id: OwnerId,
        until: NaiveDate,
    ) -> Result<Vec<recurring_invoices::Model>, DashboardRepoError> {
        Ok(recurring_invoices::Entity::find()
            .filter(recurring_invoices::Column::OwnerId.eq(owner_id.into_inner()))
            .filter(
                recurring_invoices::Column::Status
                    .eq(sea_orm_active_enums::RecurringStatus::Active),
            )
            .filter(recurring_invoices::Column::NextBillingDate.lte(until))
            .order_by_asc(recurring_invoices::Column::NextBillingDate)
            .all(&self.db)
            .await?)
    }
}
