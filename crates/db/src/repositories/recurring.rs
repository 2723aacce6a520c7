//! Recurring invoice repository: templates, schedules, and generation.
//!
//! Generation is idempotent per billing period. The template's
//! `next_billing_date` doubles as a compare-and-swap key: the advance and
//! the generated invoice commit together, and a caller that loses the race
//! finds zero rows updated and creates nothing.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use faktura_core::invoice::{
    InvoiceError, InvoiceEvent, InvoiceNumber, InvoiceService, InvoiceStatus, LineItemInput,
};
use faktura_core::pricing::{PricingError, PricingService};
use faktura_core::recurring::{
    NewRecurringInvoice, RecurringError, RecurringService, RecurringStatus,
};
use faktura_shared::types::{
    DiscountId, InvoiceId, OwnerId, RecurringInvoiceId, RecurringLineItemId, TaxRateId,
};

use crate::entities::{
    invoices, recurring_invoices, recurring_line_items, sea_orm_active_enums,
};

use super::invoice::InvoiceWithItems;
use super::support::{self, SupportError};

/// Error types for recurring invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum RecurringRepoError {
    /// Recurring invoice not found.
    #[error("Recurring invoice not found: {0}")]
    NotFound(Uuid),

    /// Referenced tax rate not found.
    #[error("Tax rate not found: {0}")]
    TaxRateNotFound(Uuid),

    /// Referenced discount not found.
    #[error("Discount not found: {0}")]
    DiscountNotFound(Uuid),

    /// Operation rejected by schedule validation or the status machine.
    #[error(transparent)]
    Schedule(#[from] RecurringError),

    /// Snapshot line rejected by the pricer.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Generated invoice rejected by the invoice state machine.
    #[error(transparent)]
    Lifecycle(#[from] InvoiceError),

    /// This billing period was already generated by a concurrent caller.
    #[error("Recurring invoice {0} was already generated for this period")]
    AlreadyGenerated(Uuid),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected for {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SupportError> for RecurringRepoError {
    fn from(value: SupportError) -> Self {
        match value {
            SupportError::TaxRateNotFound(id) => Self::TaxRateNotFound(id),
            SupportError::DiscountNotFound(id) => Self::DiscountNotFound(id),
            SupportError::Pricing(e) => Self::Pricing(e),
            SupportError::Invoice(e) => Self::Lifecycle(e),
            SupportError::Ledger(_) => {
                Self::Database(DbErr::Custom("unexpected ledger failure".to_string()))
            }
            SupportError::ConcurrentModification(id) => Self::ConcurrentModification(id),
            SupportError::Database(e) => Self::Database(e),
        }
    }
}

/// A recurring template with its lines, ordered by position.
#[derive(Debug, Clone)]
pub struct RecurringWithLines {
    /// Template header and schedule.
    pub template: recurring_invoices::Model,
    /// Template lines.
    pub lines: Vec<recurring_line_items::Model>,
}

/// Recurring invoice repository.
#[derive(Debug)]
// `DatabaseConnection` is not `Clone` when sea-orm's `mock` feature is on
// (enabled for this crate's own tests), so only derive `Clone` outside tests.
#[cfg_attr(not(test), derive(Clone))]
pub struct RecurringRepository {
    db: DatabaseConnection,
}

impl RecurringRepository {
    /// Creates a new recurring invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a template with its lines, active and first due on the
    /// start date.
    ///
    /// # Errors
    ///
    /// Returns an error if schedule or line validation fails.
    pub async fn create(
        &self,
        owner_id: OwnerId,
        input: NewRecurringInvoice,
        lines: Vec<LineItemInput>,
    ) -> Result<RecurringWithLines, RecurringRepoError> {
        RecurringService::validate_new(&input)?;
        for line in &lines {
            InvoiceService::validate_line_input(line)?;
        }

        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let row = recurring_invoices::ActiveModel {
            id: Set(RecurringInvoiceId::new().into_inner()),
            owner_id: Set(owner_id.into_inner()),
            customer_id: Set(input.customer_id.into_inner()),
            name: Set(input.name),
            currency: Set(input.currency.to_string()),
            tax_behavior: Set(input.tax_behavior.into()),
            net_terms_days: Set(input.net_terms_days),
            billing_interval: Set(input.interval.into()),
            interval_count: Set(i32::try_from(input.interval_count).unwrap_or(1)),
            billing_day_of_month: Set(input
                .billing_day_of_month
                .and_then(|d| i32::try_from(d).ok())),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            occurrences_limit: Set(input
                .occurrences_limit
                .and_then(|l| i32::try_from(l).ok())),
            occurrences_count: Set(0),
            next_billing_date: Set(input.start_date),
            status: Set(sea_orm_active_enums::RecurringStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let template = row.insert(&txn).await?;
        let lines = self.insert_lines(&txn, template.id, &lines).await?;
        txn.commit().await?;
        Ok(RecurringWithLines { template, lines })
    }

    /// Gets a template with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is missing or the query fails.
    pub async fn get(
        &self,
        owner_id: OwnerId,
        id: RecurringInvoiceId,
    ) -> Result<RecurringWithLines, RecurringRepoError> {
        let template = self.find(&self.db, owner_id, id).await?;
        let lines = self.load_lines(&self.db, template.id).await?;
        Ok(RecurringWithLines { template, lines })
    }

    /// Lists an owner's templates, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        owner_id: OwnerId,
        status: Option<RecurringStatus>,
    ) -> Result<Vec<recurring_invoices::Model>, RecurringRepoError> {
        let mut query = recurring_invoices::Entity::find()
            .filter(recurring_invoices::Column::OwnerId.eq(owner_id.into_inner()));
        if let Some(status) = status {
            query = query.filter(
                recurring_invoices::Column::Status
                    .eq(sea_orm_active_enums::RecurringStatus::from(status)),
            );
        }
        Ok(query
            .order_by_asc(recurring_invoices::Column::NextBillingDate)
            .all(&self.db)
            .await?)
    }

    /// Replaces a template's lines wholesale.
    ///
    /// Already-generated invoices carry snapshots and are untouched.
    ///
    /// # Errors
    ///
    /// Returns an error for terminal templates or bad line inputs.
    pub async fn replace_lines(
        &self,
        owner_id: OwnerId,
        id: RecurringInvoiceId,
        lines: Vec<LineItemInput>,
    ) -> Result<RecurringWithLines, RecurringRepoError> {
        for line in &lines {
            InvoiceService::validate_line_input(line)?;
        }

        let txn = self.db.begin().await?;
        let template = self.find(&txn, owner_id, id).await?;
        let status: RecurringStatus = template.status.into();
        if status.is_terminal() {
            return Err(RecurringRepoError::Schedule(
                RecurringError::InvalidTransition {
                    from: status,
                    action: "edit",
                },
            ));
        }

        recurring_line_items::Entity::delete_many()
            .filter(recurring_line_items::Column::RecurringInvoiceId.eq(template.id))
            .exec(&txn)
            .await?;
        let lines = self.insert_lines(&txn, template.id, &lines).await?;
        txn.commit().await?;
        Ok(RecurringWithLines { template, lines })
    }

    /// Pauses an active template.
    ///
    /// # Errors
    ///
    /// Returns an error for any other status.
    pub async fn pause(
        &self,
        owner_id: OwnerId,
        id: RecurringInvoiceId,
    ) -> Result<recurring_invoices::Model, RecurringRepoError> {
        self.transition(owner_id, id, RecurringService::pause).await
    }

    /// Resumes a paused template.
    ///
    /// # Errors
    ///
    /// Returns an error for any other status.
    pub async fn resume(
        &self,
        owner_id: OwnerId,
        id: RecurringInvoiceId,
    ) -> Result<recurring_invoices::Model, RecurringRepoError> {
        self.transition(owner_id, id, RecurringService::resume).await
    }

    /// Cancels an active or paused template. Terminal.
    ///
    /// # Errors
    ///
    /// Returns an error for terminal statuses.
    pub async fn cancel(
        &self,
        owner_id: OwnerId,
        id: RecurringInvoiceId,
    ) -> Result<recurring_invoices::Model, RecurringRepoError> {
        self.transition(owner_id, id, RecurringService::cancel).await
    }

    /// Generates one invoice from the template.
    ///
    /// `manual` lets an operator bill ahead of the schedule; the status
    /// gate still applies. The generated invoice is issued immediately with
    /// lines snapshotted and priced at today's catalog state. The schedule
    /// advance claims the billing period first; a concurrent caller on the
    /// same period gets `AlreadyGenerated` and no second invoice exists.
    ///
    /// # Errors
    ///
    /// Returns an error for inactive templates, not-yet-due scheduler
    /// calls, empty templates, or a lost generation race.
    pub async fn generate(
        &self,
        owner_id: OwnerId,
        id: RecurringInvoiceId,
        today: NaiveDate,
        manual: bool,
    ) -> Result<InvoiceWithItems, RecurringRepoError> {
        let txn = self.db.begin().await?;
        let template = self.find(&txn, owner_id, id).await?;
        let line_rows = self.load_lines(&txn, template.id).await?;

        let schedule = template.to_schedule();
        let plan = RecurringService::decide_generation(&schedule, line_rows.len(), today, manual)?;

        // Claim the period before creating anything.
        let result = recurring_invoices::Entity::update_many()
            .col_expr(
                recurring_invoices::Column::NextBillingDate,
                Expr::value(plan.next_billing_date),
            )
            .col_expr(
                recurring_invoices::Column::OccurrencesCount,
                Expr::value(i32::try_from(plan.occurrences_count).unwrap_or(i32::MAX)),
            )
            .col_expr(
                recurring_invoices::Column::Status,
                Expr::value(sea_orm_active_enums::RecurringStatus::from(plan.status)),
            )
            .col_expr(recurring_invoices::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(recurring_invoices::Column::Id.eq(template.id))
            .filter(recurring_invoices::Column::NextBillingDate.eq(plan.period))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(RecurringRepoError::AlreadyGenerated(template.id));
        }

        let domain_lines: Vec<_> = line_rows.iter().map(recurring_line_items::Model::to_domain).collect();
        let inputs = RecurringService::snapshot_lines(&domain_lines);
        let priced = support::price_lines(
            &txn,
            template.owner_id,
            template.tax_behavior.into(),
            today,
            &inputs,
        )
        .await?;

        let year = today.year();
        let sequence = support::next_document_number(
            &txn,
            template.owner_id,
            support::INVOICE_SCOPE,
            year,
        )
        .await?;
        let totals = PricingService::document_totals(&priced);
        let outcome = InvoiceService::issue(
            InvoiceStatus::Draft,
            inputs.len(),
            totals.total,
            template.net_terms_days,
            InvoiceNumber { year, sequence },
            today,
        )?;

        let now = Utc::now().into();
        let invoice_id = InvoiceId::new().into_inner();
        let invoice = invoices::ActiveModel {
            id: Set(invoice_id),
            owner_id: Set(template.owner_id),
            customer_id: Set(template.customer_id),
            currency: Set(template.currency.clone()),
            tax_behavior: Set(template.tax_behavior),
            net_terms_days: Set(template.net_terms_days),
            status: Set(sea_orm_active_enums::InvoiceStatus::from(outcome.status)),
            number: Set(Some(outcome.number.to_string())),
            sequence_year: Set(Some(year)),
            sequence_number: Set(Some(sequence)),
            subtotal: Set(totals.subtotal),
            tax_total: Set(totals.tax_total),
            total: Set(totals.total),
            amount_paid: Set(0),
            amount_due: Set(totals.total),
            issued_at: Set(Some(outcome.issued_at)),
            due_at: Set(Some(outcome.due_at)),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let invoice = invoice.insert(&txn).await?;
        let items = support::insert_line_rows(&txn, invoice.id, &inputs, &priced, 1).await?;
        support::redeem_discounts(&txn, &items).await?;

        support::append_event(&txn, invoice.id, &InvoiceEvent::Created).await?;
        support::append_event(
            &txn,
            invoice.id,
            &InvoiceEvent::Issued {
                number: outcome.number.to_string(),
                due_at: outcome.due_at,
            },
        )
        .await?;
        if outcome.status != InvoiceStatus::Issued {
            support::append_event(
                &txn,
                invoice.id,
                &InvoiceEvent::StatusChanged {
                    from: InvoiceStatus::Issued,
                    to: outcome.status,
                },
            )
            .await?;
        }
        txn.commit().await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists every active template due on or before `today`, across owners.
    ///
    /// The scheduler iterates this and calls [`Self::generate`] per entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_due(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<recurring_invoices::Model>, RecurringRepoError> {
        Ok(recurring_invoices::Entity::find()
            .filter(
                recurring_invoices::Column::Status
                    .eq(sea_orm_active_enums::RecurringStatus::Active),
            )
            .filter(recurring_invoices::Column::NextBillingDate.lte(today))
            .order_by_asc(recurring_invoices::Column::NextBillingDate)
            .all(&self.db)
            .await?)
    }

    async fn transition(
        &self,
        owner_id: OwnerId,
        id: RecurringInvoiceId,
        decide: fn(RecurringStatus) -> Result<RecurringStatus, RecurringError>,
    ) -> Result<recurring_invoices::Model, RecurringRepoError> {
        let template = self.find(&self.db, owner_id, id).await?;
        let new_status = decide(template.status.into())?;
        let mut active: recurring_invoices::ActiveModel = template.into();
        active.status = Set(new_status.into());
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(&self.db).await?)
    }

    async fn insert_lines(
        &self,
        txn: &DatabaseTransaction,
        template_id: Uuid,
        lines: &[LineItemInput],
    ) -> Result<Vec<recurring_line_items::Model>, DbErr> {
        let now = Utc::now().into();
        let mut rows = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            let row = recurring_line_items::ActiveModel {
                id: Set(RecurringLineItemId::new().into_inner()),
                recurring_invoice_id: Set(template_id),
                position: Set(i32::try_from(index).unwrap_or(i32::MAX) + 1),
                description: Set(line.description.clone()),
                quantity: Set(line.quantity),
                unit_amount: Set(line.unit_amount),
                tax_rate_id: Set(line.tax_rate_id.map(TaxRateId::into_inner)),
                discount_id: Set(line.discount_id.map(DiscountId::into_inner)),
                created_at: Set(now),
                updated_at: Set(now),
            };
            rows.push(row.insert(txn).await?);
        }
        Ok(rows)
    }

    async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner_id: OwnerId,
        id: RecurringInvoiceId,
    ) -> Result<recurring_invoices::Model, RecurringRepoError> {
        recurring_invoices::Entity::find_by_id(id.into_inner())
            .filter(recurring_invoices::Column::OwnerId.eq(owner_id.into_inner()))
            .one(conn)
            .await?
            .ok_or(RecurringRepoError::NotFound(id.into_inner()))
    }

    async fn load_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        template_id: Uuid,
    ) -> Result<Vec<recurring_line_items::Model>, DbErr> {
        recurring_line_items::Entity::find()
            .filter(recurring_line_items::Column::RecurringInvoiceId.eq(template_id))
            .order_by_asc(recurring_line_items::Column::Position)
            .all(conn)
            .await
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn active_template(today: NaiveDate) -> recurring_invoices::Model {
        let now = Utc::now().into();
        recurring_invoices::Model {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            customer_id: Uuid::now_v7(),
            name: "Monthly retainer".to_string(),
            currency: "USD".to_string(),
            tax_behavior: sea_orm_active_enums::TaxBehavior::Exclusive,
            net_terms_days: 14,
            billing_interval: sea_orm_active_enums::BillingInterval::Monthly,
            interval_count: 1,
            billing_day_of_month: None,
            start_date: today,
            end_date: None,
            occurrences_limit: None,
            occurrences_count: 0,
            next_billing_date: today,
            status: sea_orm_active_enums::RecurringStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn template_line(template_id: Uuid) -> recurring_line_items::Model {
        let now = Utc::now().into();
        recurring_line_items::Model {
            id: Uuid::now_v7(),
            recurring_invoice_id: template_id,
            position: 1,
            description: "Retainer".to_string(),
            quantity: Decimal::ONE,
            unit_amount: 50_000,
            tax_rate_id: None,
            discount_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_lost_period_claim_is_already_generated() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let template = active_template(today);
        let template_id = template.id;
        let owner_id = OwnerId::from_uuid(template.owner_id);
        // The period claim filters on the loaded next_billing_date; when a
        // concurrent caller advanced it first, the update matches zero rows
        // and no invoice may be created for the period.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![template]])
            .append_query_results([vec![template_line(template_id)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = RecurringRepository::new(db);
        let err = repo
            .generate(
                owner_id,
                RecurringInvoiceId::from_uuid(template_id),
                today,
                false,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RecurringRepoError::AlreadyGenerated(id) if id == template_id));
    }
}
