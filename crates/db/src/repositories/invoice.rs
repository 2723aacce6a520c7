//! Invoice repository for draft lifecycle, pricing, and issuance.
//!
//! Every business decision is delegated to the core services; this module
//! only persists the outcome. Mutations run inside a database transaction
//! and finish with a version compare-and-swap, so two writers racing on the
//! same invoice cannot both win.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use faktura_core::invoice::{
    InvoiceError, InvoiceEvent, InvoiceNumber, InvoiceService, InvoiceStatus, LineItemInput,
    NewInvoice,
};
use faktura_core::payment::PaymentError;
use faktura_core::pricing::PricingError;
use faktura_shared::types::pagination::{PageRequest, PageResponse};
use faktura_shared::types::{CustomerId, DiscountId, InvoiceId, LineItemId, OwnerId, TaxRateId};

use crate::entities::{invoice_events, invoice_line_items, invoices, sea_orm_active_enums};

use super::support::{self, SupportError};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceRepoError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// Line item not found on this invoice.
    #[error("Line item not found: {0}")]
    LineNotFound(Uuid),

    /// Referenced tax rate not found.
    #[error("Tax rate not found: {0}")]
    TaxRateNotFound(Uuid),

    /// Referenced discount not found.
    #[error("Discount not found: {0}")]
    DiscountNotFound(Uuid),

    /// Operation rejected by the invoice state machine.
    #[error(transparent)]
    Lifecycle(#[from] InvoiceError),

    /// Line rejected by the pricer.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The payment ledger is inconsistent with the stored total.
    #[error(transparent)]
    Ledger(#[from] PaymentError),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected for invoice {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SupportError> for InvoiceRepoError {
    fn from(value: SupportError) -> Self {
        match value {
            SupportError::TaxRateNotFound(id) => Self::TaxRateNotFound(id),
            SupportError::DiscountNotFound(id) => Self::DiscountNotFound(id),
            SupportError::Pricing(e) => Self::Pricing(e),
            SupportError::Invoice(e) => Self::Lifecycle(e),
            SupportError::Ledger(e) => Self::Ledger(e),
            SupportError::ConcurrentModification(id) => Self::ConcurrentModification(id),
            SupportError::Database(e) => Self::Database(e),
        }
    }
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Filter by customer.
    pub customer_id: Option<CustomerId>,
    /// Issued on or after this date.
    pub issued_from: Option<NaiveDate>,
    /// Issued on or before this date.
    pub issued_to: Option<NaiveDate>,
}

/// An invoice with its line items, ordered by position.
#[derive(Debug, Clone)]
pub struct InvoiceWithItems {
    /// Invoice header.
    pub invoice: invoices::Model,
    /// Line items.
    pub items: Vec<invoice_line_items::Model>,
}

/// Invoice repository.
#[derive(Debug)]
// `DatabaseConnection` is not `Clone` when sea-orm's `mock` feature is on
// (enabled for this crate's own tests), so only derive `Clone` outside tests.
#[cfg_attr(not(test), derive(Clone))]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an empty draft.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the insert fails.
    pub async fn create_draft(
        &self,
        owner_id: OwnerId,
        input: NewInvoice,
    ) -> Result<invoices::Model, InvoiceRepoError> {
        InvoiceService::validate_new(&input)?;

        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let row = invoices::ActiveModel {
            id: Set(InvoiceId::new().into_inner()),
            owner_id: Set(owner_id.into_inner()),
            customer_id: Set(input.customer_id.into_inner()),
            currency: Set(input.currency.to_string()),
            tax_behavior: Set(input.tax_behavior.into()),
            net_terms_days: Set(input.net_terms_days),
            status: Set(sea_orm_active_enums::InvoiceStatus::Draft),
            number: Set(None),
            sequence_year: Set(None),
            sequence_number: Set(None),
            subtotal: Set(0),
            tax_total: Set(0),
            total: Set(0),
            amount_paid: Set(0),
            amount_due: Set(0),
            issued_at: Set(None),
            due_at: Set(None),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let invoice = row.insert(&txn).await?;
        support::append_event(&txn, invoice.id, &InvoiceEvent::Created).await?;
        txn.commit().await?;
        Ok(invoice)
    }

    /// Gets an invoice with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or the query fails.
    pub async fn get(
        &self,
        owner_id: OwnerId,
        id: InvoiceId,
    ) -> Result<InvoiceWithItems, InvoiceRepoError> {
        let invoice = self.find(&self.db, owner_id, id).await?;
        let items = self.load_items(&self.db, invoice.id).await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists invoices with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        owner_id: OwnerId,
        filter: InvoiceFilter,
        page: PageRequest,
    ) -> Result<PageResponse<invoices::Model>, InvoiceRepoError> {
        let mut query =
            invoices::Entity::find().filter(invoices::Column::OwnerId.eq(owner_id.into_inner()));

        if let Some(status) = filter.status {
            query = query.filter(
                invoices::Column::Status.eq(sea_orm_active_enums::InvoiceStatus::from(status)),
            );
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(invoices::Column::CustomerId.eq(customer_id.into_inner()));
        }
        if let Some(from) = filter.issued_from {
            query = query.filter(invoices::Column::IssuedAt.gte(from));
        }
        if let Some(to) = filter.issued_to {
            query = query.filter(invoices::Column::IssuedAt.lte(to));
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(invoices::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    /// Adds a line item to a draft and reprices the document.
    ///
    /// # Errors
    ///
    /// Returns an error outside draft, for bad line inputs, or on a lost
    /// concurrency race.
    pub async fn add_line(
        &self,
        owner_id: OwnerId,
        id: InvoiceId,
        input: LineItemInput,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = self.find(&txn, owner_id, id).await?;
        InvoiceService::ensure_editable(invoice.status.into())?;

        let priced = support::price_lines(
            &txn,
            invoice.owner_id,
            invoice.tax_behavior.into(),
            today,
            std::slice::from_ref(&input),
        )
        .await?;

        let position = self.next_position(&txn, invoice.id).await?;
        let inserted = support::insert_line_rows(
            &txn,
            invoice.id,
            std::slice::from_ref(&input),
            &priced,
            position,
        )
        .await?;

        let items = self.load_items(&txn, invoice.id).await?;
        let totals = support::totals_from_rows(&items);
        let invoice = support::recalculate_invoice(&txn, &invoice, Some(totals), today).await?;
        support::append_event(
            &txn,
            invoice.id,
            &InvoiceEvent::ItemAdded {
                line_item_id: LineItemId::from_uuid(inserted[0].id),
            },
        )
        .await?;
        txn.commit().await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Replaces a draft line item's fields and reprices the document.
    ///
    /// # Errors
    ///
    /// Returns an error outside draft, for missing lines, or on a lost
    /// concurrency race.
    pub async fn update_line(
        &self,
        owner_id: OwnerId,
        id: InvoiceId,
        line_id: LineItemId,
        input: LineItemInput,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = self.find(&txn, owner_id, id).await?;
        InvoiceService::ensure_editable(invoice.status.into())?;

        let line = invoice_line_items::Entity::find_by_id(line_id.into_inner())
            .filter(invoice_line_items::Column::InvoiceId.eq(invoice.id))
            .one(&txn)
            .await?
            .ok_or(InvoiceRepoError::LineNotFound(line_id.into_inner()))?;

        let priced = support::price_lines(
            &txn,
            invoice.owner_id,
            invoice.tax_behavior.into(),
            today,
            std::slice::from_ref(&input),
        )
        .await?;
        let figures = priced[0];

        let mut active: invoice_line_items::ActiveModel = line.into();
        active.description = Set(input.description.clone());
        active.quantity = Set(input.quantity);
        active.unit_amount = Set(input.unit_amount);
        active.tax_rate_id = Set(input.tax_rate_id.map(TaxRateId::into_inner));
        active.discount_id = Set(input.discount_id.map(DiscountId::into_inner));
        active.tax_rate_basis_points = Set(figures.tax_rate_basis_points);
        active.subtotal = Set(figures.subtotal);
        active.discount_amount = Set(figures.discount_amount);
        active.tax_amount = Set(figures.tax_amount);
        active.total = Set(figures.total);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        let items = self.load_items(&txn, invoice.id).await?;
        let totals = support::totals_from_rows(&items);
        let invoice = support::recalculate_invoice(&txn, &invoice, Some(totals), today).await?;
        support::append_event(
            &txn,
            invoice.id,
            &InvoiceEvent::ItemUpdated {
                line_item_id: line_id,
            },
        )
        .await?;
        txn.commit().await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Removes a draft line item and reprices the document.
    ///
    /// # Errors
    ///
    /// Returns an error outside draft, for missing lines, or on a lost
    /// concurrency race.
    pub async fn remove_line(
        &self,
        owner_id: OwnerId,
        id: InvoiceId,
        line_id: LineItemId,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = self.find(&txn, owner_id, id).await?;
        InvoiceService::ensure_editable(invoice.status.into())?;

        let deleted = invoice_line_items::Entity::delete_many()
            .filter(invoice_line_items::Column::Id.eq(line_id.into_inner()))
            .filter(invoice_line_items::Column::InvoiceId.eq(invoice.id))
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(InvoiceRepoError::LineNotFound(line_id.into_inner()));
        }

        let items = self.load_items(&txn, invoice.id).await?;
        let totals = support::totals_from_rows(&items);
        let invoice = support::recalculate_invoice(&txn, &invoice, Some(totals), today).await?;
        support::append_event(
            &txn,
            invoice.id,
            &InvoiceEvent::ItemRemoved {
                line_item_id: line_id,
            },
        )
        .await?;
        txn.commit().await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Issues a draft: assigns the next sequence number, freezes the lines,
    /// and sets the due date from the net terms.
    ///
    /// The number allocation and the status flip commit together, so a
    /// failed issuance never burns a number.
    ///
    /// # Errors
    ///
    /// Returns an error outside draft, for empty drafts, or on a lost
    /// concurrency race.
    pub async fn issue(
        &self,
        owner_id: OwnerId,
        id: InvoiceId,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = self.find(&txn, owner_id, id).await?;
        let items = self.load_items(&txn, invoice.id).await?;

        let year = today.year();
        let sequence =
            support::next_document_number(&txn, invoice.owner_id, support::INVOICE_SCOPE, year)
                .await?;
        let outcome = InvoiceService::issue(
            invoice.status.into(),
            items.len(),
            invoice.total,
            invoice.net_terms_days,
            InvoiceNumber { year, sequence },
            today,
        )?;

        let result = invoices::Entity::update_many()
            .col_expr(
                invoices::Column::Status,
                Expr::value(sea_orm_active_enums::InvoiceStatus::from(outcome.status)),
            )
            .col_expr(invoices::Column::Number, Expr::value(outcome.number.to_string()))
            .col_expr(invoices::Column::SequenceYear, Expr::value(year))
            .col_expr(invoices::Column::SequenceNumber, Expr::value(sequence))
            .col_expr(invoices::Column::IssuedAt, Expr::value(outcome.issued_at))
            .col_expr(invoices::Column::DueAt, Expr::value(outcome.due_at))
            .col_expr(invoices::Column::AmountDue, Expr::value(invoice.total))
            .col_expr(invoices::Column::Version, Expr::value(invoice.version + 1))
            .col_expr(invoices::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(invoices::Column::Id.eq(invoice.id))
            .filter(invoices::Column::Version.eq(invoice.version))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(InvoiceRepoError::ConcurrentModification(invoice.id));
        }

        support::redeem_discounts(&txn, &items).await?;
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

        let invoice = self.find(&self.db, owner_id, id).await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Voids an invoice that has not been fully paid.
    ///
    /// The document's number stays assigned; voiding never frees it.
    ///
    /// # Errors
    ///
    /// Returns an error for paid or already-void documents, or on a lost
    /// concurrency race.
    pub async fn void(
        &self,
        owner_id: OwnerId,
        id: InvoiceId,
    ) -> Result<invoices::Model, InvoiceRepoError> {
        let txn = self.db.begin().await?;
        let invoice = self.find(&txn, owner_id, id).await?;
        let new_status = InvoiceService::void(invoice.status.into())?;

        let result = invoices::Entity::update_many()
            .col_expr(
                invoices::Column::Status,
                Expr::value(sea_orm_active_enums::InvoiceStatus::from(new_status)),
            )
            .col_expr(invoices::Column::Version, Expr::value(invoice.version + 1))
            .col_expr(invoices::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(invoices::Column::Id.eq(invoice.id))
            .filter(invoices::Column::Version.eq(invoice.version))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(InvoiceRepoError::ConcurrentModification(invoice.id));
        }

        support::append_event(&txn, invoice.id, &InvoiceEvent::Voided).await?;
        txn.commit().await?;

        self.find(&self.db, owner_id, id).await
    }

    /// Deletes a draft and everything attached to it.
    ///
    /// # Errors
    ///
    /// Returns an error for any non-draft document.
    pub async fn delete_draft(
        &self,
        owner_id: OwnerId,
        id: InvoiceId,
    ) -> Result<(), InvoiceRepoError> {
        let invoice = self.find(&self.db, owner_id, id).await?;
        InvoiceService::ensure_deletable(invoice.status.into())?;

        // Cascades to line items and events.
        invoices::Entity::delete_by_id(invoice.id).exec(&self.db).await?;
        Ok(())
    }

    /// Marks every overdue open invoice past due, across owners.
    ///
    /// Run by the scheduler; returns the number of invoices flipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn refresh_past_due(&self, today: NaiveDate) -> Result<u64, InvoiceRepoError> {
        let result = invoices::Entity::update_many()
            .col_expr(
                invoices::Column::Status,
                Expr::value(sea_orm_active_enums::InvoiceStatus::PastDue),
            )
            .col_expr(
                invoices::Column::Version,
                Expr::col(invoices::Column::Version).add(1),
            )
            .col_expr(invoices::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(invoices::Column::Status.is_in([
                sea_orm_active_enums::InvoiceStatus::Issued,
                sea_orm_active_enums::InvoiceStatus::PartiallyPaid,
            ]))
            .filter(invoices::Column::DueAt.lt(today))
            .filter(invoices::Column::AmountDue.gt(0))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Lists an invoice's event history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or the query fails.
    pub async fn list_events(
        &self,
        owner_id: OwnerId,
        id: InvoiceId,
    ) -> Result<Vec<invoice_events::Model>, InvoiceRepoError> {
        let invoice = self.find(&self.db, owner_id, id).await?;
        Ok(invoice_events::Entity::find()
            .filter(invoice_events::Column::InvoiceId.eq(invoice.id))
            .order_by_asc(invoice_events::Column::OccurredAt)
            .all(&self.db)
            .await?)
    }

    async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner_id: OwnerId,
        id: InvoiceId,
    ) -> Result<invoices::Model, InvoiceRepoError> {
        invoices::Entity::find_by_id(id.into_inner())
            .filter(invoices::Column::OwnerId.eq(owner_id.into_inner()))
            .one(conn)
            .await?
            .ok_or(InvoiceRepoError::NotFound(id.into_inner()))
    }

    async fn load_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        invoice_id: Uuid,
    ) -> Result<Vec<invoice_line_items::Model>, DbErr> {
        invoice_line_items::Entity::find()
            .filter(invoice_line_items::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_line_items::Column::Position)
            .all(conn)
            .await
    }

    async fn next_position(
        &self,
        txn: &DatabaseTransaction,
        invoice_id: Uuid,
    ) -> Result<i32, DbErr> {
        let last = invoice_line_items::Entity::find()
            .filter(invoice_line_items::Column::InvoiceId.eq(invoice_id))
            .order_by_desc(invoice_line_items::Column::Position)
            .one(txn)
            .await?;
        Ok(last.map_or(1, |row| row.position + 1))
    }
}
