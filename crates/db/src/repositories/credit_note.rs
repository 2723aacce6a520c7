//! Credit note repository.
//!
//! A credit note is a standalone store of value. Applying part of it to an
//! invoice writes three things as one unit: the application row, a mirror
//! payment on the target invoice's ledger, and the note's reduced remaining
//! value guarded by a version compare-and-swap.

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::str::FromStr;
use uuid::Uuid;

use faktura_core::invoice::InvoiceEvent;
use faktura_core::payment::{CreditNoteError, NewCreditNote, PaymentError, PaymentService};
use faktura_shared::types::money::Currency;
use faktura_shared::types::{
    CreditNoteApplicationId, CreditNoteId, CustomerId, InvoiceId, OwnerId, PaymentId,
};

use crate::entities::{credit_note_applications, credit_notes, invoices, payments,
    sea_orm_active_enums};

use super::support::{self, SupportError};

/// Error types for credit note operations.
#[derive(Debug, thiserror::Error)]
pub enum CreditNoteRepoError {
    /// Credit note not found.
    #[error("Credit note not found: {0}")]
    NotFound(Uuid),

    /// Target invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Operation rejected by credit note validation.
    #[error(transparent)]
    Note(#[from] CreditNoteError),

    /// The payment ledger is inconsistent with the stored total.
    #[error(transparent)]
    Ledger(#[from] PaymentError),

    /// A stored currency code could not be parsed.
    #[error("Invalid currency code in storage: {0}")]
    InvalidCurrency(String),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected for {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SupportError> for CreditNoteRepoError {
    fn from(value: SupportError) -> Self {
        match value {
            SupportError::Ledger(e) => Self::Ledger(e),
            SupportError::ConcurrentModification(id) => Self::ConcurrentModification(id),
            SupportError::Database(e) => Self::Database(e),
            // Recalculation never touches the catalog or line inputs.
            SupportError::TaxRateNotFound(_)
            | SupportError::DiscountNotFound(_)
            | SupportError::Pricing(_)
            | SupportError::Invoice(_) => {
                Self::Database(DbErr::Custom("unexpected pricing failure".to_string()))
            }
        }
    }
}

/// Result of applying credit note value to an invoice.
#[derive(Debug, Clone)]
pub struct ApplicationResult {
    /// Credit note after the application.
    pub credit_note: credit_notes::Model,
    /// The application row.
    pub application: credit_note_applications::Model,
    /// Mirror payment on the invoice's ledger.
    pub payment: payments::Model,
    /// Invoice after recalculation.
    pub invoice: invoices::Model,
}

/// Credit note repository.
#[derive(Debug)]
// `DatabaseConnection` is not `Clone` when sea-orm's `mock` feature is on
// (enabled for this crate's own tests), so only derive `Clone` outside tests.
#[cfg_attr(not(test), derive(Clone))]
pub struct CreditNoteRepository {
    db: DatabaseConnection,
}

impl CreditNoteRepository {
    /// Creates a new credit note repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a credit note with its full value available.
    ///
    /// Numbers come from the same yearly sequence machinery as invoices,
    /// under a separate scope, e.g. "CN-2026-0007".
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the insert fails.
    pub async fn create(
        &self,
        owner_id: OwnerId,
        input: NewCreditNote,
        today: NaiveDate,
    ) -> Result<credit_notes::Model, CreditNoteRepoError> {
        PaymentService::validate_new_credit_note(&input)?;

        let txn = self.db.begin().await?;
        let year = today.year();
        let sequence = support::next_document_number(
            &txn,
            owner_id.into_inner(),
            support::CREDIT_NOTE_SCOPE,
            year,
        )
        .await?;

        let now = Utc::now().into();
        let row = credit_notes::ActiveModel {
            id: Set(CreditNoteId::new().into_inner()),
            owner_id: Set(owner_id.into_inner()),
            customer_id: Set(input.customer_id.into_inner()),
            source_invoice_id: Set(input.source_invoice_id.map(InvoiceId::into_inner)),
            currency: Set(input.currency.to_string()),
            amount: Set(input.amount),
            remaining_amount: Set(input.amount),
            status: Set(sea_orm_active_enums::CreditNoteStatus::Available),
            reason: Set(input.reason),
            number: Set(format!("CN-{year}-{sequence:04}")),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let note = row.insert(&txn).await?;
        txn.commit().await?;
        Ok(note)
    }

    /// Gets a credit note by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the note is missing or the query fails.
    pub async fn get(
        &self,
        owner_id: OwnerId,
        id: CreditNoteId,
    ) -> Result<credit_notes::Model, CreditNoteRepoError> {
        self.find(&self.db, owner_id, id).await
    }

    /// Lists an owner's credit notes, optionally for one customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        owner_id: OwnerId,
        customer_id: Option<CustomerId>,
    ) -> Result<Vec<credit_notes::Model>, CreditNoteRepoError> {
        let mut query = credit_notes::Entity::find()
            .filter(credit_notes::Column::OwnerId.eq(owner_id.into_inner()));
        if let Some(customer_id) = customer_id {
            query = query.filter(credit_notes::Column::CustomerId.eq(customer_id.into_inner()));
        }
        Ok(query
            .order_by_desc(credit_notes::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Applies part of a credit note's value to an invoice.
    ///
    /// # Errors
    ///
    /// Returns an error for currency mismatches, amounts exceeding either
    /// the remaining value or the invoice's balance, unpayable invoices, or
    /// a lost concurrency race on the note or the invoice.
    pub async fn apply(
        &self,
        owner_id: OwnerId,
        note_id: CreditNoteId,
        invoice_id: InvoiceId,
        amount: i64,
        today: NaiveDate,
    ) -> Result<ApplicationResult, CreditNoteRepoError> {
        let txn = self.db.begin().await?;
        let note_row = self.find(&txn, owner_id, note_id).await?;
        let invoice = invoices::Entity::find_by_id(invoice_id.into_inner())
            .filter(invoices::Column::OwnerId.eq(owner_id.into_inner()))
            .one(&txn)
            .await?
            .ok_or(CreditNoteRepoError::InvoiceNotFound(invoice_id.into_inner()))?;

        let note = note_row
            .to_domain()
            .map_err(CreditNoteRepoError::InvalidCurrency)?;
        let invoice_currency = Currency::from_str(&invoice.currency)
            .map_err(CreditNoteRepoError::InvalidCurrency)?;

        let outcome = PaymentService::apply_credit_note(
            &note,
            invoice_currency,
            invoice.status.into(),
            invoice.amount_due,
            amount,
            today,
        )?;

        let now = Utc::now().into();
        let application = credit_note_applications::ActiveModel {
            id: Set(CreditNoteApplicationId::new().into_inner()),
            credit_note_id: Set(note_row.id),
            invoice_id: Set(invoice.id),
            amount: Set(amount),
            applied_on: Set(today),
            created_at: Set(now),
        };
        let application = application.insert(&txn).await?;

        let payment = payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            invoice_id: Set(invoice.id),
            amount: Set(outcome.payment.amount),
            payment_date: Set(outcome.payment.payment_date),
            method: Set(outcome.payment.method.into()),
            credit_note_application_id: Set(Some(application.id)),
            reference: Set(outcome.payment.reference.clone()),
            notes: Set(outcome.payment.notes.clone()),
            created_at: Set(now),
        };
        let payment = payment.insert(&txn).await?;

        let result = credit_notes::Entity::update_many()
            .col_expr(
                credit_notes::Column::RemainingAmount,
                Expr::value(outcome.new_remaining),
            )
            .col_expr(
                credit_notes::Column::Status,
                Expr::value(sea_orm_active_enums::CreditNoteStatus::from(outcome.new_status)),
            )
            .col_expr(credit_notes::Column::Version, Expr::value(note_row.version + 1))
            .col_expr(credit_notes::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(credit_notes::Column::Id.eq(note_row.id))
            .filter(credit_notes::Column::Version.eq(note_row.version))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(CreditNoteRepoError::ConcurrentModification(note_row.id));
        }

        let invoice = support::recalculate_invoice(&txn, &invoice, None, today).await?;
        support::append_event(
            &txn,
            invoice.id,
            &InvoiceEvent::CreditNoteApplied {
                credit_note_id: CreditNoteId::from_uuid(note_row.id),
                amount,
            },
        )
        .await?;
        txn.commit().await?;

        let mut credit_note = note_row;
        credit_note.remaining_amount = outcome.new_remaining;
        credit_note.status = outcome.new_status.into();
        credit_note.version += 1;
        Ok(ApplicationResult {
            credit_note,
            application,
            payment,
            invoice,
        })
    }

    /// Lists a credit note's applications, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the note is missing or the query fails.
    pub async fn list_applications(
        &self,
        owner_id: OwnerId,
        id: CreditNoteId,
    ) -> Result<Vec<credit_note_applications::Model>, CreditNoteRepoError> {
        let note = self.find(&self.db, owner_id, id).await?;
        Ok(credit_note_applications::Entity::find()
            .filter(credit_note_applications::Column::CreditNoteId.eq(note.id))
            .order_by_asc(credit_note_applications::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Deletes an unused credit note.
    ///
    /// Applied notes stay forever; the applications are part of the target
    /// invoices' audit trails.
    ///
    /// # Errors
    ///
    /// Returns an error if any application exists.
    pub async fn delete(
        &self,
        owner_id: OwnerId,
        id: CreditNoteId,
    ) -> Result<(), CreditNoteRepoError> {
        let note = self.find(&self.db, owner_id, id).await?;
        let applications = credit_note_applications::Entity::find()
            .filter(credit_note_applications::Column::CreditNoteId.eq(note.id))
            .count(&self.db)
            .await?;
        PaymentService::validate_credit_note_deletion(usize::try_from(applications).unwrap_or(usize::MAX))?;

        credit_notes::Entity::delete_by_id(note.id).exec(&self.db).await?;
        Ok(())
    }

    async fn find<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner_id: OwnerId,
        id: CreditNoteId,
    ) -> Result<credit_notes::Model, CreditNoteRepoError> {
        credit_notes::Entity::find_by_id(id.into_inner())
            .filter(credit_notes::Column::OwnerId.eq(owner_id.into_inner()))
            .one(conn)
            .await?
            .ok_or(CreditNoteRepoError::NotFound(id.into_inner()))
    }
}
