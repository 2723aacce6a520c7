//! Payment repository for the per-invoice payment ledger.
//!
//! Payments are immutable rows; the only mutations are append and delete,
//! and either one ends with a full recalculation of the invoice's figures
//! from the surviving ledger.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use faktura_core::invoice::InvoiceEvent;
use faktura_core::payment::{NewPayment, PaymentError, PaymentService};
use faktura_shared::types::{InvoiceId, OwnerId, PaymentId};

use crate::entities::{invoices, payments};

use super::support::{self, SupportError};

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentRepoError {
    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    /// Payment rejected by ledger validation.
    #[error(transparent)]
    Ledger(#[from] PaymentError),

    /// Credit note payments can only be removed through their credit note.
    #[error("Payment {0} mirrors a credit note application and cannot be deleted directly")]
    CreditNotePayment(Uuid),

    /// Concurrent modification detected.
    #[error("Concurrent modification detected for invoice {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<SupportError> for PaymentRepoError {
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

/// A recorded payment with the recalculated invoice.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    /// The ledger row.
    pub payment: payments::Model,
    /// Invoice after recalculation.
    pub invoice: invoices::Model,
}

/// Payment repository.
#[derive(Debug)]
// `DatabaseConnection` is not `Clone` when sea-orm's `mock` feature is on
// (enabled for this crate's own tests), so only derive `Clone` outside tests.
#[cfg_attr(not(test), derive(Clone))]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a payment against an invoice and recalculates it.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive or overpaying amounts, unpayable
    /// invoice states, or a lost concurrency race.
    pub async fn record(
        &self,
        owner_id: OwnerId,
        invoice_id: InvoiceId,
        input: NewPayment,
        today: NaiveDate,
    ) -> Result<PaymentOutcome, PaymentRepoError> {
        let txn = self.db.begin().await?;
        let invoice = self.find_invoice(&txn, owner_id, invoice_id).await?;
        PaymentService::validate_payment(invoice.status.into(), invoice.amount_due, input.amount)?;

        let row = payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            invoice_id: Set(invoice.id),
            amount: Set(input.amount),
            payment_date: Set(input.payment_date),
            method: Set(input.method.into()),
            credit_note_application_id: Set(None),
            reference: Set(input.reference),
            notes: Set(input.notes),
            created_at: Set(Utc::now().into()),
        };
        let payment = row.insert(&txn).await?;

        let invoice = support::recalculate_invoice(&txn, &invoice, None, today).await?;
        support::append_event(
            &txn,
            invoice.id,
            &InvoiceEvent::PaymentRecorded {
                payment_id: PaymentId::from_uuid(payment.id),
                amount: payment.amount,
            },
        )
        .await?;
        txn.commit().await?;
        Ok(PaymentOutcome { payment, invoice })
    }

    /// Deletes a mistaken payment and recalculates the invoice.
    ///
    /// A paid invoice reopens if the deletion leaves a balance. Payments
    /// that mirror credit note applications are refused; the credit note
    /// trail owns those.
    ///
    /// # Errors
    ///
    /// Returns an error for missing or credit-note payments, or a lost
    /// concurrency race.
    pub async fn delete(
        &self,
        owner_id: OwnerId,
        invoice_id: InvoiceId,
        payment_id: PaymentId,
        today: NaiveDate,
    ) -> Result<invoices::Model, PaymentRepoError> {
        let txn = self.db.begin().await?;
        let invoice = self.find_invoice(&txn, owner_id, invoice_id).await?;

        let payment = payments::Entity::find_by_id(payment_id.into_inner())
            .filter(payments::Column::InvoiceId.eq(invoice.id))
            .one(&txn)
            .await?
            .ok_or(PaymentRepoError::NotFound(payment_id.into_inner()))?;
        if payment.credit_note_application_id.is_some() {
            return Err(PaymentRepoError::CreditNotePayment(payment.id));
        }

        payments::Entity::delete_by_id(payment.id).exec(&txn).await?;

        let invoice = support::recalculate_invoice(&txn, &invoice, None, today).await?;
        support::append_event(
            &txn,
            invoice.id,
            &InvoiceEvent::PaymentDeleted {
                payment_id: PaymentId::from_uuid(payment.id),
                amount: payment.amount,
            },
        )
        .await?;
        txn.commit().await?;
        Ok(invoice)
    }

    /// Lists an invoice's payments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing or the query fails.
    pub async fn list_for_invoice(
        &self,
        owner_id: OwnerId,
        invoice_id: InvoiceId,
    ) -> Result<Vec<payments::Model>, PaymentRepoError> {
        let invoice = self.find_invoice(&self.db, owner_id, invoice_id).await?;
        Ok(payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice.id))
            .order_by_asc(payments::Column::PaymentDate)
            .order_by_asc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Lists every payment for an owner with its invoice, for export.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_owner(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<(payments::Model, invoices::Model)>, PaymentRepoError> {
        let rows = payments::Entity::find()
            .find_also_related(invoices::Entity)
            .filter(invoices::Column::OwnerId.eq(owner_id.into_inner()))
            .order_by_asc(payments::Column::PaymentDate)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(payment, invoice)| invoice.map(|inv| (payment, inv)))
            .collect())
    }

    async fn find_invoice<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner_id: OwnerId,
        id: InvoiceId,
    ) -> Result<invoices::Model, PaymentRepoError> {
        invoices::Entity::find_by_id(id.into_inner())
            .filter(invoices::Column::OwnerId.eq(owner_id.into_inner()))
            .one(conn)
            .await?
            .ok_or(PaymentRepoError::InvoiceNotFound(id.into_inner()))
    }
}
