//! Shared persistence helpers used by several repositories.
//!
//! Everything here runs inside the caller's database transaction so that a
//! failing step rolls back the whole operation.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbErr, EntityTrait,
    QueryFilter, Set, Statement,
};
use uuid::Uuid;

use faktura_core::invoice::{
    InvoiceError, InvoiceEvent, InvoiceService, InvoiceStatus, LineItemInput,
};
use faktura_core::payment::{PaymentError, PaymentService};
use faktura_core::pricing::{
    DocumentTotals, LinePricingInput, PricedLine, PricingError, PricingService, TaxBehavior,
};
use faktura_shared::types::{DiscountId, TaxRateId};

use crate::entities::{
    discounts, invoice_events, invoice_line_items, invoices, payments, sea_orm_active_enums,
    tax_rates,
};

/// Sequence scope for invoice numbers ("INV-{year}-{seq}").
pub(crate) const INVOICE_SCOPE: &str = "invoice";

/// Sequence scope for credit note numbers ("CN-{year}-{seq}").
pub(crate) const CREDIT_NOTE_SCOPE: &str = "credit_note";

/// Failures shared between repositories; each maps them onto its own error.
#[derive(Debug, thiserror::Error)]
pub(crate) enum SupportError {
    /// Referenced tax rate does not exist for this owner.
    #[error("Tax rate not found: {0}")]
    TaxRateNotFound(Uuid),

    /// Referenced discount does not exist for this owner.
    #[error("Discount not found: {0}")]
    DiscountNotFound(Uuid),

    /// Line rejected by the pricer.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Line rejected by invoice validation.
    #[error(transparent)]
    Invoice(#[from] InvoiceError),

    /// The payment ledger is inconsistent with the stored total.
    #[error(transparent)]
    Ledger(#[from] PaymentError),

    /// Lost an optimistic concurrency race.
    #[error("Concurrent modification detected for invoice {0}, please retry")]
    ConcurrentModification(Uuid),

    /// Database error.
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Allocates the next document number for an owner, scope, and year.
///
/// The upsert is atomic: concurrent issuers each observe a distinct value
/// and numbers are never reused, though a rolled-back transaction leaves a
/// gap.
pub(crate) async fn next_document_number<C: ConnectionTrait>(
    conn: &C,
    owner_id: Uuid,
    scope: &str,
    year: i32,
) -> Result<i64, DbErr> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "INSERT INTO invoice_sequences (owner_id, scope, year, last_number) \
         VALUES ($1, $2, $3, 1) \
         ON CONFLICT (owner_id, scope, year) \
         DO UPDATE SET last_number = invoice_sequences.last_number + 1 \
         RETURNING last_number",
        [owner_id.into(), scope.into(), year.into()],
    );
    let row = conn
        .query_one(stmt)
        .await?
        .ok_or_else(|| DbErr::Custom("sequence upsert returned no row".to_string()))?;
    row.try_get("", "last_number")
}

/// Prices a batch of line inputs against the owner's catalog.
///
/// Returns one `PricedLine` per input, in order. Catalog lookups are
/// owner-scoped; applicability windows are checked by the pricer against
/// `pricing_date`.
pub(crate) async fn price_lines<C: ConnectionTrait>(
    conn: &C,
    owner_id: Uuid,
    tax_behavior: TaxBehavior,
    pricing_date: NaiveDate,
    inputs: &[LineItemInput],
) -> Result<Vec<PricedLine>, SupportError> {
    let mut priced = Vec::with_capacity(inputs.len());
    for input in inputs {
        InvoiceService::validate_line_input(input)?;

        let tax_rate = match input.tax_rate_id {
            None => None,
            Some(id) => Some(
                tax_rates::Entity::find_by_id(id.into_inner())
                    .filter(tax_rates::Column::OwnerId.eq(owner_id))
                    .one(conn)
                    .await?
                    .ok_or(SupportError::TaxRateNotFound(id.into_inner()))?
                    .to_domain(),
            ),
        };
        let discount = match input.discount_id {
            None => None,
            Some(id) => Some(
                discounts::Entity::find_by_id(id.into_inner())
                    .filter(discounts::Column::OwnerId.eq(owner_id))
                    .one(conn)
                    .await?
                    .ok_or(SupportError::DiscountNotFound(id.into_inner()))?
                    .to_domain(),
            ),
        };

        let line = PricingService::price_line(&LinePricingInput {
            quantity: input.quantity,
            unit_amount: input.unit_amount,
            tax_behavior,
            tax_rate: tax_rate.as_ref(),
            discount: discount.as_ref(),
            pricing_date,
        })?;
        priced.push(line);
    }
    Ok(priced)
}

/// Inserts priced line rows for an invoice, positions starting at `from_position`.
pub(crate) async fn insert_line_rows<C: ConnectionTrait>(
    conn: &C,
    invoice_id: Uuid,
    inputs: &[LineItemInput],
    priced: &[PricedLine],
    from_position: i32,
) -> Result<Vec<invoice_line_items::Model>, DbErr> {
    let now = Utc::now().into();
    let mut rows = Vec::with_capacity(inputs.len());
    for (offset, (input, line)) in inputs.iter().zip(priced.iter()).enumerate() {
        let row = invoice_line_items::ActiveModel {
            id: Set(Uuid::now_v7()),
            invoice_id: Set(invoice_id),
            position: Set(from_position + i32::try_from(offset).unwrap_or(i32::MAX)),
            description: Set(input.description.clone()),
            quantity: Set(input.quantity),
            unit_amount: Set(input.unit_amount),
            tax_rate_id: Set(input.tax_rate_id.map(TaxRateId::into_inner)),
            discount_id: Set(input.discount_id.map(DiscountId::into_inner)),
            tax_rate_basis_points: Set(line.tax_rate_basis_points),
            subtotal: Set(line.subtotal),
            discount_amount: Set(line.discount_amount),
            tax_amount: Set(line.tax_amount),
            total: Set(line.total),
            created_at: Set(now),
            updated_at: Set(now),
        };
        rows.push(row.insert(conn).await?);
    }
    Ok(rows)
}

/// Rebuilds document totals from stored line rows.
pub(crate) fn totals_from_rows(rows: &[invoice_line_items::Model]) -> DocumentTotals {
    let lines: Vec<PricedLine> = rows
        .iter()
        .map(|row| PricedLine {
            subtotal: row.subtotal,
            discount_amount: row.discount_amount,
            taxable_base: row.subtotal - row.discount_amount,
            tax_amount: row.tax_amount,
            total: row.total,
            tax_rate_basis_points: row.tax_rate_basis_points,
        })
        .collect();
    PricingService::document_totals(&lines)
}

/// Recalculates an invoice's paid/due figures and status from its ledger
/// and stores them with a version compare-and-swap.
///
/// When `totals` is given (after a line mutation) the monetary columns are
/// rewritten too and the tally runs against the new total. A status change
/// appends a `StatusChanged` event. Returns the updated row.
pub(crate) async fn recalculate_invoice<C: ConnectionTrait>(
    conn: &C,
    invoice: &invoices::Model,
    totals: Option<DocumentTotals>,
    today: NaiveDate,
) -> Result<invoices::Model, SupportError> {
    let amounts: Vec<i64> = payments::Entity::find()
        .filter(payments::Column::InvoiceId.eq(invoice.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| p.amount)
        .collect();

    let totals = totals.unwrap_or(DocumentTotals {
        subtotal: invoice.subtotal,
        tax_total: invoice.tax_total,
        total: invoice.total,
    });
    let tally = PaymentService::tally(totals.total, &amounts)?;

    let previous_status: InvoiceStatus = invoice.status.into();
    let status = InvoiceService::derive_status(
        previous_status,
        totals.total,
        tally.amount_paid,
        invoice.due_at,
        today,
    );

    let result = invoices::Entity::update_many()
        .col_expr(invoices::Column::Subtotal, Expr::value(totals.subtotal))
        .col_expr(invoices::Column::TaxTotal, Expr::value(totals.tax_total))
        .col_expr(invoices::Column::Total, Expr::value(totals.total))
        .col_expr(invoices::Column::AmountPaid, Expr::value(tally.amount_paid))
        .col_expr(invoices::Column::AmountDue, Expr::value(tally.amount_due))
        .col_expr(
            invoices::Column::Status,
            Expr::value(sea_orm_active_enums::InvoiceStatus::from(status)),
        )
        .col_expr(invoices::Column::Version, Expr::value(invoice.version + 1))
        .col_expr(invoices::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(invoices::Column::Id.eq(invoice.id))
        .filter(invoices::Column::Version.eq(invoice.version))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(SupportError::ConcurrentModification(invoice.id));
    }

    if status != previous_status {
        append_event(
            conn,
            invoice.id,
            &InvoiceEvent::StatusChanged {
                from: previous_status,
                to: status,
            },
        )
        .await?;
    }

    let mut updated = invoice.clone();
    updated.subtotal = totals.subtotal;
    updated.tax_total = totals.tax_total;
    updated.total = totals.total;
    updated.amount_paid = tally.amount_paid;
    updated.amount_due = tally.amount_due;
    updated.status = status.into();
    updated.version = invoice.version + 1;
    Ok(updated)
}

/// Counts one discount redemption per line that carries one.
///
/// Runs at issuance; drafts can be edited or deleted without consuming
/// redemptions. The increment carries the cap in its predicate: two drafts
/// can each pass pricing while one redemption remains, so the count must
/// not move past the limit here. A zero-row update means the cap ran out
/// between pricing and issuance, and the whole issuance rolls back.
pub(crate) async fn redeem_discounts<C: ConnectionTrait>(
    conn: &C,
    items: &[invoice_line_items::Model],
) -> Result<(), SupportError> {
    for item in items {
        if let Some(discount_id) = item.discount_id {
            let result = discounts::Entity::update_many()
                .col_expr(
                    discounts::Column::RedemptionCount,
                    Expr::col(discounts::Column::RedemptionCount).add(1),
                )
                .filter(discounts::Column::Id.eq(discount_id))
                .filter(
                    Condition::any()
                        .add(discounts::Column::RedemptionLimit.is_null())
                        .add(
                            Expr::col(discounts::Column::RedemptionCount)
                                .lt(Expr::col(discounts::Column::RedemptionLimit)),
                        ),
                )
                .exec(conn)
                .await?;
            if result.rows_affected == 0 {
                return Err(SupportError::Pricing(PricingError::DiscountNotApplicable(
                    DiscountId::from_uuid(discount_id),
                )));
            }
        }
    }
    Ok(())
}

/// Appends an event to an invoice's history.
pub(crate) async fn append_event<C: ConnectionTrait>(
    conn: &C,
    invoice_id: Uuid,
    event: &InvoiceEvent,
) -> Result<(), DbErr> {
    let payload = serde_json::to_value(event).map_err(|e| DbErr::Json(e.to_string()))?;
    let row = invoice_events::ActiveModel {
        id: Set(Uuid::now_v7()),
        invoice_id: Set(invoice_id),
        kind: Set(event.kind().to_string()),
        payload: Set(payload),
        occurred_at: Set(Utc::now().into()),
    };
    row.insert(conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn line_with_discount(discount_id: Uuid) -> invoice_line_items::Model {
        let now = Utc::now().into();
        invoice_line_items::Model {
            id: Uuid::now_v7(),
            invoice_id: Uuid::now_v7(),
            position: 1,
            description: "Consulting".to_string(),
            quantity: Decimal::ONE,
            unit_amount: 10_000,
            tax_rate_id: None,
            discount_id: Some(discount_id),
            tax_rate_basis_points: None,
            subtotal: 10_000,
            discount_amount: 1_000,
            tax_amount: 0,
            total: 9_000,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_redeem_discounts_counts_within_the_cap() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let items = vec![line_with_discount(Uuid::now_v7())];
        assert!(redeem_discounts(&db, &items).await.is_ok());
    }

    #[tokio::test]
    async fn test_redeem_discounts_fails_closed_when_cap_is_exhausted() {
        // The guarded increment matches zero rows once the limit is
        // reached, even though the line passed pricing back when a
        // redemption was still available.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let discount_id = Uuid::now_v7();
        let items = vec![line_with_discount(discount_id)];
        let err = redeem_discounts(&db, &items).await.unwrap_err();
        match err {
            SupportError::Pricing(PricingError::DiscountNotApplicable(id)) => {
                assert_eq!(id, DiscountId::from_uuid(discount_id));
            }
            other => panic!("expected DiscountNotApplicable, got {other:?}"),
        }
    }
}
