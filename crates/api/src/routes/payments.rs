//! Payment ledger routes.
//!
//! Payments are sub-resources of their invoice; every mutation returns the
//! recalculated invoice so clients never display a stale balance.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthOwner, routes::display_amount};
use faktura_core::payment::NewPayment;
use faktura_db::PaymentRepository;
use faktura_db::entities::{invoices, payments};
use faktura_shared::Clock;
use faktura_shared::types::{InvoiceId, PaymentId};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices/{id}/payments", post(record_payment))
        .route("/invoices/{id}/payments", get(list_payments))
        .route("/invoices/{id}/payments/{payment_id}", delete(delete_payment))
}

/// A recorded payment with the invoice it settled against.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// The payment row.
    pub payment: payments::Model,
    /// The invoice after recalculation.
    pub invoice: invoices::Model,
    /// Open balance rendered with the currency's exponent.
    pub amount_due_display: String,
}

async fn record_payment(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
    Json(input): Json<NewPayment>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PaymentRepository::new((*state.db).clone());
    let outcome = repo
        .record(owner.owner_id(), InvoiceId::from_uuid(id), input, state.clock.today())
        .await?;
    info!(
        invoice_id = %id,
        payment_id = %outcome.payment.id,
        amount = outcome.payment.amount,
        "payment recorded"
    );
    let amount_due_display =
        display_amount(&outcome.invoice.currency, outcome.invoice.amount_due);
    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            payment: outcome.payment,
            invoice: outcome.invoice,
            amount_due_display,
        }),
    ))
}

async fn list_payments(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PaymentRepository::new((*state.db).clone());
    let payments = repo
        .list_for_invoice(owner.owner_id(), InvoiceId::from_uuid(id))
        .await?;
    Ok(Json(payments))
}

/// Deleting a mistaken payment reopens a paid invoice if a balance
/// remains. Payments mirroring credit note applications are refused.
async fn delete_payment(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path((id, payment_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PaymentRepository::new((*state.db).clone());
    let invoice = repo
        .delete(
            owner.owner_id(),
            InvoiceId::from_uuid(id),
            PaymentId::from_uuid(payment_id),
            state.clock.today(),
        )
        .await?;
    info!(invoice_id = %id, payment_id = %payment_id, "payment deleted");
    Ok(Json(invoice))
}
