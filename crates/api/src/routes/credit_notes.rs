//! Credit note routes.
//!
//! A credit note is a standalone store of value tied to a customer.
//! Applying value to an invoice writes a mirror payment on that invoice's
//! ledger; the two sides always move together.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthOwner};
use faktura_core::payment::NewCreditNote;
use faktura_db::CreditNoteRepository;
use faktura_shared::Clock;
use faktura_shared::types::{CreditNoteId, CustomerId, InvoiceId};

/// Creates the credit note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/credit-notes", post(create_credit_note))
        .route("/credit-notes", get(list_credit_notes))
        .route("/credit-notes/{id}", get(get_credit_note))
        .route("/credit-notes/{id}", delete(delete_credit_note))
        .route("/credit-notes/{id}/apply", post(apply_credit_note))
        .route("/credit-notes/{id}/applications", get(list_applications))
}

/// Query parameters for listing credit notes.
#[derive(Debug, Deserialize)]
pub struct ListCreditNotesQuery {
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
}

/// Request body for applying credit note value to an invoice.
#[derive(Debug, Deserialize)]
pub struct ApplyCreditNoteRequest {
    /// Target invoice.
    pub invoice_id: Uuid,
    /// Amount to apply, in minor units.
    pub amount: i64,
}

async fn create_credit_note(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(input): Json<NewCreditNote>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CreditNoteRepository::new((*state.db).clone());
    let note = repo
        .create(owner.owner_id(), input, state.clock.today())
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn list_credit_notes(
    State(state): State<AppState>,
    owner: AuthOwner,
    Query(query): Query<ListCreditNotesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CreditNoteRepository::new((*state.db).clone());
    let notes = repo
        .list(owner.owner_id(), query.customer_id.map(CustomerId::from_uuid))
        .await?;
    Ok(Json(notes))
}

async fn get_credit_note(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CreditNoteRepository::new((*state.db).clone());
    let note = repo
        .get(owner.owner_id(), CreditNoteId::from_uuid(id))
        .await?;
    Ok(Json(note))
}

async fn apply_credit_note(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplyCreditNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CreditNoteRepository::new((*state.db).clone());
    let result = repo
        .apply(
            owner.owner_id(),
            CreditNoteId::from_uuid(id),
            InvoiceId::from_uuid(request.invoice_id),
            request.amount,
            state.clock.today(),
        )
        .await?;
    info!(
        credit_note_id = %id,
        invoice_id = %request.invoice_id,
        amount = request.amount,
        "credit note applied"
    );
    Ok(Json(serde_json::json!({
        "credit_note": result.credit_note,
        "application": result.application,
        "payment": result.payment,
        "invoice": result.invoice,
    })))
}

async fn list_applications(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CreditNoteRepository::new((*state.db).clone());
    let applications = repo
        .list_applications(owner.owner_id(), CreditNoteId::from_uuid(id))
        .await?;
    Ok(Json(applications))
}

/// Only unused notes may go; applied notes are part of the audit trail.
async fn delete_credit_note(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CreditNoteRepository::new((*state.db).clone());
    repo.delete(owner.owner_id(), CreditNoteId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
