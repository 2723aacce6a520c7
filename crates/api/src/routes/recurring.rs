//! Recurring invoice template routes.
//!
//! Templates generate real invoices on a schedule. Manual generation skips
//! the date gate but never the status gate, and a period that was already
//! claimed answers 409 rather than minting a duplicate.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthOwner, routes::invoices::InvoiceResponse};
use faktura_core::invoice::LineItemInput;
use faktura_core::recurring::{NewRecurringInvoice, RecurringStatus};
use faktura_db::RecurringRepository;
use faktura_shared::Clock;
use faktura_shared::types::RecurringInvoiceId;

/// Creates the recurring invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recurring-invoices", post(create_template))
        .route("/recurring-invoices", get(list_templates))
        .route("/recurring-invoices/{id}", get(get_template))
        .route("/recurring-invoices/{id}/lines", put(replace_lines))
        .route("/recurring-invoices/{id}/pause", post(pause_template))
        .route("/recurring-invoices/{id}/resume", post(resume_template))
        .route("/recurring-invoices/{id}/cancel", post(cancel_template))
        .route("/recurring-invoices/{id}/generate", post(generate_now))
}

/// Request body for creating a template.
#[derive(Debug, Deserialize)]
pub struct CreateRecurringRequest {
    /// Schedule and document defaults.
    #[serde(flatten)]
    pub template: NewRecurringInvoice,
    /// Lines to snapshot into each generated invoice.
    pub lines: Vec<LineItemInput>,
}

/// Query parameters for listing templates.
#[derive(Debug, Deserialize)]
pub struct ListRecurringQuery {
    /// Filter by status.
    pub status: Option<RecurringStatus>,
}

async fn create_template(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(request): Json<CreateRecurringRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RecurringRepository::new((*state.db).clone());
    let result = repo
        .create(owner.owner_id(), request.template, request.lines)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "template": result.template,
            "lines": result.lines,
        })),
    ))
}

async fn list_templates(
    State(state): State<AppState>,
    owner: AuthOwner,
    Query(query): Query<ListRecurringQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RecurringRepository::new((*state.db).clone());
    let templates = repo.list(owner.owner_id(), query.status).await?;
    Ok(Json(templates))
}

async fn get_template(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RecurringRepository::new((*state.db).clone());
    let result = repo
        .get(owner.owner_id(), RecurringInvoiceId::from_uuid(id))
        .await?;
    Ok(Json(serde_json::json!({
        "template": result.template,
        "lines": result.lines,
    })))
}

/// Lines are replaced wholesale; already-generated invoices keep their
/// snapshots.
async fn replace_lines(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
    Json(lines): Json<Vec<LineItemInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RecurringRepository::new((*state.db).clone());
    let result = repo
        .replace_lines(owner.owner_id(), RecurringInvoiceId::from_uuid(id), lines)
        .await?;
    Ok(Json(serde_json::json!({
        "template": result.template,
        "lines": result.lines,
    })))
}

async fn pause_template(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RecurringRepository::new((*state.db).clone());
    let template = repo
        .pause(owner.owner_id(), RecurringInvoiceId::from_uuid(id))
        .await?;
    Ok(Json(template))
}

async fn resume_template(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RecurringRepository::new((*state.db).clone());
    let template = repo
        .resume(owner.owner_id(), RecurringInvoiceId::from_uuid(id))
        .await?;
    Ok(Json(template))
}

async fn cancel_template(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RecurringRepository::new((*state.db).clone());
    let template = repo
        .cancel(owner.owner_id(), RecurringInvoiceId::from_uuid(id))
        .await?;
    Ok(Json(template))
}

async fn generate_now(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = RecurringRepository::new((*state.db).clone());
    let result = repo
        .generate(
            owner.owner_id(),
            RecurringInvoiceId::from_uuid(id),
            state.clock.today(),
            true,
        )
        .await?;
    info!(
        recurring_invoice_id = %id,
        invoice_id = %result.invoice.id,
        "invoice generated from template"
    );
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(result))))
}
