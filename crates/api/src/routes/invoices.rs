//! Invoice lifecycle routes.
//!
//! Drafts are the only editable state; issuance assigns the sequential
//! number and starts the payment clock. Monetary fields are integer minor
//! units with decimal strings added for display.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthOwner, routes::display_amount};
use faktura_core::invoice::{InvoiceStatus, LineItemInput, NewInvoice};
use faktura_db::InvoiceRepository;
use faktura_db::entities::{invoice_events, invoice_line_items, invoices};
use faktura_db::repositories::{InvoiceFilter, InvoiceWithItems};
use faktura_shared::Clock;
use faktura_shared::types::{CustomerId, InvoiceId, LineItemId, PageRequest};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", post(create_invoice))
        .route("/invoices", get(list_invoices))
        .route("/invoices/{id}", get(get_invoice))
        .route("/invoices/{id}", delete(delete_invoice))
        .route("/invoices/{id}/lines", post(add_line))
        .route("/invoices/{id}/lines/{line_id}", put(update_line))
        .route("/invoices/{id}/lines/{line_id}", delete(remove_line))
        .route("/invoices/{id}/issue", post(issue_invoice))
        .route("/invoices/{id}/void", post(void_invoice))
}

/// Query parameters for listing invoices.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Filter by customer.
    pub customer_id: Option<Uuid>,
    /// Issued on or after this date (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Issued on or before this date (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

/// An invoice with display amounts and its line items.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice header columns.
    #[serde(flatten)]
    pub invoice: invoices::Model,
    /// Total rendered with the currency's exponent.
    pub total_display: String,
    /// Open balance rendered with the currency's exponent.
    pub amount_due_display: String,
    /// Line items, ordered by position.
    pub items: Vec<invoice_line_items::Model>,
}

impl From<InvoiceWithItems> for InvoiceResponse {
    fn from(value: InvoiceWithItems) -> Self {
        let total_display = display_amount(&value.invoice.currency, value.invoice.total);
        let amount_due_display = display_amount(&value.invoice.currency, value.invoice.amount_due);
        Self {
            invoice: value.invoice,
            total_display,
            amount_due_display,
            items: value.items,
        }
    }
}

async fn create_invoice(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(input): Json<NewInvoice>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let invoice = repo.create_draft(owner.owner_id(), input).await?;
    Ok((
        StatusCode::CREATED,
        Json(InvoiceResponse::from(InvoiceWithItems {
            invoice,
            items: vec![],
        })),
    ))
}

async fn list_invoices(
    State(state): State<AppState>,
    owner: AuthOwner,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let filter = InvoiceFilter {
        status: query.status,
        customer_id: query.customer_id.map(CustomerId::from_uuid),
        issued_from: query.from,
        issued_to: query.to,
    };
    let mut page = PageRequest::default();
    if let Some(p) = query.page {
        page.page = p;
    }
    if let Some(per) = query.per_page {
        page.per_page = per;
    }
    let invoices = repo.list(owner.owner_id(), filter, page).await?;
    Ok(Json(invoices))
}

/// An invoice with its items and the recorded lifecycle events.
#[derive(Debug, Serialize)]
pub struct InvoiceDetailResponse {
    /// Header, display amounts, and line items.
    #[serde(flatten)]
    pub summary: InvoiceResponse,
    /// Lifecycle events, oldest first.
    pub events: Vec<invoice_events::Model>,
}

async fn get_invoice(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let result = repo.get(owner.owner_id(), InvoiceId::from_uuid(id)).await?;
    let events = repo
        .list_events(owner.owner_id(), InvoiceId::from_uuid(id))
        .await?;
    Ok(Json(InvoiceDetailResponse {
        summary: InvoiceResponse::from(result),
        events,
    }))
}

async fn delete_invoice(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    repo.delete_draft(owner.owner_id(), InvoiceId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_line(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
    Json(input): Json<LineItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let result = repo
        .add_line(owner.owner_id(), InvoiceId::from_uuid(id), input, state.clock.today())
        .await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(result))))
}

async fn update_line(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path((id, line_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<LineItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let result = repo
        .update_line(
            owner.owner_id(),
            InvoiceId::from_uuid(id),
            LineItemId::from_uuid(line_id),
            input,
            state.clock.today(),
        )
        .await?;
    Ok(Json(InvoiceResponse::from(result)))
}

async fn remove_line(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path((id, line_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let result = repo
        .remove_line(
            owner.owner_id(),
            InvoiceId::from_uuid(id),
            LineItemId::from_uuid(line_id),
            state.clock.today(),
        )
        .await?;
    Ok(Json(InvoiceResponse::from(result)))
}

async fn issue_invoice(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let result = repo
        .issue(owner.owner_id(), InvoiceId::from_uuid(id), state.clock.today())
        .await?;
    info!(invoice_id = %id, number = ?result.invoice.number, "invoice issued");
    Ok(Json(InvoiceResponse::from(result)))
}

async fn void_invoice(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    repo.void(owner.owner_id(), InvoiceId::from_uuid(id)).await?;
    info!(invoice_id = %id, "invoice voided");
    let result = repo.get(owner.owner_id(), InvoiceId::from_uuid(id)).await?;
    Ok(Json(InvoiceResponse::from(result)))
}
