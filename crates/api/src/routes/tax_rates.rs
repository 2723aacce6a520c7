//! Tax rate catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthOwner};
use faktura_core::catalog::NewTaxRate;
use faktura_db::CatalogRepository;
use faktura_shared::types::TaxRateId;

/// Creates the tax rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tax-rates", post(create_tax_rate))
        .route("/tax-rates", get(list_tax_rates))
        .route("/tax-rates/{id}", get(get_tax_rate))
        .route("/tax-rates/{id}", put(update_tax_rate))
        .route("/tax-rates/{id}", delete(deactivate_tax_rate))
}

async fn create_tax_rate(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(input): Json<NewTaxRate>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let rate = repo.create_tax_rate(owner.owner_id(), input).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

async fn list_tax_rates(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let rates = repo.list_tax_rates(owner.owner_id()).await?;
    Ok(Json(rates))
}

async fn get_tax_rate(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let rate = repo
        .get_tax_rate(owner.owner_id(), TaxRateId::from_uuid(id))
        .await?;
    Ok(Json(rate))
}

async fn update_tax_rate(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
    Json(input): Json<NewTaxRate>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let rate = repo
        .update_tax_rate(owner.owner_id(), TaxRateId::from_uuid(id), input)
        .await?;
    Ok(Json(rate))
}

/// Deactivation, not deletion: lines on issued invoices keep the
/// basis-point rate they were priced with.
async fn deactivate_tax_rate(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let rate = repo
        .deactivate_tax_rate(owner.owner_id(), TaxRateId::from_uuid(id))
        .await?;
    Ok(Json(rate))
}
