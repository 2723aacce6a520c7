//! Discount catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthOwner};
use faktura_core::catalog::NewDiscount;
use faktura_db::CatalogRepository;
use faktura_shared::types::DiscountId;

/// Creates the discount routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/discounts", post(create_discount))
        .route("/discounts", get(list_discounts))
        .route("/discounts/{id}", get(get_discount))
        .route("/discounts/{id}", delete(deactivate_discount))
}

async fn create_discount(
    State(state): State<AppState>,
    owner: AuthOwner,
    Json(input): Json<NewDiscount>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let discount = repo.create_discount(owner.owner_id(), input).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

async fn list_discounts(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let discounts = repo.list_discounts(owner.owner_id()).await?;
    Ok(Json(discounts))
}

async fn get_discount(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let discount = repo
        .get_discount(owner.owner_id(), DiscountId::from_uuid(id))
        .await?;
    Ok(Json(discount))
}

async fn deactivate_discount(
    State(state): State<AppState>,
    owner: AuthOwner,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CatalogRepository::new((*state.db).clone());
    let discount = repo
        .deactivate_discount(owner.owner_id(), DiscountId::from_uuid(id))
        .await?;
    Ok(Json(discount))
}
