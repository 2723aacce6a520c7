//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for catalog, invoices, payments, credit notes, and
//!   recurring invoices
//! - Authentication middleware
//! - An exchange-rate client for dashboard consolidation

pub mod error;
pub mod middleware;
pub mod rates;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use faktura_shared::{Clock, JwtService};

use crate::rates::HttpRateSource;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Source of "today" for status derivation and schedule gating.
    pub clock: Arc<dyn Clock>,
    /// Exchange-rate client; display-only, never on the billing path.
    pub rates: Arc<HttpRateSource>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
