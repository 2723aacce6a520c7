//! API route definitions.

use axum::{Router, middleware};
use std::str::FromStr;

use crate::{AppState, middleware::auth::auth_middleware};
use faktura_shared::types::money::{Currency, Money};

pub mod credit_notes;
pub mod dashboard;
pub mod discounts;
pub mod exports;
pub mod health;
pub mod invoices;
pub mod payments;
pub mod recurring;
pub mod tax_rates;

/// Creates the API router: a public health check plus protected routes
/// behind the authentication middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(tax_rates::routes())
        .merge(discounts::routes())
        .merge(invoices::routes())
        .merge(payments::routes())
        .merge(credit_notes::routes())
        .merge(recurring::routes())
        .merge(dashboard::routes())
        .merge(exports::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Renders a stored minor-unit amount as a decimal string.
///
/// Stored currency codes are written by us and always parse; the integer
/// fallback only fires on hand-edited data.
pub(crate) fn display_amount(currency: &str, amount: i64) -> String {
    Currency::from_str(currency)
        .map_or_else(|_| amount.to_string(), |c| Money::new(amount, c).to_decimal_string())
}
