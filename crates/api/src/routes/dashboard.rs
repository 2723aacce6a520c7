//! Dashboard routes: status breakdown, per-currency totals, and upcoming
//! recurring runs.
//!
//! Totals are reported per currency; a converted grand total in a
//! requested display currency is computed through the rate source and is
//! dropped, not fatal, when the provider is unreachable.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::Days;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

use crate::{AppState, error::ApiError, middleware::AuthOwner, routes::display_amount};
use faktura_core::currency::convert_minor;
use faktura_db::DashboardRepository;
use faktura_db::entities::recurring_invoices;
use faktura_db::repositories::{CurrencyOutstanding, StatusCount};
use faktura_shared::Clock;
use faktura_shared::types::money::{Currency, Money};

use crate::rates::RateSourceError;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Query parameters for the dashboard.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Display currency for the converted outstanding total.
    pub currency: Option<Currency>,
}

/// Billing totals in one currency, with display renderings.
#[derive(Debug, Serialize)]
pub struct TotalsEntry {
    /// ISO 4217 currency code.
    pub currency: String,
    /// Open balance across payable invoices, in minor units.
    pub outstanding: i64,
    /// Open balance rendered with the currency's exponent.
    pub outstanding_display: String,
    /// Portion of the outstanding balance that is past due.
    pub overdue: i64,
    /// Sum collected across non-void invoices.
    pub collected: i64,
}

/// Outstanding total converted into the requested display currency.
#[derive(Debug, Serialize)]
pub struct ConvertedTotal {
    /// Display currency.
    pub currency: Currency,
    /// Converted open balance in minor units.
    pub outstanding: i64,
    /// Converted balance rendered with the currency's exponent.
    pub outstanding_display: String,
}

/// Dashboard response.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    /// Invoice counts per status.
    pub status_counts: Vec<StatusCount>,
    /// Billing totals per currency.
    pub totals: Vec<TotalsEntry>,
    /// Active templates due within the next 30 days.
    pub upcoming_recurring: Vec<recurring_invoices::Model>,
    /// Cross-currency outstanding total, when a display currency was
    /// requested and rates were available.
    pub converted_total: Option<ConvertedTotal>,
    /// False when the rate source failed and conversion was skipped.
    pub rates_available: bool,
}

async fn dashboard(
    State(state): State<AppState>,
    owner: AuthOwner,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DashboardRepository::new((*state.db).clone());
    let owner_id = owner.owner_id();
    let today = state.clock.today();

    let status_counts = repo.status_breakdown(owner_id).await?;
    let by_currency = repo.totals_by_currency(owner_id).await?;
    let until = today.checked_add_days(Days::new(30)).unwrap_or(today);
    let upcoming_recurring = repo.upcoming_recurring(owner_id, until).await?;

    let mut rates_available = true;
    let converted_total = match query.currency {
        None => None,
        Some(target) => match convert_outstanding(&state, &by_currency, target).await {
            Ok(total) => total.map(|outstanding| ConvertedTotal {
                currency: target,
                outstanding,
                outstanding_display: Money::new(outstanding, target).to_decimal_string(),
            }),
            Err(e) => {
                warn!(error = %e, "rate source unavailable, skipping conversion");
                rates_available = false;
                None
            }
        },
    };

    let totals = by_currency
        .into_iter()
        .map(|row| TotalsEntry {
            outstanding_display: display_amount(&row.currency, row.outstanding),
            currency: row.currency,
            outstanding: row.outstanding,
            overdue: row.overdue,
            collected: row.collected,
        })
        .collect();

    Ok(Json(DashboardResponse {
        status_counts,
        totals,
        upcoming_recurring,
        converted_total,
        rates_available,
    }))
}

/// Converts each per-currency outstanding balance into `target` and sums.
///
/// Returns `Ok(None)` if a stored currency code fails to parse or the sum
/// leaves the representable range.
async fn convert_outstanding(
    state: &AppState,
    rows: &[CurrencyOutstanding],
    target: Currency,
) -> Result<Option<i64>, RateSourceError> {
    let mut total: i64 = 0;
    for row in rows {
        let Ok(from) = Currency::from_str(&row.currency) else {
            return Ok(None);
        };
        let quote = state.rates.quote(from, target).await?;
        let Some(converted) = convert_minor(row.outstanding, from, target, quote.rate) else {
            return Ok(None);
        };
        let Some(sum) = total.checked_add(converted) else {
            return Ok(None);
        };
        total = sum;
    }
    Ok(Some(total))
}
