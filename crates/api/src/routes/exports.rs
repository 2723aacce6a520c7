//! CSV export routes.
//!
//! Amounts leave the integer domain only here, rendered through the
//! currency's exponent. Exports stream nothing fancy; they page through the
//! repository and build the document in memory.

use axum::{
    Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use sea_orm::ActiveEnum;

use crate::{AppState, error::ApiError, middleware::AuthOwner, routes::display_amount};
use faktura_db::{InvoiceRepository, PaymentRepository};
use faktura_db::repositories::InvoiceFilter;
use faktura_shared::types::PageRequest;

/// Creates the export routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exports/invoices.csv", get(export_invoices))
        .route("/exports/payments.csv", get(export_payments))
}

/// Quotes a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

async fn export_invoices(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> Result<impl IntoResponse, ApiError> {
    let repo = InvoiceRepository::new((*state.db).clone());
    let owner_id = owner.owner_id();

    let mut out = String::from(
        "number,customer_id,currency,status,issued_at,due_at,subtotal,tax_total,total,amount_paid,amount_due\n",
    );
    let mut page = PageRequest {
        page: 1,
        per_page: 100,
    };
    loop {
        let batch = repo
            .list(owner_id, InvoiceFilter::default(), page.clone())
            .await?;
        for invoice in &batch.data {
            let number = invoice.number.clone().unwrap_or_default();
            let issued_at = invoice.issued_at.map(|d| d.to_string()).unwrap_or_default();
            let due_at = invoice.due_at.map(|d| d.to_string()).unwrap_or_default();
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{},{}\n",
                csv_field(&number),
                invoice.customer_id,
                invoice.currency,
                invoice.status.to_value(),
                issued_at,
                due_at,
                display_amount(&invoice.currency, invoice.subtotal),
                display_amount(&invoice.currency, invoice.tax_total),
                display_amount(&invoice.currency, invoice.total),
                display_amount(&invoice.currency, invoice.amount_paid),
                display_amount(&invoice.currency, invoice.amount_due),
            ));
        }
        if page.page >= batch.meta.total_pages || batch.data.is_empty() {
            break;
        }
        page.page += 1;
    }

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], out))
}

async fn export_payments(
    State(state): State<AppState>,
    owner: AuthOwner,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PaymentRepository::new((*state.db).clone());

    let mut out = String::from("invoice_number,payment_date,method,amount,reference,notes\n");
    for (payment, invoice) in repo.list_for_owner(owner.owner_id()).await? {
        let number = invoice
            .number
            .clone()
            .unwrap_or_else(|| invoice.id.to_string());
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_field(&number),
            payment.payment_date,
            payment.method.to_value(),
            display_amount(&invoice.currency, payment.amount),
            csv_field(payment.reference.as_deref().unwrap_or("")),
            csv_field(payment.notes.as_deref().unwrap_or("")),
        ));
    }

    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], out))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::csv_field;

    #[rstest]
    #[case("plain", "plain")]
    #[case("with,comma", "\"with,comma\"")]
    #[case("say \"hi\"", "\"say \"\"hi\"\"\"")]
    #[case("line\nbreak", "\"line\nbreak\"")]
    #[case("", "")]
    fn test_csv_field_escaping(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(csv_field(input), expected);
    }
}
