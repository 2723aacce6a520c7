//! Translation of domain and repository errors into HTTP responses.
//!
//! Every handler returns `Result<_, ApiError>`; the `From` impls below keep
//! the mapping in one place. Bad input becomes 422 with the offending field,
//! forbidden lifecycle transitions become 409 `INVALID_STATE`, and lost
//! optimistic-concurrency races become 409 `CONFLICT` with `retryable: true`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use faktura_core::catalog::CatalogError;
use faktura_core::invoice::InvoiceError;
use faktura_core::payment::{CreditNoteError, PaymentError};
use faktura_core::pricing::PricingError;
use faktura_core::recurring::RecurringError;
use faktura_db::repositories::{
    CatalogRepoError, CreditNoteRepoError, DashboardRepoError, InvoiceRepoError, PaymentRepoError,
    RecurringRepoError,
};
use faktura_shared::AppError;

use crate::rates::RateSourceError;

/// Wrapper giving `AppError` an HTTP rendering.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = json!({
            "error": self.0.error_code(),
            "message": self.0.to_string(),
            "retryable": self.0.is_retryable(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        let field = match value {
            CatalogError::EmptyName => "name",
            CatalogError::EmptyCode => "code",
            CatalogError::InvalidTaxRate(_) => "rate_basis_points",
            CatalogError::InvalidCountryCode(_) => "country_code",
            CatalogError::InvalidPercentValue(_) | CatalogError::InvalidFixedValue(_) => "value",
            CatalogError::InvalidValidityWindow { .. } => "valid_until",
            CatalogError::InvalidRedemptionLimit(_) => "redemption_limit",
        };
        Self(AppError::Validation {
            field,
            message: value.to_string(),
        })
    }
}

impl From<PricingError> for ApiError {
    fn from(value: PricingError) -> Self {
        let field = match value {
            PricingError::InvalidQuantity(_) => "quantity",
            PricingError::NegativeUnitAmount(_) | PricingError::AmountOverflow => "unit_amount",
            PricingError::TaxRateNotApplicable(_) => "tax_rate_id",
            PricingError::DiscountNotApplicable(_) => "discount_id",
        };
        Self(AppError::Validation {
            field,
            message: value.to_string(),
        })
    }
}

impl From<InvoiceError> for ApiError {
    fn from(value: InvoiceError) -> Self {
        match value {
            InvoiceError::NotEditable(_)
            | InvoiceError::NotDeletable(_)
            | InvoiceError::NotIssuable(_)
            | InvoiceError::NotVoidable(_)
            | InvoiceError::NoLineItems => Self(AppError::InvalidState(value.to_string())),
            InvoiceError::InvalidNetTerms(_) | InvoiceError::DueDateOutOfRange(_) => {
                Self(AppError::Validation {
                    field: "net_terms_days",
                    message: value.to_string(),
                })
            }
            InvoiceError::EmptyDescription => Self(AppError::Validation {
                field: "description",
                message: value.to_string(),
            }),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(value: PaymentError) -> Self {
        match value {
            PaymentError::NonPositiveAmount(_) | PaymentError::ExceedsAmountDue { .. } => {
                Self(AppError::Validation {
                    field: "amount",
                    message: value.to_string(),
                })
            }
            PaymentError::InvoiceNotPayable(_) => Self(AppError::InvalidState(value.to_string())),
            // A ledger exceeding its invoice total means writers raced; the
            // caller can retry once recalculation settles.
            PaymentError::LedgerExceedsTotal { .. } => Self(AppError::Conflict(value.to_string())),
            PaymentError::AmountOverflow => Self(AppError::Internal(value.to_string())),
        }
    }
}

impl From<CreditNoteError> for ApiError {
    fn from(value: CreditNoteError) -> Self {
        match value {
            CreditNoteError::NonPositiveAmount(_)
            | CreditNoteError::ExceedsRemaining { .. }
            | CreditNoteError::ExceedsAmountDue { .. } => Self(AppError::Validation {
                field: "amount",
                message: value.to_string(),
            }),
            CreditNoteError::EmptyReason => Self(AppError::Validation {
                field: "reason",
                message: value.to_string(),
            }),
            CreditNoteError::InvoiceNotPayable(_)
            | CreditNoteError::CurrencyMismatch { .. }
            | CreditNoteError::HasApplications(_) => {
                Self(AppError::InvalidState(value.to_string()))
            }
        }
    }
}

impl From<RecurringError> for ApiError {
    fn from(value: RecurringError) -> Self {
        let field = match value {
            RecurringError::EmptyName => "name",
            RecurringError::InvalidIntervalCount(_) => "interval_count",
            RecurringError::InvalidBillingDay(_) | RecurringError::BillingDayNotApplicable => {
                "billing_day_of_month"
            }
            RecurringError::InvalidEndDate { .. } => "end_date",
            RecurringError::InvalidOccurrencesLimit => "occurrences_limit",
            RecurringError::NotActive(_)
            | RecurringError::NotDue(_)
            | RecurringError::InvalidTransition { .. }
            | RecurringError::NoTemplateLines => {
                return Self(AppError::InvalidState(value.to_string()));
            }
            RecurringError::ScheduleOverflow => {
                return Self(AppError::Internal(value.to_string()));
            }
        };
        Self(AppError::Validation {
            field,
            message: value.to_string(),
        })
    }
}

impl From<CatalogRepoError> for ApiError {
    fn from(value: CatalogRepoError) -> Self {
        match value {
            CatalogRepoError::TaxRateNotFound(_) | CatalogRepoError::DiscountNotFound(_) => {
                Self(AppError::NotFound(value.to_string()))
            }
            CatalogRepoError::DuplicateCode(_) => Self(AppError::Conflict(value.to_string())),
            CatalogRepoError::Validation(e) => e.into(),
            CatalogRepoError::Database(e) => Self(AppError::Database(e.to_string())),
        }
    }
}

impl From<InvoiceRepoError> for ApiError {
    fn from(value: InvoiceRepoError) -> Self {
        match value {
            InvoiceRepoError::NotFound(_)
            | InvoiceRepoError::LineNotFound(_)
            | InvoiceRepoError::TaxRateNotFound(_)
            | InvoiceRepoError::DiscountNotFound(_) => Self(AppError::NotFound(value.to_string())),
            InvoiceRepoError::Lifecycle(e) => e.into(),
            InvoiceRepoError::Pricing(e) => e.into(),
            InvoiceRepoError::Ledger(e) => e.into(),
            InvoiceRepoError::ConcurrentModification(_) => {
                Self(AppError::Conflict(value.to_string()))
            }
            InvoiceRepoError::Database(e) => Self(AppError::Database(e.to_string())),
        }
    }
}

impl From<PaymentRepoError> for ApiError {
    fn from(value: PaymentRepoError) -> Self {
        match value {
            PaymentRepoError::InvoiceNotFound(_) | PaymentRepoError::NotFound(_) => {
                Self(AppError::NotFound(value.to_string()))
            }
            PaymentRepoError::Ledger(e) => e.into(),
            PaymentRepoError::CreditNotePayment(_) => {
                Self(AppError::InvalidState(value.to_string()))
            }
            PaymentRepoError::ConcurrentModification(_) => {
                Self(AppError::Conflict(value.to_string()))
            }
            PaymentRepoError::Database(e) => Self(AppError::Database(e.to_string())),
        }
    }
}

impl From<CreditNoteRepoError> for ApiError {
    fn from(value: CreditNoteRepoError) -> Self {
        match value {
            CreditNoteRepoError::NotFound(_) | CreditNoteRepoError::InvoiceNotFound(_) => {
                Self(AppError::NotFound(value.to_string()))
            }
            CreditNoteRepoError::Note(e) => e.into(),
            CreditNoteRepoError::Ledger(e) => e.into(),
            CreditNoteRepoError::InvalidCurrency(_) => Self(AppError::Internal(value.to_string())),
            CreditNoteRepoError::ConcurrentModification(_) => {
                Self(AppError::Conflict(value.to_string()))
            }
            CreditNoteRepoError::Database(e) => Self(AppError::Database(e.to_string())),
        }
    }
}

impl From<RecurringRepoError> for ApiError {
    fn from(value: RecurringRepoError) -> Self {
        match value {
            RecurringRepoError::NotFound(_)
            | RecurringRepoError::TaxRateNotFound(_)
            | RecurringRepoError::DiscountNotFound(_) => {
                Self(AppError::NotFound(value.to_string()))
            }
            RecurringRepoError::Schedule(e) => e.into(),
            RecurringRepoError::Pricing(e) => e.into(),
            RecurringRepoError::Lifecycle(e) => e.into(),
            RecurringRepoError::AlreadyGenerated(_)
            | RecurringRepoError::ConcurrentModification(_) => {
                Self(AppError::Conflict(value.to_string()))
            }
            RecurringRepoError::Database(e) => Self(AppError::Database(e.to_string())),
        }
    }
}

impl From<DashboardRepoError> for ApiError {
    fn from(value: DashboardRepoError) -> Self {
        match value {
            DashboardRepoError::Database(e) => Self(AppError::Database(e.to_string())),
        }
    }
}

impl From<RateSourceError> for ApiError {
    fn from(value: RateSourceError) -> Self {
        Self(AppError::ExternalService(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faktura_core::invoice::InvoiceStatus;
    use uuid::Uuid;

    #[test]
    fn test_catalog_validation_names_the_field() {
        let err = ApiError::from(CatalogError::InvalidTaxRate(20_000));
        match err.0 {
            AppError::Validation { field, .. } => assert_eq!(field, "rate_basis_points"),
            other => panic!("expected validation, got {other:?}"),
        }
    }

    #[test]
    fn test_lifecycle_rejection_is_invalid_state() {
        let err = ApiError::from(InvoiceError::NotEditable(InvoiceStatus::Issued));
        assert!(matches!(err.0, AppError::InvalidState(_)));
        assert_eq!(err.0.status_code(), 409);
    }

    #[test]
    fn test_lost_race_is_retryable_conflict() {
        let err = ApiError::from(InvoiceRepoError::ConcurrentModification(Uuid::nil()));
        assert!(matches!(err.0, AppError::Conflict(_)));
        assert!(err.0.is_retryable());
    }

    #[test]
    fn test_already_generated_is_conflict() {
        let err = ApiError::from(RecurringRepoError::AlreadyGenerated(Uuid::nil()));
        assert_eq!(err.0.status_code(), 409);
        assert!(err.0.is_retryable());
    }

    #[test]
    fn test_overpayment_is_unprocessable() {
        let err = ApiError::from(PaymentError::ExceedsAmountDue {
            amount: 500,
            amount_due: 100,
        });
        assert_eq!(err.0.status_code(), 422);
        assert!(!err.0.is_retryable());
    }

    #[test]
    fn test_missing_invoice_is_not_found() {
        let err = ApiError::from(PaymentRepoError::InvoiceNotFound(Uuid::nil()));
        assert_eq!(err.0.status_code(), 404);
    }
}
