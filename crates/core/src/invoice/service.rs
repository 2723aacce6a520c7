//! Invoice state machine and lifecycle service.

use chrono::{Days, NaiveDate};

use super::error::InvoiceError;
use super::types::{InvoiceNumber, InvoiceStatus, IssueOutcome, LineItemInput, NewInvoice};

/// Stateless invoice lifecycle logic.
///
/// Persistence and locking live in the repository layer; this service
/// decides which transitions are legal and derives status from the ledger.
pub struct InvoiceService;

impl InvoiceService {
    /// Validates a draft creation input.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidNetTerms` for negative net terms.
    pub fn validate_new(input: &NewInvoice) -> Result<(), InvoiceError> {
        if input.net_terms_days < 0 {
            return Err(InvoiceError::InvalidNetTerms(input.net_terms_days));
        }
        Ok(())
    }

    /// Validates the non-monetary fields of a line input.
    ///
    /// Quantity and amount ranges are enforced by the pricer.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::EmptyDescription` for a blank description.
    pub fn validate_line_input(input: &LineItemInput) -> Result<(), InvoiceError> {
        if input.description.trim().is_empty() {
            return Err(InvoiceError::EmptyDescription);
        }
        Ok(())
    }

    /// Rejects line-item mutation outside draft.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotEditable` for any non-draft status.
    pub fn ensure_editable(status: InvoiceStatus) -> Result<(), InvoiceError> {
        if status.is_editable() {
            Ok(())
        } else {
            Err(InvoiceError::NotEditable(status))
        }
    }

    /// Rejects whole-document deletion outside draft.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotDeletable` for any non-draft status.
    pub fn ensure_deletable(status: InvoiceStatus) -> Result<(), InvoiceError> {
        if status.is_deletable() {
            Ok(())
        } else {
            Err(InvoiceError::NotDeletable(status))
        }
    }

    /// Issues a draft: freezes line items, assigns the given sequence number,
    /// and sets the due date to issuance plus net terms.
    ///
    /// The outcome carries the status the document issues into, derived
    /// from the total: a fully discounted document has nothing due and no
    /// payment will ever arrive to settle it, so it issues as paid.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotIssuable` outside draft and
    /// `InvoiceError::NoLineItems` for an empty draft.
    pub fn issue(
        status: InvoiceStatus,
        line_count: usize,
        total: i64,
        net_terms_days: i32,
        number: InvoiceNumber,
        issued_at: NaiveDate,
    ) -> Result<IssueOutcome, InvoiceError> {
        if status != InvoiceStatus::Draft {
            return Err(InvoiceError::NotIssuable(status));
        }
        if line_count == 0 {
            return Err(InvoiceError::NoLineItems);
        }
        let days =
            u64::try_from(net_terms_days).map_err(|_| InvoiceError::InvalidNetTerms(net_terms_days))?;
        let due_at = issued_at
            .checked_add_days(Days::new(days))
            .ok_or(InvoiceError::DueDateOutOfRange(net_terms_days))?;
        let status = Self::derive_status(InvoiceStatus::Issued, total, 0, Some(due_at), issued_at);
        Ok(IssueOutcome {
            number,
            issued_at,
            due_at,
            status,
        })
    }

    /// Voids a document that has not been fully paid.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotVoidable` for paid or already-void documents.
    pub fn void(status: InvoiceStatus) -> Result<InvoiceStatus, InvoiceError> {
        if status.is_voidable() {
            Ok(InvoiceStatus::Void)
        } else {
            Err(InvoiceError::NotVoidable(status))
        }
    }

    /// Derives the current status from the payment ledger.
    ///
    /// Draft and void are sticky; for issued documents the ledger decides:
    /// paid when nothing is due, past-due when the due date has elapsed with
    /// a balance, partially paid when some but not all has been received.
    #[must_use]
    pub fn derive_status(
        current: InvoiceStatus,
        total: i64,
        amount_paid: i64,
        due_at: Option<NaiveDate>,
        today: NaiveDate,
    ) -> InvoiceStatus {
        if matches!(current, InvoiceStatus::Draft | InvoiceStatus::Void) {
            return current;
        }
        let amount_due = total - amount_paid;
        if amount_due == 0 {
            return InvoiceStatus::Paid;
        }
        if let Some(due) = due_at
            && today > due
        {
            return InvoiceStatus::PastDue;
        }
        if amount_paid > 0 {
            InvoiceStatus::PartiallyPaid
        } else {
            InvoiceStatus::Issued
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn number() -> InvoiceNumber {
        InvoiceNumber {
            year: 2026,
            sequence: 42,
        }
    }

    #[test]
    fn test_issue_sets_due_date_from_net_terms() {
        let outcome = InvoiceService::issue(
            InvoiceStatus::Draft,
            2,
            10_000,
            14,
            number(),
            date(2026, 3, 1),
        )
        .unwrap();
        assert_eq!(outcome.issued_at, date(2026, 3, 1));
        assert_eq!(outcome.due_at, date(2026, 3, 15));
        assert_eq!(outcome.number.to_string(), "INV-2026-0042");
        assert_eq!(outcome.status, InvoiceStatus::Issued);
    }

    #[test]
    fn test_issue_with_zero_net_terms_is_due_immediately() {
        let outcome =
            InvoiceService::issue(InvoiceStatus::Draft, 1, 10_000, 0, number(), date(2026, 3, 1))
                .unwrap();
        assert_eq!(outcome.due_at, date(2026, 3, 1));
    }

    #[test]
    fn test_zero_total_issues_as_paid() {
        // A 100%-discounted document has nothing due; zero-amount payments
        // are rejected, so it must not sit in issued forever.
        let outcome =
            InvoiceService::issue(InvoiceStatus::Draft, 1, 0, 14, number(), date(2026, 3, 1))
                .unwrap();
        assert_eq!(outcome.status, InvoiceStatus::Paid);
    }

    #[rstest]
    #[case(InvoiceStatus::Issued)]
    #[case(InvoiceStatus::PartiallyPaid)]
    #[case(InvoiceStatus::Paid)]
    #[case(InvoiceStatus::PastDue)]
    #[case(InvoiceStatus::Void)]
    fn test_only_drafts_can_be_issued(#[case] status: InvoiceStatus) {
        assert_eq!(
            InvoiceService::issue(status, 1, 10_000, 14, number(), date(2026, 3, 1)),
            Err(InvoiceError::NotIssuable(status))
        );
    }

    #[test]
    fn test_empty_draft_cannot_be_issued() {
        assert_eq!(
            InvoiceService::issue(InvoiceStatus::Draft, 0, 10_000, 14, number(), date(2026, 3, 1)),
            Err(InvoiceError::NoLineItems)
        );
    }

    #[rstest]
    #[case(InvoiceStatus::Issued)]
    #[case(InvoiceStatus::PartiallyPaid)]
    #[case(InvoiceStatus::Paid)]
    #[case(InvoiceStatus::PastDue)]
    #[case(InvoiceStatus::Void)]
    fn test_non_draft_is_not_editable(#[case] status: InvoiceStatus) {
        assert_eq!(
            InvoiceService::ensure_editable(status),
            Err(InvoiceError::NotEditable(status))
        );
        assert_eq!(
            InvoiceService::ensure_deletable(status),
            Err(InvoiceError::NotDeletable(status))
        );
    }

    #[test]
    fn test_draft_is_editable_and_deletable() {
        assert!(InvoiceService::ensure_editable(InvoiceStatus::Draft).is_ok());
        assert!(InvoiceService::ensure_deletable(InvoiceStatus::Draft).is_ok());
    }

    #[rstest]
    #[case(InvoiceStatus::Draft, true)]
    #[case(InvoiceStatus::Issued, true)]
    #[case(InvoiceStatus::PartiallyPaid, true)]
    #[case(InvoiceStatus::PastDue, true)]
    #[case(InvoiceStatus::Paid, false)]
    #[case(InvoiceStatus::Void, false)]
    fn test_void_transitions(#[case] status: InvoiceStatus, #[case] allowed: bool) {
        let result = InvoiceService::void(status);
        if allowed {
            assert_eq!(result, Ok(InvoiceStatus::Void));
        } else {
            assert_eq!(result, Err(InvoiceError::NotVoidable(status)));
        }
    }

    #[test]
    fn test_status_follows_payments() {
        let due = Some(date(2026, 4, 1));
        let today = date(2026, 3, 10);
        // Nothing paid yet
        assert_eq!(
            InvoiceService::derive_status(InvoiceStatus::Issued, 10_000, 0, due, today),
            InvoiceStatus::Issued
        );
        // Partial payment
        assert_eq!(
            InvoiceService::derive_status(InvoiceStatus::Issued, 10_000, 4_000, due, today),
            InvoiceStatus::PartiallyPaid
        );
        // Fully paid
        assert_eq!(
            InvoiceService::derive_status(InvoiceStatus::PartiallyPaid, 10_000, 10_000, due, today),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn test_overdue_balance_is_past_due() {
        let due = Some(date(2026, 3, 1));
        let today = date(2026, 3, 2);
        assert_eq!(
            InvoiceService::derive_status(InvoiceStatus::Issued, 10_000, 0, due, today),
            InvoiceStatus::PastDue
        );
        assert_eq!(
            InvoiceService::derive_status(InvoiceStatus::PartiallyPaid, 10_000, 4_000, due, today),
            InvoiceStatus::PastDue
        );
        // Paying off an overdue invoice settles it
        assert_eq!(
            InvoiceService::derive_status(InvoiceStatus::PastDue, 10_000, 10_000, due, today),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn test_due_date_itself_is_not_overdue() {
        let due = Some(date(2026, 3, 1));
        assert_eq!(
            InvoiceService::derive_status(InvoiceStatus::Issued, 10_000, 0, due, date(2026, 3, 1)),
            InvoiceStatus::Issued
        );
    }

    #[rstest]
    #[case(InvoiceStatus::Draft)]
    #[case(InvoiceStatus::Void)]
    fn test_draft_and_void_are_sticky(#[case] status: InvoiceStatus) {
        assert_eq!(
            InvoiceService::derive_status(status, 10_000, 10_000, None, date(2026, 3, 1)),
            status
        );
    }

    #[test]
    fn test_negative_net_terms_rejected() {
        let input = NewInvoice {
            customer_id: faktura_shared::types::CustomerId::new(),
            currency: faktura_shared::types::money::Currency::Usd,
            tax_behavior: crate::pricing::TaxBehavior::Exclusive,
            net_terms_days: -1,
        };
        assert_eq!(
            InvoiceService::validate_new(&input),
            Err(InvoiceError::InvalidNetTerms(-1))
        );
    }

    #[test]
    fn test_blank_description_rejected() {
        let input = LineItemInput {
            description: "   ".to_string(),
            quantity: rust_decimal::Decimal::ONE,
            unit_amount: 100,
            tax_rate_id: None,
            discount_id: None,
        };
        assert_eq!(
            InvoiceService::validate_line_input(&input),
            Err(InvoiceError::EmptyDescription)
        );
    }
}
