//! Payment ledger and credit note service.

use chrono::NaiveDate;

use super::error::{CreditNoteError, PaymentError};
use super::types::{
    ApplicationOutcome, CreditNote, CreditNoteStatus, NewCreditNote, NewPayment, PaymentMethod,
    PaymentTally,
};
use crate::invoice::InvoiceStatus;
use faktura_shared::types::money::Currency;

/// Stateless payment ledger logic.
///
/// The repository layer serializes concurrent mutations per invoice and per
/// credit note; this service assumes the figures it is handed are current.
pub struct PaymentService;

impl PaymentService {
    /// Validates a payment before it is appended to the ledger.
    ///
    /// # Errors
    ///
    /// Rejects non-positive amounts, unpayable invoice states, and amounts
    /// exceeding the outstanding balance.
    pub fn validate_payment(
        invoice_status: InvoiceStatus,
        amount_due: i64,
        amount: i64,
    ) -> Result<(), PaymentError> {
        if amount <= 0 {
            return Err(PaymentError::NonPositiveAmount(amount));
        }
        if !invoice_status.is_payable() {
            return Err(PaymentError::InvoiceNotPayable(invoice_status));
        }
        if amount > amount_due {
            return Err(PaymentError::ExceedsAmountDue { amount, amount_due });
        }
        Ok(())
    }

    /// Recomputes paid/due figures from the ledger.
    ///
    /// The ledger is the source of truth; the invoice's stored figures are
    /// always derived through this function, never adjusted in place.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::LedgerExceedsTotal` if the events sum past the
    /// invoice total, which can only happen if per-invoice serialization was
    /// violated.
    pub fn tally(total: i64, payment_amounts: &[i64]) -> Result<PaymentTally, PaymentError> {
        let mut amount_paid: i64 = 0;
        for &amount in payment_amounts {
            amount_paid = amount_paid
                .checked_add(amount)
                .ok_or(PaymentError::AmountOverflow)?;
        }
        if amount_paid > total {
            return Err(PaymentError::LedgerExceedsTotal {
                paid: amount_paid,
                total,
            });
        }
        Ok(PaymentTally {
            amount_paid,
            amount_due: total - amount_paid,
        })
    }

    /// Validates a credit note creation input.
    ///
    /// # Errors
    ///
    /// Rejects non-positive amounts and empty reasons.
    pub fn validate_new_credit_note(input: &NewCreditNote) -> Result<(), CreditNoteError> {
        if input.amount <= 0 {
            return Err(CreditNoteError::NonPositiveAmount(input.amount));
        }
        if input.reason.trim().is_empty() {
            return Err(CreditNoteError::EmptyReason);
        }
        Ok(())
    }

    /// Applies part of a credit note's value to an invoice.
    ///
    /// On success the note's remaining value drops by `amount`, the note
    /// flips to `Applied` once nothing remains, and an equivalent payment
    /// with method `credit_note` is produced for the target invoice's ledger
    /// so recalculation continues to read from a single trail.
    ///
    /// # Errors
    ///
    /// Rejects currency mismatches, amounts exceeding either the remaining
    /// value or the invoice's balance, and unpayable invoice states.
    pub fn apply_credit_note(
        note: &CreditNote,
        invoice_currency: Currency,
        invoice_status: InvoiceStatus,
        invoice_amount_due: i64,
        amount: i64,
        applied_on: NaiveDate,
    ) -> Result<ApplicationOutcome, CreditNoteError> {
        if amount <= 0 {
            return Err(CreditNoteError::NonPositiveAmount(amount));
        }
        if note.currency != invoice_currency {
            return Err(CreditNoteError::CurrencyMismatch {
                credit_note: note.currency,
                invoice: invoice_currency,
            });
        }
        if amount > note.remaining_amount {
            return Err(CreditNoteError::ExceedsRemaining {
                amount,
                remaining: note.remaining_amount,
            });
        }
        if !invoice_status.is_payable() {
            return Err(CreditNoteError::InvoiceNotPayable(invoice_status));
        }
        if amount > invoice_amount_due {
            return Err(CreditNoteError::ExceedsAmountDue {
                amount,
                amount_due: invoice_amount_due,
            });
        }

        let new_remaining = note.remaining_amount - amount;
        Ok(ApplicationOutcome {
            new_remaining,
            new_status: if new_remaining == 0 {
                CreditNoteStatus::Applied
            } else {
                CreditNoteStatus::Available
            },
            payment: NewPayment {
                amount,
                payment_date: applied_on,
                method: PaymentMethod::CreditNote,
                reference: Some(note.number.clone()),
                notes: None,
            },
        })
    }

    /// Rejects deletion of credit notes that are part of the audit trail.
    ///
    /// # Errors
    ///
    /// Returns `CreditNoteError::HasApplications` if any application exists.
    pub fn validate_credit_note_deletion(application_count: usize) -> Result<(), CreditNoteError> {
        if application_count > 0 {
            return Err(CreditNoteError::HasApplications(application_count));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use faktura_shared::types::{CreditNoteId, CustomerId, OwnerId};
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn credit_note(amount: i64, remaining: i64) -> CreditNote {
        CreditNote {
            id: CreditNoteId::new(),
            owner_id: OwnerId::new(),
            customer_id: CustomerId::new(),
            source_invoice_id: None,
            currency: Currency::Usd,
            amount,
            remaining_amount: remaining,
            status: if remaining == 0 {
                CreditNoteStatus::Applied
            } else {
                CreditNoteStatus::Available
            },
            reason: "Overcharge".to_string(),
            number: "CN-2026-0007".to_string(),
        }
    }

    #[test]
    fn test_partial_then_full_payment_settles_invoice() {
        // Invoice total 10000: pay 4000, then 6000, then nothing more fits.
        let total = 10_000;

        assert!(PaymentService::validate_payment(InvoiceStatus::Issued, total, 4_000).is_ok());
        let tally = PaymentService::tally(total, &[4_000]).unwrap();
        assert_eq!(tally.amount_paid, 4_000);
        assert_eq!(tally.amount_due, 6_000);

        assert!(
            PaymentService::validate_payment(InvoiceStatus::PartiallyPaid, 6_000, 6_000).is_ok()
        );
        let tally = PaymentService::tally(total, &[4_000, 6_000]).unwrap();
        assert_eq!(tally.amount_due, 0);

        assert_eq!(
            PaymentService::validate_payment(InvoiceStatus::Paid, 0, 1),
            Err(PaymentError::InvoiceNotPayable(InvoiceStatus::Paid))
        );
    }

    #[rstest]
    #[case(0)]
    #[case(-500)]
    fn test_non_positive_payment_rejected(#[case] amount: i64) {
        assert_eq!(
            PaymentService::validate_payment(InvoiceStatus::Issued, 10_000, amount),
            Err(PaymentError::NonPositiveAmount(amount))
        );
    }

    #[test]
    fn test_overpayment_rejected() {
        assert_eq!(
            PaymentService::validate_payment(InvoiceStatus::Issued, 1_000, 1_001),
            Err(PaymentError::ExceedsAmountDue {
                amount: 1_001,
                amount_due: 1_000
            })
        );
    }

    #[rstest]
    #[case(InvoiceStatus::Draft)]
    #[case(InvoiceStatus::Void)]
    fn test_unpayable_states_rejected(#[case] status: InvoiceStatus) {
        assert_eq!(
            PaymentService::validate_payment(status, 10_000, 100),
            Err(PaymentError::InvoiceNotPayable(status))
        );
    }

    #[test]
    fn test_deleting_a_payment_reopens_the_balance() {
        let total = 10_000;
        let tally = PaymentService::tally(total, &[4_000, 6_000]).unwrap();
        assert_eq!(tally.amount_due, 0);
        // Ledger after deleting the 6000 event
        let tally = PaymentService::tally(total, &[4_000]).unwrap();
        assert_eq!(tally.amount_due, 6_000);
    }

    #[test]
    fn test_oversummed_ledger_is_a_conflict() {
        assert_eq!(
            PaymentService::tally(1_000, &[800, 800]),
            Err(PaymentError::LedgerExceedsTotal {
                paid: 1_600,
                total: 1_000
            })
        );
    }

    #[test]
    fn test_credit_note_spreads_across_invoices() {
        // Note worth 5000: apply 2000 to invoice A, then 3000 to invoice B.
        let note = credit_note(5_000, 5_000);
        let first = PaymentService::apply_credit_note(
            &note,
            Currency::Usd,
            InvoiceStatus::Issued,
            3_000,
            2_000,
            date(2026, 3, 1),
        )
        .unwrap();
        assert_eq!(first.new_remaining, 3_000);
        assert_eq!(first.new_status, CreditNoteStatus::Available);
        assert_eq!(first.payment.method, PaymentMethod::CreditNote);
        assert_eq!(first.payment.amount, 2_000);
        assert_eq!(first.payment.reference.as_deref(), Some("CN-2026-0007"));

        let note = credit_note(5_000, first.new_remaining);
        let second = PaymentService::apply_credit_note(
            &note,
            Currency::Usd,
            InvoiceStatus::Issued,
            4_000,
            3_000,
            date(2026, 3, 2),
        )
        .unwrap();
        assert_eq!(second.new_remaining, 0);
        assert_eq!(second.new_status, CreditNoteStatus::Applied);
    }

    #[test]
    fn test_application_cannot_exceed_remaining() {
        let note = credit_note(5_000, 1_500);
        assert_eq!(
            PaymentService::apply_credit_note(
                &note,
                Currency::Usd,
                InvoiceStatus::Issued,
                10_000,
                2_000,
                date(2026, 3, 1),
            ),
            Err(CreditNoteError::ExceedsRemaining {
                amount: 2_000,
                remaining: 1_500
            })
        );
    }

    #[test]
    fn test_application_cannot_exceed_amount_due() {
        let note = credit_note(5_000, 5_000);
        assert_eq!(
            PaymentService::apply_credit_note(
                &note,
                Currency::Usd,
                InvoiceStatus::Issued,
                1_000,
                2_000,
                date(2026, 3, 1),
            ),
            Err(CreditNoteError::ExceedsAmountDue {
                amount: 2_000,
                amount_due: 1_000
            })
        );
    }

    #[test]
    fn test_application_requires_matching_currency() {
        let note = credit_note(5_000, 5_000);
        assert_eq!(
            PaymentService::apply_credit_note(
                &note,
                Currency::Eur,
                InvoiceStatus::Issued,
                10_000,
                2_000,
                date(2026, 3, 1),
            ),
            Err(CreditNoteError::CurrencyMismatch {
                credit_note: Currency::Usd,
                invoice: Currency::Eur
            })
        );
    }

    #[test]
    fn test_applied_notes_are_audit_locked() {
        assert_eq!(
            PaymentService::validate_credit_note_deletion(2),
            Err(CreditNoteError::HasApplications(2))
        );
        assert!(PaymentService::validate_credit_note_deletion(0).is_ok());
    }

    #[test]
    fn test_new_credit_note_validation() {
        let mut input = NewCreditNote {
            customer_id: CustomerId::new(),
            source_invoice_id: None,
            currency: Currency::Usd,
            amount: 5_000,
            reason: "Overcharge".to_string(),
        };
        assert!(PaymentService::validate_new_credit_note(&input).is_ok());

        input.amount = 0;
        assert_eq!(
            PaymentService::validate_new_credit_note(&input),
            Err(CreditNoteError::NonPositiveAmount(0))
        );

        input.amount = 5_000;
        input.reason = "  ".to_string();
        assert_eq!(
            PaymentService::validate_new_credit_note(&input),
            Err(CreditNoteError::EmptyReason)
        );
    }
}
