//! Property-based tests for the payment ledger and credit notes.

use chrono::NaiveDate;
use proptest::prelude::*;

use faktura_shared::types::money::Currency;
use faktura_shared::types::{CreditNoteId, CustomerId, OwnerId};

use super::service::PaymentService;
use super::types::{CreditNote, CreditNoteStatus};
use crate::invoice::InvoiceStatus;

/// A randomized ledger action.
#[derive(Debug, Clone, Copy)]
enum LedgerAction {
    Record(i64),
    DeleteNewest,
}

fn action_strategy() -> impl Strategy<Value = LedgerAction> {
    prop_oneof![
        3 => (1i64..50_000).prop_map(LedgerAction::Record),
        1 => Just(LedgerAction::DeleteNewest),
    ]
}

fn make_note(amount: i64, remaining: i64) -> CreditNote {
    CreditNote {
        id: CreditNoteId::new(),
        owner_id: OwnerId::new(),
        customer_id: CustomerId::new(),
        source_invoice_id: None,
        currency: Currency::Usd,
        amount,
        remaining_amount: remaining,
        status: CreditNoteStatus::Available,
        reason: "Prop".to_string(),
        number: "CN-PROP".to_string(),
    }
}

fn prop_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No sequence of record/delete actions ever leaves the ledger outside
    /// `0 <= amount_paid <= total`. Rejected actions leave it untouched.
    #[test]
    fn prop_ledger_never_goes_negative_or_over(
        total in 1i64..100_000,
        actions in prop::collection::vec(action_strategy(), 1..30),
    ) {
        let mut ledger: Vec<i64> = Vec::new();

        for action in actions {
            match action {
                LedgerAction::Record(amount) => {
                    let tally = PaymentService::tally(total, &ledger).unwrap();
                    let status = if tally.amount_paid == 0 {
                        InvoiceStatus::Issued
                    } else if tally.amount_due > 0 {
                        InvoiceStatus::PartiallyPaid
                    } else {
                        InvoiceStatus::Paid
                    };
                    if PaymentService::validate_payment(status, tally.amount_due, amount).is_ok() {
                        ledger.push(amount);
                    }
                }
                LedgerAction::DeleteNewest => {
                    ledger.pop();
                }
            }

            let tally = PaymentService::tally(total, &ledger).unwrap();
            prop_assert!(tally.amount_paid >= 0);
            prop_assert!(tally.amount_paid <= total);
            prop_assert_eq!(tally.amount_due, total - tally.amount_paid);
        }
    }

    /// Credit note value is conserved: after any sequence of applications,
    /// `amount == remaining + sum(applications)`, and remaining never goes
    /// below zero.
    #[test]
    fn prop_credit_note_value_is_conserved(
        amount in 1i64..100_000,
        requests in prop::collection::vec(1i64..40_000, 1..20),
    ) {
        let mut remaining = amount;
        let mut applied: Vec<i64> = Vec::new();

        for request in requests {
            let note = make_note(amount, remaining);
            match PaymentService::apply_credit_note(
                &note,
                Currency::Usd,
                InvoiceStatus::Issued,
                i64::MAX / 2, // invoice balance never the binding constraint here
                request,
                prop_date(),
            ) {
                Ok(outcome) => {
                    prop_assert_eq!(outcome.new_remaining, remaining - request);
                    remaining = outcome.new_remaining;
                    applied.push(request);
                    if remaining == 0 {
                        prop_assert_eq!(outcome.new_status, CreditNoteStatus::Applied);
                    }
                }
                Err(_) => {
                    // A rejected application changes nothing.
                    prop_assert!(request > remaining);
                }
            }

            prop_assert!(remaining >= 0);
            let consumed: i64 = applied.iter().sum();
            prop_assert_eq!(amount, remaining + consumed);
        }
    }

    /// The payment produced by an application always mirrors the applied
    /// amount, so the invoice-side ledger and the note-side bookkeeping
    /// cannot drift apart.
    #[test]
    fn prop_application_payment_mirrors_amount(
        remaining in 1i64..100_000,
        request in 1i64..100_000,
        amount_due in 1i64..100_000,
    ) {
        let note = make_note(remaining, remaining);
        if let Ok(outcome) = PaymentService::apply_credit_note(
            &note,
            Currency::Usd,
            InvoiceStatus::Issued,
            amount_due,
            request,
            prop_date(),
        ) {
            prop_assert_eq!(outcome.payment.amount, request);
            prop_assert_eq!(note.remaining_amount - outcome.new_remaining, request);
        }
    }
}
