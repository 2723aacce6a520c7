//! Invoice event history.
//!
//! Every state-affecting operation appends a typed event to the invoice's
//! history, giving each document an auditable trail from draft to settlement.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use faktura_shared::types::{CreditNoteId, LineItemId, PaymentId};

use super::types::InvoiceStatus;

/// A single entry in an invoice's event history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvoiceEvent {
    /// Draft created.
    Created,
    /// A line item was added while in draft.
    ItemAdded {
        /// The added line.
        line_item_id: LineItemId,
    },
    /// A line item was edited while in draft.
    ItemUpdated {
        /// The edited line.
        line_item_id: LineItemId,
    },
    /// A line item was removed while in draft.
    ItemRemoved {
        /// The removed line.
        line_item_id: LineItemId,
    },
    /// The draft was issued and numbered.
    Issued {
        /// Assigned document number, e.g. "INV-2026-0042".
        number: String,
        /// Due date set at issuance.
        due_at: NaiveDate,
    },
    /// A payment was recorded.
    PaymentRecorded {
        /// The payment row.
        payment_id: PaymentId,
        /// Amount in minor units.
        amount: i64,
    },
    /// A payment was deleted and the document recalculated.
    PaymentDeleted {
        /// The removed payment row.
        payment_id: PaymentId,
        /// Amount in minor units.
        amount: i64,
    },
    /// Value from a credit note was applied.
    CreditNoteApplied {
        /// The consumed credit note.
        credit_note_id: CreditNoteId,
        /// Amount in minor units.
        amount: i64,
    },
    /// Derived status changed.
    StatusChanged {
        /// Previous status.
        from: InvoiceStatus,
        /// New status.
        to: InvoiceStatus,
    },
    /// The document was voided.
    Voided,
}

impl InvoiceEvent {
    /// Stable kind tag used for storage and filtering.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ItemAdded { .. } => "item_added",
            Self::ItemUpdated { .. } => "item_updated",
            Self::ItemRemoved { .. } => "item_removed",
            Self::Issued { .. } => "issued",
            Self::PaymentRecorded { .. } => "payment_recorded",
            Self::PaymentDeleted { .. } => "payment_deleted",
            Self::CreditNoteApplied { .. } => "credit_note_applied",
            Self::StatusChanged { .. } => "status_changed",
            Self::Voided => "voided",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_roundtrip_through_json() {
        let event = InvoiceEvent::PaymentRecorded {
            payment_id: PaymentId::new(),
            amount: 4000,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: InvoiceEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_kind_matches_serde_tag() {
        let event = InvoiceEvent::Voided;
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
    }
}
