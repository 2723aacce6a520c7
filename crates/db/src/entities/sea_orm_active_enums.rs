//! Postgres enum mappings and conversions to the domain enums.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use faktura_core::catalog;
use faktura_core::invoice;
use faktura_core::payment;
use faktura_core::pricing;
use faktura_core::recurring;

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Mutable working copy.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Issued and awaiting payment.
    #[sea_orm(string_value = "issued")]
    Issued,
    /// Partially paid.
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    /// Fully paid.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Overdue with a balance.
    #[sea_orm(string_value = "past_due")]
    PastDue,
    /// Cancelled before full payment.
    #[sea_orm(string_value = "void")]
    Void,
}

impl From<invoice::InvoiceStatus> for InvoiceStatus {
    fn from(value: invoice::InvoiceStatus) -> Self {
        match value {
            invoice::InvoiceStatus::Draft => Self::Draft,
            invoice::InvoiceStatus::Issued => Self::Issued,
            invoice::InvoiceStatus::PartiallyPaid => Self::PartiallyPaid,
            invoice::InvoiceStatus::Paid => Self::Paid,
            invoice::InvoiceStatus::PastDue => Self::PastDue,
            invoice::InvoiceStatus::Void => Self::Void,
        }
    }
}

impl From<InvoiceStatus> for invoice::InvoiceStatus {
    fn from(value: InvoiceStatus) -> Self {
        match value {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Issued => Self::Issued,
            InvoiceStatus::PartiallyPaid => Self::PartiallyPaid,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::PastDue => Self::PastDue,
            InvoiceStatus::Void => Self::Void,
        }
    }
}

/// Whether unit prices contain tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tax_behavior")]
#[serde(rename_all = "snake_case")]
pub enum TaxBehavior {
    /// Prices contain tax.
    #[sea_orm(string_value = "inclusive")]
    Inclusive,
    /// Tax is added on top.
    #[sea_orm(string_value = "exclusive")]
    Exclusive,
}

impl From<pricing::TaxBehavior> for TaxBehavior {
    fn from(value: pricing::TaxBehavior) -> Self {
        match value {
            pricing::TaxBehavior::Inclusive => Self::Inclusive,
            pricing::TaxBehavior::Exclusive => Self::Exclusive,
        }
    }
}

impl From<TaxBehavior> for pricing::TaxBehavior {
    fn from(value: TaxBehavior) -> Self {
        match value {
            TaxBehavior::Inclusive => Self::Inclusive,
            TaxBehavior::Exclusive => Self::Exclusive,
        }
    }
}

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer.
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Cash.
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Check.
    #[sea_orm(string_value = "check")]
    Check,
    /// Credit card.
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    /// Debit card.
    #[sea_orm(string_value = "debit_card")]
    DebitCard,
    /// Credit note offset.
    #[sea_orm(string_value = "credit_note")]
    CreditNote,
    /// Anything else.
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<payment::PaymentMethod> for PaymentMethod {
    fn from(value: payment::PaymentMethod) -> Self {
        match value {
            payment::PaymentMethod::BankTransfer => Self::BankTransfer,
            payment::PaymentMethod::Cash => Self::Cash,
            payment::PaymentMethod::Check => Self::Check,
            payment::PaymentMethod::CreditCard => Self::CreditCard,
            payment::PaymentMethod::DebitCard => Self::DebitCard,
            payment::PaymentMethod::CreditNote => Self::CreditNote,
            payment::PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<PaymentMethod> for payment::PaymentMethod {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::BankTransfer => Self::BankTransfer,
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::Check => Self::Check,
            PaymentMethod::CreditCard => Self::CreditCard,
            PaymentMethod::DebitCard => Self::DebitCard,
            PaymentMethod::CreditNote => Self::CreditNote,
            PaymentMethod::Other => Self::Other,
        }
    }
}

/// Credit note lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "credit_note_status")]
#[serde(rename_all = "snake_case")]
pub enum CreditNoteStatus {
    /// Value remains.
    #[sea_orm(string_value = "available")]
    Available,
    /// Fully consumed.
    #[sea_orm(string_value = "applied")]
    Applied,
}

impl From<payment::CreditNoteStatus> for CreditNoteStatus {
    fn from(value: payment::CreditNoteStatus) -> Self {
        match value {
            payment::CreditNoteStatus::Available => Self::Available,
            payment::CreditNoteStatus::Applied => Self::Applied,
        }
    }
}

impl From<CreditNoteStatus> for payment::CreditNoteStatus {
    fn from(value: CreditNoteStatus) -> Self {
        match value {
            CreditNoteStatus::Available => Self::Available,
            CreditNoteStatus::Applied => Self::Applied,
        }
    }
}

/// Recurring invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "recurring_status")]
#[serde(rename_all = "snake_case")]
pub enum RecurringStatus {
    /// Eligible for generation.
    #[sea_orm(string_value = "active")]
    Active,
    /// Suspended.
    #[sea_orm(string_value = "paused")]
    Paused,
    /// Stopped by an operator.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Ran out of schedule.
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl From<recurring::RecurringStatus> for RecurringStatus {
    fn from(value: recurring::RecurringStatus) -> Self {
        match value {
            recurring::RecurringStatus::Active => Self::Active,
            recurring::RecurringStatus::Paused => Self::Paused,
            recurring::RecurringStatus::Cancelled => Self::Cancelled,
            recurring::RecurringStatus::Completed => Self::Completed,
        }
    }
}

impl From<RecurringStatus> for recurring::RecurringStatus {
    fn from(value: RecurringStatus) -> Self {
        match value {
            RecurringStatus::Active => Self::Active,
            RecurringStatus::Paused => Self::Paused,
            RecurringStatus::Cancelled => Self::Cancelled,
            RecurringStatus::Completed => Self::Completed,
        }
    }
}

/// Billing cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "billing_interval")]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    /// Every day.
    #[sea_orm(string_value = "daily")]
    Daily,
    /// Every week.
    #[sea_orm(string_value = "weekly")]
    Weekly,
    /// Every month.
    #[sea_orm(string_value = "monthly")]
    Monthly,
    /// Every quarter.
    #[sea_orm(string_value = "quarterly")]
    Quarterly,
    /// Every year.
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

impl From<recurring::BillingInterval> for BillingInterval {
    fn from(value: recurring::BillingInterval) -> Self {
        match value {
            recurring::BillingInterval::Daily => Self::Daily,
            recurring::BillingInterval::Weekly => Self::Weekly,
            recurring::BillingInterval::Monthly => Self::Monthly,
            recurring::BillingInterval::Quarterly => Self::Quarterly,
            recurring::BillingInterval::Yearly => Self::Yearly,
        }
    }
}

impl From<BillingInterval> for recurring::BillingInterval {
    fn from(value: BillingInterval) -> Self {
        match value {
            BillingInterval::Daily => Self::Daily,
            BillingInterval::Weekly => Self::Weekly,
            BillingInterval::Monthly => Self::Monthly,
            BillingInterval::Quarterly => Self::Quarterly,
            BillingInterval::Yearly => Self::Yearly,
        }
    }
}

/// Discount kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "discount_kind")]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Basis points of the subtotal.
    #[sea_orm(string_value = "percent")]
    Percent,
    /// Fixed minor units.
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

impl From<catalog::DiscountKind> for DiscountKind {
    fn from(value: catalog::DiscountKind) -> Self {
        match value {
            catalog::DiscountKind::Percent => Self::Percent,
            catalog::DiscountKind::Fixed => Self::Fixed,
        }
    }
}

impl From<DiscountKind> for catalog::DiscountKind {
    fn from(value: DiscountKind) -> Self {
        match value {
            DiscountKind::Percent => Self::Percent,
            DiscountKind::Fixed => Self::Fixed,
        }
    }
}
