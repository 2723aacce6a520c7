//! Initial database migration.
//!
//! Creates all enums, tables, and indexes for the invoicing engine.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        db.execute_unprepared(TAX_RATES_SQL).await?;
        db.execute_unprepared(DISCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: INVOICES
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_LINE_ITEMS_SQL).await?;
        db.execute_unprepared(INVOICE_EVENTS_SQL).await?;
        db.execute_unprepared(INVOICE_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 4: PAYMENTS & CREDIT NOTES
        // ============================================================
        db.execute_unprepared(CREDIT_NOTES_SQL).await?;
        db.execute_unprepared(CREDIT_NOTE_APPLICATIONS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 5: RECURRING INVOICES
        // ============================================================
        db.execute_unprepared(RECURRING_INVOICES_SQL).await?;
        db.execute_unprepared(RECURRING_LINE_ITEMS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Invoice lifecycle
CREATE TYPE invoice_status AS ENUM (
    'draft',
    'issued',
    'partially_paid',
    'paid',
    'past_due',
    'void'
);

-- Whether unit prices contain tax
CREATE TYPE tax_behavior AS ENUM ('inclusive', 'exclusive');

-- Payment methods
CREATE TYPE payment_method AS ENUM (
    'bank_transfer',
    'cash',
    'check',
    'credit_card',
    'debit_card',
    'credit_note',
    'other'
);

-- Credit note lifecycle
CREATE TYPE credit_note_status AS ENUM ('available', 'applied');

-- Recurring invoice lifecycle
CREATE TYPE recurring_status AS ENUM ('active', 'paused', 'cancelled', 'completed');

-- Billing cadence
CREATE TYPE billing_interval AS ENUM ('daily', 'weekly', 'monthly', 'quarterly', 'yearly');

-- Discount kinds
CREATE TYPE discount_kind AS ENUM ('percent', 'fixed');
";

const TAX_RATES_SQL: &str = r"
CREATE TABLE tax_rates (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    rate_basis_points BIGINT NOT NULL CHECK (rate_basis_points BETWEEN 0 AND 10000),
    country_code CHAR(2) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    valid_from DATE,
    valid_until DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (valid_until IS NULL OR valid_from IS NULL OR valid_until > valid_from)
);

CREATE INDEX idx_tax_rates_owner ON tax_rates(owner_id);
";

const DISCOUNTS_SQL: &str = r"
CREATE TABLE discounts (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    code VARCHAR(64) NOT NULL,
    kind discount_kind NOT NULL,
    value BIGINT NOT NULL CHECK (value > 0),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    valid_from DATE,
    valid_until DATE,
    redemption_limit BIGINT CHECK (redemption_limit IS NULL OR redemption_limit > 0),
    redemption_count BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (valid_until IS NULL OR valid_from IS NULL OR valid_until > valid_from),
    UNIQUE (owner_id, code)
);

CREATE INDEX idx_discounts_owner ON discounts(owner_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    customer_id UUID NOT NULL,
    currency CHAR(3) NOT NULL,
    tax_behavior tax_behavior NOT NULL,
    net_terms_days INTEGER NOT NULL CHECK (net_terms_days >= 0),
    status invoice_status NOT NULL DEFAULT 'draft',
    number VARCHAR(32),
    sequence_year INTEGER,
    sequence_number BIGINT,
    subtotal BIGINT NOT NULL DEFAULT 0,
    tax_total BIGINT NOT NULL DEFAULT 0,
    total BIGINT NOT NULL DEFAULT 0,
    amount_paid BIGINT NOT NULL DEFAULT 0 CHECK (amount_paid >= 0),
    amount_due BIGINT NOT NULL DEFAULT 0 CHECK (amount_due >= 0),
    issued_at DATE,
    due_at DATE,
    version BIGINT NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (amount_due = total - amount_paid),
    UNIQUE (owner_id, sequence_year, sequence_number)
);

CREATE INDEX idx_invoices_owner ON invoices(owner_id);
CREATE INDEX idx_invoices_owner_status ON invoices(owner_id, status);
CREATE INDEX idx_invoices_customer ON invoices(customer_id);
CREATE INDEX idx_invoices_due_at ON invoices(due_at) WHERE status IN ('issued', 'partially_paid');
";

const INVOICE_LINE_ITEMS_SQL: &str = r"
CREATE TABLE invoice_line_items (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    description VARCHAR(512) NOT NULL,
    quantity NUMERIC(12,3) NOT NULL CHECK (quantity >= 0.001),
    unit_amount BIGINT NOT NULL CHECK (unit_amount >= 0),
    tax_rate_id UUID REFERENCES tax_rates(id),
    discount_id UUID REFERENCES discounts(id),
    tax_rate_basis_points BIGINT,
    subtotal BIGINT NOT NULL,
    discount_amount BIGINT NOT NULL,
    tax_amount BIGINT NOT NULL,
    total BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoice_line_items_invoice ON invoice_line_items(invoice_id);
";

const INVOICE_EVENTS_SQL: &str = r"
CREATE TABLE invoice_events (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    kind VARCHAR(64) NOT NULL,
    payload JSONB NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoice_events_invoice ON invoice_events(invoice_id, occurred_at);
";

const INVOICE_SEQUENCES_SQL: &str = r"
CREATE TABLE invoice_sequences (
    owner_id UUID NOT NULL,
    scope VARCHAR(16) NOT NULL,
    year INTEGER NOT NULL,
    last_number BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (owner_id, scope, year)
);
";

const CREDIT_NOTES_SQL: &str = r"
CREATE TABLE credit_notes (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    customer_id UUID NOT NULL,
    source_invoice_id UUID REFERENCES invoices(id),
    currency CHAR(3) NOT NULL,
    amount BIGINT NOT NULL CHECK (amount > 0),
    remaining_amount BIGINT NOT NULL CHECK (remaining_amount >= 0 AND remaining_amount <= amount),
    status credit_note_status NOT NULL DEFAULT 'available',
    reason VARCHAR(512) NOT NULL,
    number VARCHAR(32) NOT NULL,
    version BIGINT NOT NULL DEFAULT 1,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (owner_id, number)
);

CREATE INDEX idx_credit_notes_owner ON credit_notes(owner_id);
CREATE INDEX idx_credit_notes_customer ON credit_notes(customer_id);
";

const CREDIT_NOTE_APPLICATIONS_SQL: &str = r"
CREATE TABLE credit_note_applications (
    id UUID PRIMARY KEY,
    credit_note_id UUID NOT NULL REFERENCES credit_notes(id),
    invoice_id UUID NOT NULL REFERENCES invoices(id),
    amount BIGINT NOT NULL CHECK (amount > 0),
    applied_on DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_cn_applications_note ON credit_note_applications(credit_note_id);
CREATE INDEX idx_cn_applications_invoice ON credit_note_applications(invoice_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    amount BIGINT NOT NULL CHECK (amount > 0),
    payment_date DATE NOT NULL,
    method payment_method NOT NULL,
    credit_note_application_id UUID REFERENCES credit_note_applications(id),
    reference VARCHAR(255),
    notes VARCHAR(1024),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payments_invoice ON payments(invoice_id);
";

const RECURRING_INVOICES_SQL: &str = r"
CREATE TABLE recurring_invoices (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    customer_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    currency CHAR(3) NOT NULL,
    tax_behavior tax_behavior NOT NULL,
    net_terms_days INTEGER NOT NULL CHECK (net_terms_days >= 0),
    billing_interval billing_interval NOT NULL,
    interval_count INTEGER NOT NULL CHECK (interval_count >= 1),
    billing_day_of_month INTEGER CHECK (billing_day_of_month BETWEEN 1 AND 31),
    start_date DATE NOT NULL,
    end_date DATE,
    occurrences_limit INTEGER CHECK (occurrences_limit IS NULL OR occurrences_limit >= 1),
    occurrences_count INTEGER NOT NULL DEFAULT 0,
    next_billing_date DATE NOT NULL,
    status recurring_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (end_date IS NULL OR end_date > start_date)
);

CREATE INDEX idx_recurring_owner ON recurring_invoices(owner_id);
CREATE INDEX idx_recurring_due ON recurring_invoices(next_billing_date) WHERE status = 'active';
";

const RECURRING_LINE_ITEMS_SQL: &str = r"
CREATE TABLE recurring_line_items (
    id UUID PRIMARY KEY,
    recurring_invoice_id UUID NOT NULL REFERENCES recurring_invoices(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    description VARCHAR(512) NOT NULL,
    quantity NUMERIC(12,3) NOT NULL CHECK (quantity >= 0.001),
    unit_amount BIGINT NOT NULL CHECK (unit_amount >= 0),
    tax_rate_id UUID REFERENCES tax_rates(id),
    discount_id UUID REFERENCES discounts(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_recurring_line_items_parent ON recurring_line_items(recurring_invoice_id);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS recurring_line_items;
DROP TABLE IF EXISTS recurring_invoices;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS credit_note_applications;
DROP TABLE IF EXISTS credit_notes;
DROP TABLE IF EXISTS invoice_sequences;
DROP TABLE IF EXISTS invoice_events;
DROP TABLE IF EXISTS invoice_line_items;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS discounts;
DROP TABLE IF EXISTS tax_rates;

DROP TYPE IF EXISTS discount_kind;
DROP TYPE IF EXISTS billing_interval;
DROP TYPE IF EXISTS recurring_status;
DROP TYPE IF EXISTS credit_note_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS tax_behavior;
DROP TYPE IF EXISTS invoice_status;
";
