//! Cashflow schema migration.
//!
//! Creates the fiscal, ledger and cash receipt tables the cashflow reports read.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: FISCAL PERIODS
        // ============================================================
        db.execute_unprepared(FISCAL_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS & LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_SQL).await?;

        // ============================================================
        // PART 3: PATIENT BILLING & CASH RECEIPTS
        // ============================================================
        db.execute_unprepared(BILLING_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const FISCAL_SQL: &str = r"
CREATE TABLE fiscal_year (
    id SERIAL PRIMARY KEY,
    label VARCHAR(100) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    CONSTRAINT chk_fiscal_year_dates CHECK (start_date < end_date)
);

-- Periods 1..12 are months; 0 and 13 are the opening/closing pseudo-periods
CREATE TABLE period (
    id INTEGER PRIMARY KEY,
    fiscal_year_id INTEGER NOT NULL REFERENCES fiscal_year(id) ON DELETE CASCADE,
    number SMALLINT NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    locked BOOLEAN NOT NULL DEFAULT FALSE,
    CONSTRAINT chk_period_number CHECK (number BETWEEN 0 AND 13),
    CONSTRAINT chk_period_dates CHECK (start_date <= end_date),
    CONSTRAINT uq_period_year_number UNIQUE (fiscal_year_id, number)
);

CREATE INDEX idx_period_dates ON period(start_date, end_date);
";

const LEDGER_SQL: &str = r"
CREATE TABLE account (
    id SERIAL PRIMARY KEY,
    number VARCHAR(20) NOT NULL UNIQUE,
    label VARCHAR(200) NOT NULL,
    locked BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE TABLE transaction_type (
    id SERIAL PRIMARY KEY,
    text VARCHAR(100) NOT NULL,
    category VARCHAR(20) NOT NULL DEFAULT 'other',
    CONSTRAINT chk_transaction_type_category CHECK (category IN ('income', 'expense', 'other'))
);

CREATE TABLE voucher (
    uuid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    reference VARCHAR(30) NOT NULL,
    date DATE NOT NULL,
    type_id INTEGER NOT NULL REFERENCES transaction_type(id),
    currency_id INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    description TEXT NOT NULL DEFAULT ''
);

CREATE INDEX idx_voucher_type ON voucher(type_id);

CREATE TABLE general_ledger (
    uuid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    record_uuid UUID NOT NULL,
    trans_id VARCHAR(30) NOT NULL,
    trans_date DATE NOT NULL,
    period_id INTEGER REFERENCES period(id),
    account_id INTEGER NOT NULL REFERENCES account(id),
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    debit_equiv NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit_equiv NUMERIC(19, 4) NOT NULL DEFAULT 0,
    currency_id INTEGER NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    transaction_type_id INTEGER REFERENCES transaction_type(id),
    CONSTRAINT chk_general_ledger_amounts CHECK (
        debit >= 0 AND credit >= 0 AND debit_equiv >= 0 AND credit_equiv >= 0
    )
);

-- Cashflow lookups are always by account and date
CREATE INDEX idx_general_ledger_account_date ON general_ledger(account_id, trans_date);
CREATE INDEX idx_general_ledger_record ON general_ledger(record_uuid);
CREATE INDEX idx_general_ledger_trans ON general_ledger(trans_id);
";

const BILLING_SQL: &str = r"
CREATE TABLE service (
    id SERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE
);

CREATE TABLE patient (
    uuid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    reference VARCHAR(30) NOT NULL UNIQUE,
    display_name VARCHAR(200) NOT NULL
);

CREATE TABLE invoice (
    uuid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    reference VARCHAR(30) NOT NULL UNIQUE,
    patient_uuid UUID NOT NULL REFERENCES patient(uuid),
    service_id INTEGER NOT NULL REFERENCES service(id),
    date DATE NOT NULL,
    cost NUMERIC(19, 4) NOT NULL,
    reversed BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE INDEX idx_invoice_date ON invoice(date) WHERE reversed = FALSE;

CREATE TABLE cash (
    uuid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    reference VARCHAR(30) NOT NULL UNIQUE,
    date DATE NOT NULL,
    patient_uuid UUID NOT NULL REFERENCES patient(uuid),
    currency_id INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    reversed BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE INDEX idx_cash_date ON cash(date) WHERE reversed = FALSE;

CREATE TABLE cash_item (
    uuid UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cash_uuid UUID NOT NULL REFERENCES cash(uuid) ON DELETE CASCADE,
    invoice_uuid UUID NOT NULL REFERENCES invoice(uuid),
    amount NUMERIC(19, 4) NOT NULL
);

CREATE INDEX idx_cash_item_cash ON cash_item(cash_uuid);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS cash_item CASCADE;
DROP TABLE IF EXISTS cash CASCADE;
DROP TABLE IF EXISTS invoice CASCADE;
DROP TABLE IF EXISTS patient CASCADE;
DROP TABLE IF EXISTS service CASCADE;
DROP TABLE IF EXISTS general_ledger CASCADE;
DROP TABLE IF EXISTS voucher CASCADE;
DROP TABLE IF EXISTS transaction_type CASCADE;
DROP TABLE IF EXISTS account CASCADE;
DROP TABLE IF EXISTS period CASCADE;
DROP TABLE IF EXISTS fiscal_year CASCADE;
";
