//! Cashflow repository: every query behind the cashflow reports.
//!
//! Periods come through the entity query builder; postings, balances and
//! cash receipts are aggregations and go through raw statements.

use bhima_core::cashflow::{Period, Posting, ServiceInvoiced, ServicePayment};
use bhima_shared::AppError;
use bhima_shared::config::CashflowConfig;
use bhima_shared::types::{AccountId, CurrencyId, DateRange, PeriodId, TransactionTypeId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Statement,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::period;

/// Label given to postings without a transaction type.
pub const UNCLASSIFIED_LABEL: &str = "UNCLASSIFIED";

/// First and last period numbers of a fiscal year; 0 and 13 are the
/// opening and closing pseudo-periods.
const FIRST_MONTH: i16 = 1;
const LAST_MONTH: i16 = 12;

/// Error types for cashflow queries.
#[derive(Debug, thiserror::Error)]
pub enum CashflowQueryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CashflowQueryError> for AppError {
    fn from(err: CashflowQueryError) -> Self {
        match err {
            CashflowQueryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

const POSTINGS_SQL: &str = r"
SELECT
    gl.trans_id,
    gl.record_uuid,
    gl.trans_date,
    gl.period_id,
    a.number AS account_number,
    SUM(gl.debit_equiv) AS debit_equiv,
    SUM(gl.credit_equiv) AS credit_equiv,
    gl.currency_id,
    MIN(gl.description) AS description,
    gl.transaction_type_id,
    COALESCE(tt.text, $6) AS transaction_type
FROM general_ledger gl
JOIN account a ON a.id = gl.account_id
LEFT JOIN transaction_type tt ON tt.id = gl.transaction_type_id
WHERE gl.account_id = $1
  AND gl.trans_date BETWEEN $2 AND $3
  AND gl.transaction_type_id IS DISTINCT FROM $4
  AND gl.record_uuid NOT IN (SELECT v.uuid FROM voucher v WHERE v.type_id = $5)
GROUP BY
    gl.trans_id, gl.record_uuid, gl.trans_date, gl.period_id, a.number,
    gl.currency_id, gl.transaction_type_id, tt.text
ORDER BY gl.trans_date, gl.trans_id
";

const OPENING_BALANCE_SQL: &str = r"
SELECT COALESCE(SUM(gl.debit_equiv - gl.credit_equiv), 0) AS balance
FROM general_ledger gl
WHERE gl.account_id = $1 AND gl.trans_date < $2
";

const SERVICE_PAYMENTS_SQL: &str = r"
SELECT c.reference, c.date, p.display_name AS patient, s.name AS service, ci.amount
FROM cash c
JOIN cash_item ci ON ci.cash_uuid = c.uuid
JOIN invoice i ON i.uuid = ci.invoice_uuid
JOIN service s ON s.id = i.service_id
JOIN patient p ON p.uuid = c.patient_uuid
WHERE c.reversed = FALSE
  AND c.date BETWEEN $1 AND $2
ORDER BY c.date, c.reference
";

const INVOICED_BY_SERVICE_SQL: &str = r"
SELECT s.name AS service, SUM(i.cost) AS amount
FROM invoice i
JOIN service s ON s.id = i.service_id
WHERE i.reversed = FALSE
  AND i.date BETWEEN $1 AND $2
GROUP BY s.name
ORDER BY s.name
";

/// A posting row as returned by the database.
#[derive(Debug, Clone, FromQueryResult)]
pub struct PostingRow {
    /// Ledger transaction identifier.
    pub trans_id: String,
    /// Source document.
    pub record_uuid: Uuid,
    /// Transaction date.
    pub trans_date: NaiveDate,
    /// Fiscal period, if posted in one.
    pub period_id: Option<i32>,
    /// Account number.
    pub account_number: String,
    /// Summed debits.
    pub debit_equiv: Decimal,
    /// Summed credits.
    pub credit_equiv: Decimal,
    /// Currency id.
    pub currency_id: i32,
    /// First description of the transaction.
    pub description: Option<String>,
    /// Transaction type id.
    pub transaction_type_id: Option<i32>,
    /// Transaction type label.
    pub transaction_type: String,
}

impl From<PostingRow> for Posting {
    fn from(row: PostingRow) -> Self {
        Self {
            transaction_id: row.trans_id,
            record_uuid: row.record_uuid,
            date: row.trans_date,
            period_id: row.period_id.map(PeriodId::new),
            account_number: row.account_number,
            debit_equiv: row.debit_equiv,
            credit_equiv: row.credit_equiv,
            currency_id: CurrencyId::new(row.currency_id),
            description: row.description.unwrap_or_default(),
            origin_id: row.transaction_type_id.map(TransactionTypeId::new),
            transaction_type: row.transaction_type,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct BalanceRow {
    balance: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct PaymentRow {
    reference: String,
    date: NaiveDate,
    patient: String,
    service: String,
    amount: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct InvoicedRow {
    service: String,
    amount: Decimal,
}

/// Converts a fiscal period row to a reporting period.
#[must_use]
pub fn period_from_model(model: period::Model) -> Period {
    Period {
        id: model.id,
        start_date: model.start_date,
        end_date: model.end_date,
    }
}

/// Cashflow repository for ledger and cash receipt queries.
#[derive(Debug, Clone)]
pub struct CashflowRepository {
    db: DatabaseConnection,
    config: CashflowConfig,
}

impl CashflowRepository {
    /// Creates a new cashflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: CashflowConfig) -> Self {
        Self { db, config }
    }

    /// Fiscal periods (months only) overlapping the range, by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_periods(&self, range: DateRange) -> Result<Vec<Period>, CashflowQueryError> {
        let periods = period::Entity::find()
            .filter(period::Column::StartDate.lte(range.end()))
            .filter(period::Column::EndDate.gte(range.start()))
            .filter(period::Column::Number.between(FIRST_MONTH, LAST_MONTH))
            .order_by_asc(period::Column::StartDate)
            .all(&self.db)
            .await?;

        debug!(range = %range, count = periods.len(), "Fetched fiscal periods");

        Ok(periods.into_iter().map(period_from_model).collect())
    }

    /// Balance of the account over every posting dated before `before`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn opening_balance(
        &self,
        account_id: AccountId,
        before: NaiveDate,
    ) -> Result<Decimal, CashflowQueryError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            OPENING_BALANCE_SQL,
            [account_id.into_inner().into(), before.into()],
        );

        let balance = BalanceRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .map_or(Decimal::ZERO, |row| row.balance);

        debug!(%account_id, %before, %balance, "Fetched opening balance");

        Ok(balance)
    }

    /// Postings of the account within the range, one per ledger transaction.
    ///
    /// Internal transfers are left out: postings of the configured transfer
    /// transaction type and postings recorded by transfer vouchers.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_postings(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<Posting>, CashflowQueryError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            POSTINGS_SQL,
            [
                account_id.into_inner().into(),
                range.start().into(),
                range.end().into(),
                self.config.transfer_origin_id.into(),
                self.config.transfer_voucher_type_id.into(),
                UNCLASSIFIED_LABEL.into(),
            ],
        );

        let rows = PostingRow::find_by_statement(stmt).all(&self.db).await?;

        debug!(%account_id, range = %range, count = rows.len(), "Fetched postings");

        Ok(rows.into_iter().map(Posting::from).collect())
    }

    /// Cash payment items within the range, by date then reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_service_payments(
        &self,
        range: DateRange,
    ) -> Result<Vec<ServicePayment>, CashflowQueryError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SERVICE_PAYMENTS_SQL,
            [range.start().into(), range.end().into()],
        );

        let rows = PaymentRow::find_by_statement(stmt).all(&self.db).await?;

        debug!(range = %range, count = rows.len(), "Fetched cash payments");

        Ok(rows
            .into_iter()
            .map(|row| ServicePayment {
                reference: row.reference,
                date: row.date,
                patient: row.patient,
                service: row.service,
                amount: row.amount,
            })
            .collect())
    }

    /// Amount invoiced per service within the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_invoiced_by_service(
        &self,
        range: DateRange,
    ) -> Result<Vec<ServiceInvoiced>, CashflowQueryError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            INVOICED_BY_SERVICE_SQL,
            [range.start().into(), range.end().into()],
        );

        let rows = InvoicedRow::find_by_statement(stmt).all(&self.db).await?;

        debug!(range = %range, count = rows.len(), "Fetched invoiced totals");

        Ok(rows
            .into_iter()
            .map(|row| ServiceInvoiced {
                service: row.service,
                amount: row.amount,
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "cashflow_tests.rs"]
mod tests;
