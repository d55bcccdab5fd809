//! Cashflow data types.

use bhima_shared::types::{AccountId, CurrencyId, DateRange, PeriodId, TransactionTypeId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::CashflowError;

/// How the requested range is split into periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMode {
    /// Fiscal periods from the period table.
    Calendar,
    /// Generated Monday-to-Sunday weeks.
    Weekly,
}

impl PeriodMode {
    /// Weekly when the request flag is set, calendar otherwise.
    #[must_use]
    pub const fn from_weekly_flag(weekly: bool) -> Self {
        if weekly { Self::Weekly } else { Self::Calendar }
    }
}

/// A validated cashflow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CashflowRequest {
    /// Cash or bank account being reported.
    pub account_id: AccountId,
    /// Inclusive reporting range.
    pub range: DateRange,
    /// Period layout.
    pub mode: PeriodMode,
}

impl CashflowRequest {
    /// Validates raw request parameters.
    ///
    /// Parameters are checked in order (`account_id`, `dateFrom`, `dateTo`) so the
    /// first missing one is reported, then the range is checked.
    pub fn new(
        account_id: Option<AccountId>,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        weekly: bool,
    ) -> Result<Self, CashflowError> {
        let account_id = account_id.ok_or(CashflowError::MissingParameter("account_id"))?;
        let from = date_from.ok_or(CashflowError::MissingParameter("dateFrom"))?;
        let to = date_to.ok_or(CashflowError::MissingParameter("dateTo"))?;
        let range = DateRange::new(from, to)?;

        Ok(Self {
            account_id,
            range,
            mode: PeriodMode::from_weekly_flag(weekly),
        })
    }
}

/// A reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    /// Fiscal period id (calendar mode) or 1-based week number (weekly mode).
    pub id: i32,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
}

impl Period {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// One ledger transaction against the reported account, debits and credits summed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    /// Ledger transaction identifier (e.g. `TPA42`).
    pub transaction_id: String,
    /// Source document of the transaction.
    pub record_uuid: Uuid,
    /// Transaction date.
    pub date: NaiveDate,
    /// Fiscal period the transaction was posted in.
    pub period_id: Option<PeriodId>,
    /// Number of the reported account.
    pub account_number: String,
    /// Debit in enterprise currency.
    pub debit_equiv: Decimal,
    /// Credit in enterprise currency.
    pub credit_equiv: Decimal,
    /// Currency of the source document.
    pub currency_id: CurrencyId,
    /// Ledger description.
    pub description: String,
    /// Transaction type the posting originates from.
    pub origin_id: Option<TransactionTypeId>,
    /// Label of the transaction type.
    pub transaction_type: String,
}

/// A classified income or expense line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEntry {
    /// Transaction type label.
    pub transfer_type: String,
    /// Total over the postings sharing the origin of this entry.
    pub value: Decimal,
    /// Currency of the row that produced the entry.
    pub currency_id: CurrencyId,
}

/// Flows and balances of one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    /// The period.
    pub period: Period,
    /// Incomes by label, first occurrence order.
    pub incomes: Vec<FlowEntry>,
    /// Expenses by label, first occurrence order.
    pub expenses: Vec<FlowEntry>,
    /// Sum of debits of the period.
    pub total_income: Decimal,
    /// Sum of credits of the period.
    pub total_expense: Decimal,
    /// Balance carried into the period.
    pub opening_balance: Decimal,
    /// `opening_balance + total_income - total_expense`.
    pub closing_balance: Decimal,
}

impl PeriodSummary {
    /// Value of a label among the incomes, zero when absent.
    #[must_use]
    pub fn income(&self, label: &str) -> Decimal {
        value_of(&self.incomes, label)
    }

    /// Value of a label among the expenses, zero when absent.
    #[must_use]
    pub fn expense(&self, label: &str) -> Decimal {
        value_of(&self.expenses, label)
    }
}

fn value_of(entries: &[FlowEntry], label: &str) -> Decimal {
    entries
        .iter()
        .find(|e| e.transfer_type == label)
        .map_or(Decimal::ZERO, |e| e.value)
}

/// Balance of the account before the first reported day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningBalance {
    /// Balance amount.
    pub balance: Decimal,
}

/// One label across every period, by period index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRow {
    /// Transaction type label.
    pub label: String,
    /// Value per period, zero where the label did not occur.
    pub values: Vec<Decimal>,
    /// Sum of `values`.
    pub total: Decimal,
}

/// Complete cashflow report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowReport {
    /// Reported account.
    pub account_id: AccountId,
    /// Period layout used.
    pub mode: PeriodMode,
    /// First requested day.
    pub date_from: NaiveDate,
    /// Last requested day.
    pub date_to: NaiveDate,
    /// Balance before `date_from`.
    pub opening_balance: OpeningBalance,
    /// Per-period flows, in period order.
    pub flows: Vec<PeriodSummary>,
    /// Every income label of the report, first occurrence order.
    pub income_labels: Vec<String>,
    /// Every expense label of the report, first occurrence order.
    pub expense_labels: Vec<String>,
    /// Postings that fell outside every resolved period.
    #[serde(skip)]
    pub unassigned_postings: usize,
}

impl CashflowReport {
    /// Income labels against periods.
    #[must_use]
    pub fn income_matrix(&self) -> Vec<LabelRow> {
        self.label_matrix(&self.income_labels, PeriodSummary::income)
    }

    /// Expense labels against periods.
    #[must_use]
    pub fn expense_matrix(&self) -> Vec<LabelRow> {
        self.label_matrix(&self.expense_labels, PeriodSummary::expense)
    }

    /// Closing balance of the last period, or the opening balance when empty.
    #[must_use]
    pub fn closing_balance(&self) -> Decimal {
        self.flows
            .last()
            .map_or(self.opening_balance.balance, |f| f.closing_balance)
    }

    /// Total income over all periods.
    #[must_use]
    pub fn total_income(&self) -> Decimal {
        self.flows.iter().map(|f| f.total_income).sum()
    }

    /// Total expense over all periods.
    #[must_use]
    pub fn total_expense(&self) -> Decimal {
        self.flows.iter().map(|f| f.total_expense).sum()
    }

    fn label_matrix(
        &self,
        labels: &[String],
        value: fn(&PeriodSummary, &str) -> Decimal,
    ) -> Vec<LabelRow> {
        labels
            .iter()
            .map(|label| {
                let values: Vec<Decimal> = self.flows.iter().map(|f| value(f, label)).collect();
                let total = values.iter().copied().sum();
                LabelRow {
                    label: label.clone(),
                    values,
                    total,
                }
            })
            .collect()
    }
}
