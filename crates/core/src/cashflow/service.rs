//! Cashflow report assembly.

use rust_decimal::Decimal;

use super::balance::BalanceAccumulator;
use super::classifier::classify;
use super::error::CashflowError;
use super::grouping::group_by_period;
use super::period::{calendar_periods, ensure_resolved, weekly_periods};
use super::types::{
    CashflowReport, CashflowRequest, FlowEntry, OpeningBalance, Period, PeriodMode, PeriodSummary,
    Posting,
};

/// Service for generating cashflow reports.
pub struct CashflowService;

impl CashflowService {
    /// Resolves the reporting periods of a request.
    ///
    /// Weekly requests generate their weeks and ignore `calendar_candidates`;
    /// calendar requests keep the candidates overlapping the range.
    pub fn resolve_periods(
        request: &CashflowRequest,
        calendar_candidates: Vec<Period>,
    ) -> Result<Vec<Period>, CashflowError> {
        let periods = match request.mode {
            PeriodMode::Weekly => weekly_periods(request.range),
            PeriodMode::Calendar => calendar_periods(calendar_candidates, request.range),
        };
        ensure_resolved(periods, request.range)
    }

    /// Builds the report from resolved periods, the account's postings and the
    /// balance before the range.
    pub fn assemble(
        request: &CashflowRequest,
        periods: Vec<Period>,
        postings: &[Posting],
        opening_balance: Decimal,
    ) -> Result<CashflowReport, CashflowError> {
        let periods = ensure_resolved(periods, request.range)?;
        let first_start = periods
            .first()
            .map_or(request.range.start(), |p| p.start_date);

        let grouped = group_by_period(&periods, postings, request.mode);
        let mut balances = BalanceAccumulator::new(opening_balance, first_start);
        let mut income_labels = Vec::new();
        let mut expense_labels = Vec::new();
        let mut flows = Vec::with_capacity(periods.len());

        for (period, bucket) in periods.iter().zip(&grouped.buckets) {
            let classified = classify(bucket);
            collect_labels(&mut income_labels, &classified.incomes);
            collect_labels(&mut expense_labels, &classified.expenses);

            let balance = balances.post(period, classified.total_income, classified.total_expense);

            flows.push(PeriodSummary {
                period: *period,
                incomes: classified.incomes,
                expenses: classified.expenses,
                total_income: classified.total_income,
                total_expense: classified.total_expense,
                opening_balance: balance.opening,
                closing_balance: balance.closing,
            });
        }

        Ok(CashflowReport {
            account_id: request.account_id,
            mode: request.mode,
            date_from: request.range.start(),
            date_to: request.range.end(),
            opening_balance: OpeningBalance {
                balance: opening_balance,
            },
            flows,
            income_labels,
            expense_labels,
            unassigned_postings: grouped.unassigned,
        })
    }
}

fn collect_labels(labels: &mut Vec<String>, entries: &[FlowEntry]) {
    for entry in entries {
        if !labels.contains(&entry.transfer_type) {
            labels.push(entry.transfer_type.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhima_shared::types::{AccountId, CurrencyId, PeriodId, TransactionTypeId};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn posting(
        date: NaiveDate,
        period: i32,
        origin: i32,
        label: &str,
        debit: Decimal,
        credit: Decimal,
    ) -> Posting {
        Posting {
            transaction_id: format!("TX{period}{origin}"),
            record_uuid: Uuid::new_v4(),
            date,
            period_id: Some(PeriodId::new(period)),
            account_number: "57110010".to_string(),
            debit_equiv: debit,
            credit_equiv: credit,
            currency_id: CurrencyId::new(2),
            description: String::new(),
            origin_id: Some(TransactionTypeId::new(origin)),
            transaction_type: label.to_string(),
        }
    }

    fn calendar_request(from: NaiveDate, to: NaiveDate) -> CashflowRequest {
        CashflowRequest::new(Some(AccountId::new(3)), Some(from), Some(to), false).unwrap()
    }

    fn jan_feb() -> Vec<Period> {
        vec![
            Period {
                id: 1,
                start_date: d(2024, 1, 1),
                end_date: d(2024, 1, 31),
            },
            Period {
                id: 2,
                start_date: d(2024, 2, 1),
                end_date: d(2024, 2, 29),
            },
        ]
    }

    #[test]
    fn test_two_period_scenario() {
        let request = calendar_request(d(2024, 1, 1), d(2024, 2, 29));
        let postings = vec![
            posting(d(2024, 1, 5), 1, 1, "CASH_PAYMENT", dec!(500), dec!(0)),
            posting(d(2024, 1, 9), 1, 9, "PURCHASES", dec!(0), dec!(200)),
            posting(d(2024, 2, 3), 2, 1, "CASH_PAYMENT", dec!(300), dec!(0)),
            posting(d(2024, 2, 7), 2, 9, "PURCHASES", dec!(0), dec!(400)),
        ];

        let report = CashflowService::assemble(&request, jan_feb(), &postings, dec!(100)).unwrap();

        assert_eq!(report.opening_balance.balance, dec!(100));
        assert_eq!(report.flows[0].closing_balance, dec!(400));
        assert_eq!(report.flows[1].opening_balance, dec!(400));
        assert_eq!(report.flows[1].closing_balance, dec!(300));
        assert_eq!(report.closing_balance(), dec!(300));
        assert_eq!(report.income_labels, vec!["CASH_PAYMENT".to_string()]);
        assert_eq!(report.expense_labels, vec!["PURCHASES".to_string()]);
    }

    #[test]
    fn test_label_matrix_fills_missing_periods_with_zero() {
        let request = calendar_request(d(2024, 1, 1), d(2024, 2, 29));
        let postings = vec![
            posting(d(2024, 1, 5), 1, 1, "CASH_PAYMENT", dec!(50), dec!(0)),
            posting(d(2024, 2, 3), 2, 7, "SUPPORT_INCOME", dec!(20), dec!(0)),
        ];

        let report = CashflowService::assemble(&request, jan_feb(), &postings, dec!(0)).unwrap();
        let matrix = report.income_matrix();

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].label, "CASH_PAYMENT");
        assert_eq!(matrix[0].values, vec![dec!(50), dec!(0)]);
        assert_eq!(matrix[1].values, vec![dec!(0), dec!(20)]);
        assert_eq!(matrix[1].total, dec!(20));
        assert!(report.expense_matrix().is_empty());
    }

    #[test]
    fn test_unassigned_postings_are_reported() {
        let request = calendar_request(d(2024, 1, 1), d(2024, 2, 29));
        let postings = vec![posting(d(2024, 3, 1), 3, 1, "CASH_PAYMENT", dec!(5), dec!(0))];

        let report = CashflowService::assemble(&request, jan_feb(), &postings, dec!(0)).unwrap();

        assert_eq!(report.unassigned_postings, 1);
        assert_eq!(report.total_income(), dec!(0));
    }

    #[test]
    fn test_weekly_resolution_ignores_candidates() {
        let request = CashflowRequest::new(
            Some(AccountId::new(3)),
            Some(d(2024, 3, 5)),
            Some(d(2024, 3, 20)),
            true,
        )
        .unwrap();

        let periods = CashflowService::resolve_periods(&request, jan_feb()).unwrap();

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].start_date, d(2024, 3, 5));
    }

    #[test]
    fn test_calendar_resolution_without_periods_fails() {
        let request = calendar_request(d(2030, 1, 1), d(2030, 1, 31));

        let err = CashflowService::resolve_periods(&request, jan_feb()).unwrap_err();

        assert!(matches!(err, CashflowError::NoPeriods { .. }));
    }

    #[test]
    fn test_assemble_rejects_empty_periods() {
        let request = calendar_request(d(2024, 1, 1), d(2024, 1, 31));

        let err = CashflowService::assemble(&request, Vec::new(), &[], dec!(0)).unwrap_err();

        assert!(matches!(err, CashflowError::NoPeriods { .. }));
    }

    #[test]
    fn test_report_json_shape() {
        let request = calendar_request(d(2024, 1, 1), d(2024, 2, 29));
        let report = CashflowService::assemble(&request, jan_feb(), &[], dec!(12.5)).unwrap();

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["openingBalance"]["balance"], "12.5");
        assert_eq!(json["flows"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["flows"][0]["period"]["startDate"], "2024-01-01");
        assert!(json["flows"][0]["incomes"].as_array().is_some());
        assert!(json.get("unassignedPostings").is_none());
        assert_eq!(json["mode"], "calendar");
    }
}
