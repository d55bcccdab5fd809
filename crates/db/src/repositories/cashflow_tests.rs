//! Tests for the cashflow repository conversions.
//!
//! Queries themselves are covered by the integration tests under `tests/`.

use bhima_core::cashflow::{Period, Posting};
use bhima_shared::AppError;
use bhima_shared::types::{CurrencyId, PeriodId, TransactionTypeId};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::DbErr;
use uuid::Uuid;

use super::{CashflowQueryError, PostingRow, UNCLASSIFIED_LABEL, period_from_model};
use crate::entities::period;

fn row() -> PostingRow {
    PostingRow {
        trans_id: "TPA42".to_string(),
        record_uuid: Uuid::nil(),
        trans_date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        period_id: Some(202_403),
        account_number: "57110010".to_string(),
        debit_equiv: dec!(125.50),
        credit_equiv: dec!(0),
        currency_id: 2,
        description: Some("Cash payment".to_string()),
        transaction_type_id: Some(1),
        transaction_type: "CASH_PAYMENT".to_string(),
    }
}

#[test]
fn test_posting_from_row() {
    let posting = Posting::from(row());

    assert_eq!(posting.transaction_id, "TPA42");
    assert_eq!(posting.period_id, Some(PeriodId::new(202_403)));
    assert_eq!(posting.currency_id, CurrencyId::new(2));
    assert_eq!(posting.origin_id, Some(TransactionTypeId::new(1)));
    assert_eq!(posting.debit_equiv, dec!(125.50));
    assert_eq!(posting.description, "Cash payment");
}

#[test]
fn test_posting_from_unclassified_row() {
    let posting = Posting::from(PostingRow {
        period_id: None,
        description: None,
        transaction_type_id: None,
        transaction_type: UNCLASSIFIED_LABEL.to_string(),
        ..row()
    });

    assert_eq!(posting.period_id, None);
    assert_eq!(posting.origin_id, None);
    assert_eq!(posting.description, "");
    assert_eq!(posting.transaction_type, "UNCLASSIFIED");
}

#[test]
fn test_period_from_model() {
    let model = period::Model {
        id: 202_401,
        fiscal_year_id: 2024,
        number: 1,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        locked: false,
    };

    assert_eq!(
        period_from_model(model),
        Period {
            id: 202_401,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        }
    );
}

#[test]
fn test_query_error_maps_to_database_error() {
    let err: AppError = CashflowQueryError::from(DbErr::Custom("connection reset".to_string())).into();

    assert_eq!(err.status_code(), 500);
    assert_eq!(err.error_code(), "DATABASE_ERROR");
}
