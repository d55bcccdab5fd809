//! Cashflow error types.

use bhima_shared::AppError;
use bhima_shared::types::date_range::InvalidDateRange;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while validating or resolving a cashflow request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CashflowError {
    /// A required request parameter is absent.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Start date is after end date.
    #[error("Invalid date range: start {from} is after end {to}")]
    InvalidRange {
        /// Requested start date.
        from: NaiveDate,
        /// Requested end date.
        to: NaiveDate,
    },

    /// No period overlaps the requested dates.
    #[error("No reporting period covers {from} to {to}")]
    NoPeriods {
        /// Requested start date.
        from: NaiveDate,
        /// Requested end date.
        to: NaiveDate,
    },
}

impl From<InvalidDateRange> for CashflowError {
    fn from(err: InvalidDateRange) -> Self {
        Self::InvalidRange {
            from: err.start,
            to: err.end,
        }
    }
}

impl From<CashflowError> for AppError {
    fn from(err: CashflowError) -> Self {
        match err {
            CashflowError::MissingParameter(name) => Self::MissingParameter(name.to_string()),
            CashflowError::InvalidRange { .. } | CashflowError::NoPeriods { .. } => {
                Self::InvalidRange(err.to_string())
            }
        }
    }
}
