//! Cashflow report generation.
//!
//! The pipeline runs in fixed stages, each a plain function over owned data:
//!
//! 1. [`period`] resolves the reporting periods (calendar or weekly)
//! 2. [`grouping`] buckets postings into those periods
//! 3. [`classifier`] splits each bucket into labelled incomes and expenses
//! 4. [`balance`] chains opening and closing balances across periods
//! 5. [`service`] assembles the label-indexed report
//!
//! [`by_service`] builds the service-oriented cash matrix from payment rows.

pub mod balance;
pub mod by_service;
pub mod classifier;
pub mod error;
pub mod grouping;
pub mod period;
pub mod service;
pub mod types;


pub use balance::{BalanceAccumulator, PeriodBalance};
pub use by_service::{ServiceInvoiced, ServiceMatrix, ServiceMatrixRow, ServicePayment};
pub use classifier::ClassifiedFlows;
pub use error::CashflowError;
pub use grouping::PeriodBuckets;
pub use service::CashflowService;
pub use types::*;
