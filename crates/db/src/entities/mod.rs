//! `SeaORM` entities for the tables the cashflow reports read.

pub mod account;
pub mod cash;
pub mod cash_item;
pub mod fiscal_year;
pub mod general_ledger;
pub mod invoice;
pub mod patient;
pub mod period;
pub mod service;
pub mod transaction_type;
pub mod voucher;
