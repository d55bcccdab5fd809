//! Core business logic for the bhima cashflow service.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Period resolution, posting classification, balance chaining and report
//! assembly live here; callers feed it rows they fetched elsewhere.
//!
//! # Modules
//!
//! - `cashflow` - Cashflow reports by period and cash receipts by service

pub mod cashflow;
