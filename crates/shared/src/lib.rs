//! Shared types, errors, and configuration for the bhima cashflow service.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Inclusive date ranges for report requests
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
