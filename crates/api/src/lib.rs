//! HTTP API layer with Axum routes and report rendering.
//!
//! This crate provides:
//! - REST API routes for the cashflow reports
//! - Query parameter parsing and validation
//! - Error to HTTP response mapping
//! - HTML report documents

pub mod error;
pub mod render;
pub mod routes;

use axum::Router;
use bhima_shared::config::{CashflowConfig, ReportConfig};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tera::Tera;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Compiled report templates.
    pub templates: Arc<Tera>,
    /// Transfer exclusions applied to ledger queries.
    pub cashflow: CashflowConfig,
    /// Report document settings.
    pub report: Arc<ReportConfig>,
}

impl AppState {
    /// Builds the state with the bundled report templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled template fails to compile.
    pub fn new(
        db: DatabaseConnection,
        cashflow: CashflowConfig,
        report: ReportConfig,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            db: Arc::new(db),
            templates: Arc::new(render::load_templates()?),
            cashflow,
            report: Arc::new(report),
        })
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
