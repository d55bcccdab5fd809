//! Error to HTTP response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bhima_core::cashflow::CashflowError;
use bhima_db::CashflowQueryError;
use bhima_shared::AppError;
use serde_json::json;
use tracing::error;

/// Handler error. Client errors carry their message; server errors are
/// logged and answered with a generic one.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<CashflowError> for ApiError {
    fn from(err: CashflowError) -> Self {
        Self(err.into())
    }
}

impl From<CashflowQueryError> for ApiError {
    fn from(err: CashflowQueryError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
            "An internal error occurred".to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}
