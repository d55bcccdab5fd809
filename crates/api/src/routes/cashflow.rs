//! Cashflow routes.
//!
//! Every parameter is read as a raw string and validated here, in a fixed
//! order, before the first query runs.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use bhima_core::cashflow::{
    CashflowReport, CashflowRequest, CashflowService, PeriodMode, ServiceMatrix,
};
use bhima_db::CashflowRepository;
use bhima_shared::AppError;
use bhima_shared::types::{AccountId, DateRange};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{info, warn};

use crate::AppState;
use crate::error::ApiError;
use crate::render::{self, DocumentOptions, Orientation, Renderer};

/// Creates the cashflow routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/finance/cashflow", get(get_cashflow))
        .route("/reports/finance/cashflow", get(get_cashflow_report))
        .route(
            "/reports/finance/cashflow/services",
            get(get_services_report),
        )
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters of the cashflow report.
#[derive(Debug, Default, Deserialize)]
pub struct CashflowQuery {
    /// Cash or bank account id.
    pub account_id: Option<String>,
    /// First day, `YYYY-MM-DD` or RFC 3339.
    #[serde(rename = "dateFrom")]
    pub date_from: Option<String>,
    /// Last day, `YYYY-MM-DD` or RFC 3339.
    #[serde(rename = "dateTo")]
    pub date_to: Option<String>,
    /// Truthy for weekly periods.
    pub weekly: Option<String>,
}

impl CashflowQuery {
    /// Validates the parameters into a request.
    ///
    /// Checked in order: `account_id`, `dateFrom`, `dateTo`, then the range.
    pub fn to_request(&self) -> Result<CashflowRequest, AppError> {
        let account_id = parse_account_id(required("account_id", self.account_id.as_deref())?)?;
        let from = parse_date("dateFrom", required("dateFrom", self.date_from.as_deref())?)?;
        let to = parse_date("dateTo", required("dateTo", self.date_to.as_deref())?)?;

        Ok(CashflowRequest::new(
            Some(account_id),
            Some(from),
            Some(to),
            is_truthy(self.weekly.as_deref()),
        )?)
    }
}

/// Query parameters shared by rendered documents.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentQuery {
    /// `html` (default) or `json`.
    pub renderer: Option<String>,
    /// `portrait` (default) or `landscape`.
    pub orientation: Option<String>,
    /// Name of the user printing the document.
    pub user: Option<String>,
}

impl DocumentQuery {
    fn renderer(&self) -> Result<Renderer, AppError> {
        Renderer::parse(self.renderer.as_deref())
    }

    fn options(&self, state: &AppState) -> Result<DocumentOptions, AppError> {
        Ok(DocumentOptions {
            orientation: Orientation::parse(self.orientation.as_deref())?,
            user: self.user.clone().filter(|u| !u.trim().is_empty()),
            enterprise_name: state.report.enterprise_name.clone(),
        })
    }
}

/// Query parameters of the rendered cashflow report.
#[derive(Debug, Default, Deserialize)]
pub struct CashflowReportQuery {
    /// Report parameters.
    #[serde(flatten)]
    pub cashflow: CashflowQuery,
    /// Document parameters.
    #[serde(flatten)]
    pub document: DocumentQuery,
}

/// Query parameters of the by-service report.
#[derive(Debug, Default, Deserialize)]
pub struct ServicesReportQuery {
    /// First day.
    #[serde(rename = "dateFrom")]
    pub date_from: Option<String>,
    /// Last day.
    #[serde(rename = "dateTo")]
    pub date_to: Option<String>,
    /// Document parameters.
    #[serde(flatten)]
    pub document: DocumentQuery,
}

impl ServicesReportQuery {
    fn range(&self) -> Result<DateRange, AppError> {
        let from = parse_date("dateFrom", required("dateFrom", self.date_from.as_deref())?)?;
        let to = parse_date("dateTo", required("dateTo", self.date_to.as_deref())?)?;
        DateRange::new(from, to).map_err(|e| AppError::InvalidRange(e.to_string()))
    }
}

// ============================================================================
// Parameter Parsing
// ============================================================================

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, AppError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::MissingParameter(name.to_string()))
}

fn parse_account_id(raw: &str) -> Result<AccountId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation(format!("Invalid account_id: {raw}")))
}

/// Parses `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its date.
pub fn parse_date(name: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::Validation(format!("Invalid {name}: {raw}")))
}

/// `1`, `true`, `yes` and `on` (any case) are truthy.
pub fn is_truthy(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

// ============================================================================
// Report Building
// ============================================================================

/// Runs the queries of a validated request and assembles the report.
///
/// Queries run in sequence: periods, opening balance, postings.
pub async fn build_report(
    state: &AppState,
    request: &CashflowRequest,
) -> Result<CashflowReport, ApiError> {
    let repo = CashflowRepository::new((*state.db).clone(), state.cashflow);

    let candidates = match request.mode {
        PeriodMode::Calendar => repo.find_periods(request.range).await?,
        PeriodMode::Weekly => Vec::new(),
    };
    let periods = CashflowService::resolve_periods(request, candidates)?;

    let opening = repo
        .opening_balance(request.account_id, request.range.start())
        .await?;
    let postings = repo.find_postings(request.account_id, request.range).await?;

    let report = CashflowService::assemble(request, periods, &postings, opening)?;

    if report.unassigned_postings > 0 {
        warn!(
            account_id = %request.account_id,
            range = %request.range,
            count = report.unassigned_postings,
            "Postings fell outside every reporting period"
        );
    }

    info!(
        account_id = %request.account_id,
        mode = ?request.mode,
        periods = report.flows.len(),
        postings = postings.len(),
        "Generated cashflow report"
    );

    Ok(report)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /finance/cashflow
async fn get_cashflow(
    State(state): State<AppState>,
    Query(query): Query<CashflowQuery>,
) -> Result<Json<CashflowReport>, ApiError> {
    let request = query.to_request()?;
    let report = build_report(&state, &request).await?;
    Ok(Json(report))
}

/// GET /reports/finance/cashflow
async fn get_cashflow_report(
    State(state): State<AppState>,
    Query(query): Query<CashflowReportQuery>,
) -> Result<Response, ApiError> {
    let request = query.cashflow.to_request()?;
    let renderer = query.document.renderer()?;
    let options = query.document.options(&state)?;

    let report = build_report(&state, &request).await?;

    match renderer {
        Renderer::Json => Ok(Json(report).into_response()),
        Renderer::Html => {
            let html = render::render_cashflow(&state.templates, &report, &options)?;
            Ok(Html(html).into_response())
        }
    }
}

/// GET /reports/finance/cashflow/services
async fn get_services_report(
    State(state): State<AppState>,
    Query(query): Query<ServicesReportQuery>,
) -> Result<Response, ApiError> {
    let range = query.range()?;
    let renderer = query.document.renderer()?;
    let options = query.document.options(&state)?;

    let repo = CashflowRepository::new((*state.db).clone(), state.cashflow);
    let payments = repo.find_service_payments(range).await?;
    let invoiced = repo.find_invoiced_by_service(range).await?;
    let matrix = ServiceMatrix::build(payments, &invoiced);

    info!(
        range = %range,
        services = matrix.services.len(),
        payments = matrix.rows.len(),
        "Generated cash by service report"
    );

    match renderer {
        Renderer::Json => Ok(Json(matrix).into_response()),
        Renderer::Html => {
            let html = render::render_services(
                &state.templates,
                &matrix,
                range.start(),
                range.end(),
                &options,
            )?;
            Ok(Html(html).into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn query(account_id: Option<&str>, from: Option<&str>, to: Option<&str>) -> CashflowQuery {
        CashflowQuery {
            account_id: account_id.map(str::to_string),
            date_from: from.map(str::to_string),
            date_to: to.map(str::to_string),
            weekly: None,
        }
    }

    #[rstest]
    #[case("2024-03-05", d(2024, 3, 5))]
    #[case("2024-03-05T00:00:00Z", d(2024, 3, 5))]
    #[case("2024-03-05T23:30:00+01:00", d(2024, 3, 5))]
    fn test_parse_date(#[case] raw: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_date("dateFrom", raw).unwrap(), expected);
    }

    #[rstest]
    #[case("05/03/2024")]
    #[case("2024-13-01")]
    #[case("yesterday")]
    fn test_parse_date_rejects(#[case] raw: &str) {
        let err = parse_date("dateFrom", raw).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[rstest]
    #[case(Some("1"), true)]
    #[case(Some("TRUE"), true)]
    #[case(Some("yes"), true)]
    #[case(Some("on"), true)]
    #[case(Some("0"), false)]
    #[case(Some("false"), false)]
    #[case(Some(""), false)]
    #[case(None, false)]
    fn test_is_truthy(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_truthy(value), expected);
    }

    #[rstest]
    #[case(query(None, Some("2024-01-01"), Some("2024-01-31")), "account_id")]
    #[case(query(Some(""), Some("2024-01-01"), Some("2024-01-31")), "account_id")]
    #[case(query(Some("3"), None, Some("2024-01-31")), "dateFrom")]
    #[case(query(Some("3"), Some("2024-01-01"), None), "dateTo")]
    #[case(query(None, None, None), "account_id")]
    fn test_missing_parameters_in_order(#[case] query: CashflowQuery, #[case] name: &str) {
        match query.to_request().unwrap_err() {
            AppError::MissingParameter(missing) => assert_eq!(missing, name),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_inverted_range_is_invalid() {
        let err = query(Some("3"), Some("2024-02-01"), Some("2024-01-01"))
            .to_request()
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DATE_RANGE");
    }

    #[test]
    fn test_valid_weekly_request() {
        let request = CashflowQuery {
            weekly: Some("1".to_string()),
            ..query(Some(" 3 "), Some("2024-03-05"), Some("2024-03-20"))
        }
        .to_request()
        .unwrap();

        assert_eq!(request.account_id, AccountId::new(3));
        assert_eq!(request.mode, PeriodMode::Weekly);
        assert_eq!(request.range.start(), d(2024, 3, 5));
    }

    #[test]
    fn test_non_numeric_account_is_rejected() {
        let err = query(Some("cash"), Some("2024-01-01"), Some("2024-01-31"))
            .to_request()
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
