//! Report documents.
//!
//! Templates are compiled into the binary. Amounts reach the templates as
//! preformatted strings so that Tera never sees a `Decimal`.

use bhima_core::cashflow::{CashflowReport, LabelRow, PeriodMode, PeriodSummary, ServiceMatrix};
use bhima_shared::AppError;
use rust_decimal::Decimal;
use serde::Serialize;
use tera::{Context, Tera};

const CASHFLOW_TEMPLATE: &str = "cashflow.html";
const SERVICES_TEMPLATE: &str = "cashflow_by_service.html";

/// Compiles the bundled templates.
///
/// # Errors
///
/// Returns an error if a template does not parse.
pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (CASHFLOW_TEMPLATE, include_str!("../templates/cashflow.html")),
        (SERVICES_TEMPLATE, include_str!("../templates/cashflow_by_service.html")),
    ])?;
    Ok(tera)
}

/// Output format of a report endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
    /// Printable HTML document.
    Html,
    /// The raw report payload.
    Json,
}

impl Renderer {
    /// Parses the `renderer` parameter; HTML when absent.
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("" | "html") => Ok(Self::Html),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(AppError::Validation(format!(
                "Unsupported renderer: {other}"
            ))),
        }
    }
}

/// Page orientation of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Default.
    Portrait,
    /// Wide tables.
    Landscape,
}

impl Orientation {
    /// Parses the `orientation` parameter; portrait when absent.
    pub fn parse(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("" | "portrait") => Ok(Self::Portrait),
            Some("landscape") => Ok(Self::Landscape),
            Some(other) => Err(AppError::Validation(format!(
                "Unsupported orientation: {other}"
            ))),
        }
    }
}

/// Document header settings.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Page orientation.
    pub orientation: Orientation,
    /// Name of the user printing the report.
    pub user: Option<String>,
    /// Name shown in the document header.
    pub enterprise_name: String,
}

#[derive(Serialize)]
struct ColumnView {
    label: String,
    opening: String,
    income: String,
    expense: String,
    closing: String,
}

#[derive(Serialize)]
struct RowView {
    label: String,
    values: Vec<String>,
    total: String,
}

#[derive(Serialize)]
struct PaymentView<'a> {
    reference: &'a str,
    date: String,
    patient: &'a str,
    values: Vec<String>,
    cumulative: String,
}

fn amount(value: Decimal) -> String {
    format!("{value:.2}")
}

fn amounts(values: &[Decimal]) -> Vec<String> {
    values.iter().copied().map(amount).collect()
}

fn column_label(flow: &PeriodSummary, mode: PeriodMode) -> String {
    match mode {
        PeriodMode::Calendar => flow.period.start_date.format("%B %Y").to_string(),
        PeriodMode::Weekly => format!(
            "Week {} ({} - {})",
            flow.period.id,
            flow.period.start_date.format("%d/%m"),
            flow.period.end_date.format("%d/%m")
        ),
    }
}

fn row_views(rows: Vec<LabelRow>) -> Vec<RowView> {
    rows.into_iter()
        .map(|row| RowView {
            label: row.label,
            values: row.values.into_iter().map(amount).collect(),
            total: amount(row.total),
        })
        .collect()
}

fn header_context(options: &DocumentOptions, title: &str) -> Context {
    let mut context = Context::new();
    context.insert("title", title);
    context.insert("enterprise_name", &options.enterprise_name);
    context.insert("orientation", &options.orientation);
    context.insert("user", &options.user);
    context
}

/// Renders the cashflow report as HTML.
///
/// # Errors
///
/// Returns a render error if the template fails.
pub fn render_cashflow(
    tera: &Tera,
    report: &CashflowReport,
    options: &DocumentOptions,
) -> Result<String, AppError> {
    let columns: Vec<ColumnView> = report
        .flows
        .iter()
        .map(|flow| ColumnView {
            label: column_label(flow, report.mode),
            opening: amount(flow.opening_balance),
            income: amount(flow.total_income),
            expense: amount(flow.total_expense),
            closing: amount(flow.closing_balance),
        })
        .collect();

    let mut context = header_context(options, "Cashflow");
    context.insert("account_id", &report.account_id.to_string());
    context.insert("date_from", &report.date_from.to_string());
    context.insert("date_to", &report.date_to.to_string());
    context.insert("columns", &columns);
    context.insert("incomes", &row_views(report.income_matrix()));
    context.insert("expenses", &row_views(report.expense_matrix()));
    context.insert("opening_balance", &amount(report.opening_balance.balance));
    context.insert("total_income", &amount(report.total_income()));
    context.insert("total_expense", &amount(report.total_expense()));
    context.insert("closing_balance", &amount(report.closing_balance()));

    tera.render(CASHFLOW_TEMPLATE, &context)
        .map_err(|e| AppError::Render(e.to_string()))
}

/// Renders the cash payments by service as HTML.
///
/// # Errors
///
/// Returns a render error if the template fails.
pub fn render_services(
    tera: &Tera,
    matrix: &ServiceMatrix,
    date_from: chrono::NaiveDate,
    date_to: chrono::NaiveDate,
    options: &DocumentOptions,
) -> Result<String, AppError> {
    let rows: Vec<PaymentView<'_>> = matrix
        .rows
        .iter()
        .map(|row| PaymentView {
            reference: &row.reference,
            date: row.date.to_string(),
            patient: &row.patient,
            values: row
                .values
                .iter()
                .map(|v| v.map(amount).unwrap_or_default())
                .collect(),
            cumulative: amount(row.cumulative),
        })
        .collect();

    let mut context = header_context(options, "Cash payments by service");
    context.insert("date_from", &date_from.to_string());
    context.insert("date_to", &date_to.to_string());
    context.insert("services", &matrix.services);
    context.insert("rows", &rows);
    context.insert("cash_totals", &amounts(&matrix.cash_totals));
    context.insert("invoiced_totals", &amounts(&matrix.invoiced_totals));
    context.insert("gaps", &amounts(&matrix.collection_gaps()));
    context.insert("grand_total", &amount(matrix.grand_total));
    context.insert("invoiced_grand_total", &amount(matrix.invoiced_grand_total));

    tera.render(SERVICES_TEMPLATE, &context)
        .map_err(|e| AppError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bhima_core::cashflow::{CashflowRequest, CashflowService, Period, ServicePayment};
    use bhima_shared::types::AccountId;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn options() -> DocumentOptions {
        DocumentOptions {
            orientation: Orientation::Landscape,
            user: Some("Super User".to_string()),
            enterprise_name: "Vanga Hospital".to_string(),
        }
    }

    #[rstest]
    #[case(None, Renderer::Html)]
    #[case(Some("html"), Renderer::Html)]
    #[case(Some("json"), Renderer::Json)]
    fn test_renderer_parse(#[case] value: Option<&str>, #[case] expected: Renderer) {
        assert_eq!(Renderer::parse(value).unwrap(), expected);
    }

    #[test]
    fn test_pdf_renderer_is_rejected() {
        let err = Renderer::parse(Some("pdf")).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[rstest]
    #[case(None, Orientation::Portrait)]
    #[case(Some("landscape"), Orientation::Landscape)]
    fn test_orientation_parse(#[case] value: Option<&str>, #[case] expected: Orientation) {
        assert_eq!(Orientation::parse(value).unwrap(), expected);
    }

    #[test]
    fn test_amount_has_two_decimals() {
        assert_eq!(amount(dec!(400)), "400.00");
        assert_eq!(amount(dec!(12.5)), "12.50");
    }

    #[test]
    fn test_render_cashflow_document() {
        let request =
            CashflowRequest::new(Some(AccountId::new(3)), Some(d(2024, 1, 1)), Some(d(2024, 1, 31)), false)
                .unwrap();
        let periods = vec![Period {
            id: 202_401,
            start_date: d(2024, 1, 1),
            end_date: d(2024, 1, 31),
        }];
        let report = CashflowService::assemble(&request, periods, &[], dec!(100)).unwrap();

        let html = render_cashflow(&load_templates().unwrap(), &report, &options()).unwrap();

        assert!(html.contains("Vanga Hospital"));
        assert!(html.contains("January 2024"));
        assert!(html.contains("100.00"));
        assert!(html.contains("landscape"));
        assert!(html.contains("Super User"));
    }

    #[test]
    fn test_render_services_document() {
        let matrix = ServiceMatrix::build(
            vec![ServicePayment {
                reference: "CP.HEV.7".to_string(),
                date: d(2024, 5, 2),
                patient: "Jane <Doe>".to_string(),
                service: "Laboratory".to_string(),
                amount: dec!(15),
            }],
            &[],
        );

        let html = render_services(
            &load_templates().unwrap(),
            &matrix,
            d(2024, 5, 1),
            d(2024, 5, 31),
            &options(),
        )
        .unwrap();

        assert!(html.contains("CP.HEV.7"));
        assert!(html.contains("Laboratory"));
        assert!(html.contains("15.00"));
        assert!(html.contains("Jane &lt;Doe&gt;"));
    }
}
