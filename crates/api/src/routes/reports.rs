//! Report routes.
//!
//! Filters arrive as query parameters. List filters are comma-separated and
//! flags accept `1`/`true`/`yes`/`on`.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError};
use ledgerlens_core::reports::{
    Frequency, IncomeExpenseFilters, IncomeExpenseReport, ItemShortageReport, PurchaseOrderFilters,
    PurchaseOrderReport, ReportOutput, SalesInvoiceFilters, SalesInvoiceReport, ShortageFilters,
};
use ledgerlens_db::{
    LedgerRepository, PurchaseOrderRepository, SalesInvoiceRepository, StockRepository,
};
use ledgerlens_shared::AppError;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/income-and-expenses", get(get_income_and_expenses))
        .route("/reports/item-shortage", get(get_item_shortage))
        .route("/reports/purchase-order-analysis", get(get_purchase_order_analysis))
        .route(
            "/reports/outstanding-sales-invoices",
            get(get_outstanding_sales_invoices),
        )
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters for the income and expenses report.
#[derive(Debug, Default, Deserialize)]
pub struct IncomeExpenseParams {
    /// Start date.
    pub from_date: Option<NaiveDate>,
    /// End date.
    pub to_date: Option<NaiveDate>,
    /// Use a fixed window after `from_date`.
    pub monthwise: Option<String>,
    /// Company.
    pub company: Option<String>,
    /// `Monthly` or `Yearly`.
    pub frequency: Option<String>,
    /// Single branch.
    pub branch: Option<String>,
}

impl TryFrom<IncomeExpenseParams> for IncomeExpenseFilters {
    type Error = ApiError;

    fn try_from(params: IncomeExpenseParams) -> Result<Self, Self::Error> {
        let frequency = match params.frequency.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(Frequency::parse(value).ok_or_else(|| {
                AppError::Validation(format!("Unknown frequency: {value}"))
            })?),
        };

        Ok(Self {
            from_date: params.from_date,
            to_date: params.to_date,
            monthwise: parse_flag(params.monthwise.as_deref()),
            company: params.company,
            frequency,
            branch: params.branch,
        })
    }
}

/// Query parameters for the item shortage report.
#[derive(Debug, Default, Deserialize)]
pub struct ShortageParams {
    /// Company.
    pub company: Option<String>,
    /// Warehouses (comma-separated).
    pub warehouse: Option<String>,
    /// Item groups (comma-separated).
    pub item_group: Option<String>,
}

impl From<ShortageParams> for ShortageFilters {
    fn from(params: ShortageParams) -> Self {
        Self {
            company: params.company,
            warehouse: parse_list(params.warehouse.as_deref()),
            item_group: parse_list(params.item_group.as_deref()),
        }
    }
}

/// Query parameters for the purchase order analysis.
#[derive(Debug, Default, Deserialize)]
pub struct PurchaseOrderParams {
    /// Company.
    pub company: Option<String>,
    /// Purchase order id.
    pub name: Option<String>,
    /// Start date.
    pub from_date: Option<NaiveDate>,
    /// End date.
    pub to_date: Option<NaiveDate>,
    /// Statuses (comma-separated).
    pub status: Option<String>,
    /// Project.
    pub project: Option<String>,
    /// Supplier (accepted, not applied).
    pub supplier: Option<String>,
    /// Group by supplier.
    pub group_by_supplier: Option<String>,
    /// Group by item code.
    pub group_by_item_code: Option<String>,
}

impl From<PurchaseOrderParams> for PurchaseOrderFilters {
    fn from(params: PurchaseOrderParams) -> Self {
        Self {
            company: params.company,
            name: params.name,
            from_date: params.from_date,
            to_date: params.to_date,
            status: parse_list(params.status.as_deref()),
            project: params.project,
            supplier: params.supplier,
            group_by_supplier: parse_flag(params.group_by_supplier.as_deref()),
            group_by_item_code: parse_flag(params.group_by_item_code.as_deref()),
        }
    }
}

/// Query parameters for the outstanding sales invoice report.
#[derive(Debug, Default, Deserialize)]
pub struct SalesInvoiceParams {
    /// Start date.
    pub from_date: Option<NaiveDate>,
    /// End date.
    pub to_date: Option<NaiveDate>,
    /// Customer.
    pub customer: Option<String>,
    /// Reference date for credit days left (defaults to today).
    pub as_of: Option<NaiveDate>,
}

impl From<SalesInvoiceParams> for SalesInvoiceFilters {
    fn from(params: SalesInvoiceParams) -> Self {
        Self {
            from_date: params.from_date,
            to_date: params.to_date,
            customer: params.customer,
            as_of: params.as_of,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Splits a comma-separated list, dropping blank items.
fn parse_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Interprets a checkbox-style flag.
fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_income_and_expenses(
    State(state): State<AppState>,
    Query(params): Query<IncomeExpenseParams>,
) -> Result<Json<ReportOutput>, ApiError> {
    let filters = IncomeExpenseFilters::try_from(params)?;
    let repo = LedgerRepository::new((*state.db).clone());

    let output = IncomeExpenseReport::run(&filters, &repo, &repo, &state.settings).await?;

    info!(rows = output.rows.len(), "Served income and expenses report");
    Ok(Json(output))
}

async fn get_item_shortage(
    State(state): State<AppState>,
    Query(params): Query<ShortageParams>,
) -> Result<Json<ReportOutput>, ApiError> {
    let filters = ShortageFilters::from(params);
    let repo = StockRepository::new((*state.db).clone());

    let output = ItemShortageReport::run(&filters, &repo, &state.settings).await?;

    info!(rows = output.rows.len(), "Served item shortage report");
    Ok(Json(output))
}

async fn get_purchase_order_analysis(
    State(state): State<AppState>,
    Query(params): Query<PurchaseOrderParams>,
) -> Result<Json<ReportOutput>, ApiError> {
    let filters = PurchaseOrderFilters::from(params);
    let repo = PurchaseOrderRepository::new((*state.db).clone());

    let output = PurchaseOrderReport::run(&filters, &repo).await?;

    info!(rows = output.rows.len(), "Served purchase order analysis");
    Ok(Json(output))
}

async fn get_outstanding_sales_invoices(
    State(state): State<AppState>,
    Query(params): Query<SalesInvoiceParams>,
) -> Result<Json<ReportOutput>, ApiError> {
    let filters = SalesInvoiceFilters::from(params);
    let repo = SalesInvoiceRepository::new((*state.db).clone());

    let output = SalesInvoiceReport::run(&filters, &repo).await?;

    info!(rows = output.rows.len(), "Served outstanding sales invoices");
    Ok(Json(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, vec![])]
    #[case(Some(""), vec![])]
    #[case(Some("Stores - AC"), vec!["Stores - AC"])]
    #[case(Some("Stores - AC, Finished - AC,,"), vec!["Stores - AC", "Finished - AC"])]
    fn test_parse_list(#[case] input: Option<&str>, #[case] expected: Vec<&str>) {
        assert_eq!(parse_list(input), expected);
    }

    #[rstest]
    #[case(None, false)]
    #[case(Some("1"), true)]
    #[case(Some("true"), true)]
    #[case(Some("On"), true)]
    #[case(Some("0"), false)]
    #[case(Some(""), false)]
    fn test_parse_flag(#[case] input: Option<&str>, #[case] expected: bool) {
        assert_eq!(parse_flag(input), expected);
    }

    #[test]
    fn test_unknown_frequency_rejected() {
        let params = IncomeExpenseParams {
            frequency: Some("Fortnightly".to_string()),
            ..Default::default()
        };
        let err = IncomeExpenseFilters::try_from(params).unwrap_err();
        assert!(matches!(err.0, AppError::Validation(_)));
    }

    #[test]
    fn test_income_params_conversion() {
        let params = IncomeExpenseParams {
            from_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            monthwise: Some("1".to_string()),
            frequency: Some("monthly".to_string()),
            company: Some("Acme".to_string()),
            ..Default::default()
        };
        let filters = IncomeExpenseFilters::try_from(params).unwrap();
        assert!(filters.monthwise);
        assert_eq!(filters.frequency, Some(Frequency::Monthly));
    }

    #[test]
    fn test_purchase_order_params_conversion() {
        let params = PurchaseOrderParams {
            status: Some("To Bill,To Receive".to_string()),
            group_by_supplier: Some("true".to_string()),
            ..Default::default()
        };
        let filters = PurchaseOrderFilters::from(params);
        assert_eq!(filters.status, vec!["To Bill", "To Receive"]);
        assert!(filters.group_by_supplier);
        assert!(!filters.group_by_item_code);
    }
}
