//! Income and expenses by branch.
//!
//! Rolls ledger postings up the account tree and renders one row per
//! account with a total column plus one column per branch, followed by a
//! net total row.

use ledgerlens_shared::ReportSettings;
use tracing::info;

use super::error::ReportError;
use super::filters::IncomeExpenseFilters;
use super::sources::{AccountSource, LedgerSource};
use super::types::{ColumnSpec, FieldType, ReportOutput, Row, RowBuilder, SummaryItem};
use crate::rollup::{BranchColumns, RollupEngine, RollupResult};

/// Label of the synthetic net row.
pub const TOTAL_ROW_LABEL: &str = "Total";

/// Income and expenses report.
pub struct IncomeExpenseReport;

impl IncomeExpenseReport {
    /// Runs the report.
    ///
    /// Filters are validated before any fetch. Accounts and ledger rows are
    /// then fetched concurrently and rolled up.
    pub async fn run<A, L>(
        filters: &IncomeExpenseFilters,
        accounts: &A,
        ledger: &L,
        settings: &ReportSettings,
    ) -> Result<ReportOutput, ReportError>
    where
        A: AccountSource + ?Sized,
        L: LedgerSource + ?Sized,
    {
        let query = filters.validate(settings)?;

        let (account_nodes, ledger_rows) = tokio::try_join!(
            accounts.fetch_accounts(&query.company),
            ledger.fetch_ledger(&query),
        )?;

        let branches = BranchColumns::from_ledger(&ledger_rows);
        let result = RollupEngine::build(&account_nodes, &ledger_rows, &branches)?;

        info!(
            company = %query.company,
            from_date = %query.from_date,
            to_date = %query.to_date,
            accounts = account_nodes.len(),
            ledger_rows = ledger_rows.len(),
            branches = branches.len(),
            "Income and expenses report generated"
        );

        Ok(Self::render(&result, &branches))
    }

    /// Renders a rollup into report output.
    #[must_use]
    pub fn render(result: &RollupResult, branches: &BranchColumns) -> ReportOutput {
        let mut rows: Vec<Row> = result
            .rows
            .iter()
            .map(|row| {
                let builder = RowBuilder::new()
                    .text("account", row.account.as_str())
                    .opt_text("parent_account", row.parent_account.as_deref())
                    .int("indent", row.indent)
                    .flag("is_group", row.is_group)
                    .text("root_type", row.root_type.as_str())
                    .amount("total_amount", row.total);

                branches
                    .iter()
                    .fold(builder, |b, column| b.amount(&column.field_id, row.balance(&column.key)))
                    .build()
            })
            .collect();

        let totals = &result.totals;
        let total_row = branches
            .iter()
            .fold(
                RowBuilder::new()
                    .text("account", TOTAL_ROW_LABEL)
                    .amount("total_amount", totals.total),
                |b, column| b.amount(&column.field_id, totals.balance(&column.key)),
            )
            .flag("is_total_row", true)
            .build();
        rows.push(total_row);

        ReportOutput {
            columns: Self::columns(branches),
            rows,
            chart: None,
            summary: Some(vec![
                SummaryItem::currency("Total Income", totals.income),
                SummaryItem::currency("Total Expense", totals.expense),
                SummaryItem::currency("Net Profit", totals.total),
            ]),
        }
    }

    /// Fixed columns followed by one amount column per branch.
    #[must_use]
    pub fn columns(branches: &BranchColumns) -> Vec<ColumnSpec> {
        let mut columns = vec![
            ColumnSpec::link("Account", "account", "Account", 300),
            ColumnSpec::new("Total", "total_amount", FieldType::Currency, 150),
        ];
        columns.extend(branches.iter().map(|column| {
            ColumnSpec::new(
                format!("{} Amount", column.label),
                column.field_id.clone(),
                FieldType::Currency,
                150,
            )
        }));
        columns
    }
}
