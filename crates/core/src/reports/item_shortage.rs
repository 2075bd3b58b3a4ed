//! Item shortage report: bins projected below zero.

use ledgerlens_shared::ReportSettings;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ReportError;
use super::filters::ShortageFilters;
use super::sources::ShortageSource;
use super::types::{ChartSpec, ColumnSpec, FieldType, ReportOutput, Row, RowBuilder};

/// One stock bin joined with its item and purchase order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortageRow {
    /// Warehouse holding the bin.
    pub warehouse: String,
    /// Item code.
    pub item_code: String,
    /// Quantity on hand.
    pub actual_qty: Decimal,
    /// Quantity on open purchase orders.
    pub ordered_qty: Decimal,
    /// Quantity planned for production.
    pub planned_qty: Decimal,
    /// Quantity reserved for sales orders.
    pub reserved_qty: Decimal,
    /// Quantity reserved for production.
    pub reserved_qty_for_production: Decimal,
    /// Projected quantity (negative for a shortage).
    pub projected_qty: Decimal,
    /// Company owning the warehouse.
    pub company: String,
    /// Item name.
    pub item_name: Option<String>,
    /// Item description.
    pub description: Option<String>,
    /// Item group.
    pub item_group: Option<String>,
    /// Quantity received against the purchase order line.
    pub received_qty: Option<Decimal>,
    /// Quantity returned against the purchase order line.
    pub returned_qty: Option<Decimal>,
}

impl ShortageRow {
    /// Ordered quantity not yet received, net of returns.
    #[must_use]
    pub fn backorder_qty(&self) -> Decimal {
        let received = self.received_qty.unwrap_or_default();
        let returned = self.returned_qty.unwrap_or_default();
        self.ordered_qty - (received - returned)
    }
}

/// Item shortage report.
pub struct ItemShortageReport;

impl ItemShortageReport {
    /// Runs the report.
    pub async fn run<S>(
        filters: &ShortageFilters,
        source: &S,
        settings: &ReportSettings,
    ) -> Result<ReportOutput, ReportError>
    where
        S: ShortageSource + ?Sized,
    {
        let query = filters.validate()?;
        let rows = source.fetch_shortages(&query).await?;

        info!(
            company = %query.company,
            rows = rows.len(),
            "Item shortage report generated"
        );

        Ok(Self::render(rows, settings.chart_limit))
    }

    /// Sorts the rows by projected quantity and renders them with a chart.
    #[must_use]
    pub fn render(mut rows: Vec<ShortageRow>, chart_limit: usize) -> ReportOutput {
        if rows.is_empty() {
            return ReportOutput::empty();
        }

        rows.sort_by(|a, b| a.projected_qty.cmp(&b.projected_qty));

        let chart = ChartSpec::bar(
            "Projected Qty",
            rows.iter().map(|r| (r.item_code.clone(), r.projected_qty)),
            chart_limit,
        );

        ReportOutput {
            columns: Self::columns(),
            rows: rows.iter().map(to_row).collect(),
            chart: Some(chart),
            summary: None,
        }
    }

    /// Column descriptors.
    #[must_use]
    pub fn columns() -> Vec<ColumnSpec> {
        let qty = |label: &str, field: &str| ColumnSpec::new(label, field, FieldType::Float, 120);
        vec![
            ColumnSpec::link("Warehouse", "warehouse", "Warehouse", 150),
            ColumnSpec::link("Item", "item_code", "Item", 150),
            qty("Actual Quantity", "actual_qty"),
            qty("Ordered Quantity", "ordered_qty"),
            qty("Planned Quantity", "planned_qty"),
            qty("Reserved Quantity", "reserved_qty"),
            qty("Reserved Quantity for Production", "reserved_qty_for_production"),
            qty("Projected Quantity", "projected_qty"),
            qty("Received Quantity", "received_qty"),
            qty("Returned Quantity", "returned_qty"),
            qty("Backorder Quantity", "backorder_qty"),
            ColumnSpec::link("Company", "company", "Company", 120),
            ColumnSpec::new("Item Name", "item_name", FieldType::Data, 100),
            ColumnSpec::new("Description", "description", FieldType::Data, 120),
            ColumnSpec::link("Item Group", "item_group", "Item Group", 120),
        ]
    }
}

fn to_row(row: &ShortageRow) -> Row {
    RowBuilder::new()
        .text("warehouse", row.warehouse.as_str())
        .text("item_code", row.item_code.as_str())
        .amount("actual_qty", row.actual_qty)
        .amount("ordered_qty", row.ordered_qty)
        .amount("planned_qty", row.planned_qty)
        .amount("reserved_qty", row.reserved_qty)
        .amount("reserved_qty_for_production", row.reserved_qty_for_production)
        .amount("projected_qty", row.projected_qty)
        .opt_amount("received_qty", row.received_qty)
        .opt_amount("returned_qty", row.returned_qty)
        .amount("backorder_qty", row.backorder_qty())
        .text("company", row.company.as_str())
        .opt_text("item_name", row.item_name.as_deref())
        .opt_text("description", row.description.as_deref())
        .opt_text("item_group", row.item_group.as_deref())
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::sources::MockShortageSource;
    use rust_decimal_macros::dec;

    fn shortage(item_code: &str, projected_qty: Decimal) -> ShortageRow {
        ShortageRow {
            warehouse: "Stores - AC".to_string(),
            item_code: item_code.to_string(),
            actual_qty: dec!(5),
            ordered_qty: dec!(20),
            planned_qty: dec!(0),
            reserved_qty: dec!(30),
            reserved_qty_for_production: dec!(0),
            projected_qty,
            company: "Acme".to_string(),
            item_name: Some(format!("{item_code} name")),
            description: None,
            item_group: Some("Raw Material".to_string()),
            received_qty: Some(dec!(8)),
            returned_qty: Some(dec!(2)),
        }
    }

    #[test]
    fn test_backorder_qty() {
        let row = shortage("BOLT", dec!(-5));
        assert_eq!(row.backorder_qty(), dec!(14));

        let row = ShortageRow {
            received_qty: None,
            returned_qty: None,
            ..shortage("NUT", dec!(-1))
        };
        assert_eq!(row.backorder_qty(), dec!(20));
    }

    #[test]
    fn test_rows_sorted_by_projected_qty() {
        let rows = vec![
            shortage("A", dec!(-1)),
            shortage("B", dec!(-50)),
            shortage("C", dec!(-7)),
        ];
        let output = ItemShortageReport::render(rows, 10);

        let codes: Vec<&str> = output
            .rows
            .iter()
            .map(|r| r["item_code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["B", "C", "A"]);
        assert_eq!(output.rows[0]["backorder_qty"], "14");
        assert_eq!(output.columns.len(), 15);
    }

    #[test]
    fn test_chart_capped_at_limit() {
        let rows = (1..=12)
            .map(|i| shortage(&format!("ITEM-{i:02}"), Decimal::from(-i)))
            .collect();
        let output = ItemShortageReport::render(rows, 10);

        let chart = output.chart.unwrap();
        assert_eq!(chart.data.labels.len(), 10);
        assert_eq!(chart.data.labels[0], "ITEM-12");
        assert_eq!(chart.data.datasets[0].values[0], dec!(-12));
        assert_eq!(output.rows.len(), 12);
    }

    #[test]
    fn test_empty_rows_yield_empty_output() {
        let output = ItemShortageReport::render(vec![], 10);
        assert_eq!(output, ReportOutput::empty());
    }

    #[tokio::test]
    async fn test_missing_company_skips_fetch() {
        let mut source = MockShortageSource::new();
        source.expect_fetch_shortages().never();

        let err = ItemShortageReport::run(&ShortageFilters::default(), &source, &ReportSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingFilter("company")));
    }

    #[tokio::test]
    async fn test_run_passes_lists_to_source() {
        let mut source = MockShortageSource::new();
        source
            .expect_fetch_shortages()
            .times(1)
            .returning(|query| {
                assert_eq!(query.company, "Acme");
                assert_eq!(query.warehouses, vec!["Stores - AC".to_string()]);
                Ok(vec![shortage("BOLT", dec!(-5))])
            });

        let filters = ShortageFilters {
            company: Some("Acme".to_string()),
            warehouse: vec!["Stores - AC".to_string()],
            item_group: vec![],
        };
        let output = ItemShortageReport::run(&filters, &source, &ReportSettings::default())
            .await
            .unwrap();
        assert_eq!(output.rows.len(), 1);
        assert!(output.chart.is_some());
    }
}
