//! Purchase order analysis: ordered, received and billed quantities and
//! amounts per order line, optionally grouped by supplier or item.

use std::ops::AddAssign;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ReportError;
use super::filters::{PurchaseOrderFilters, PurchaseOrderGrouping};
use super::sources::PurchaseOrderSource;
use super::types::{ColumnSpec, FieldType, ReportOutput, Row, RowBuilder};

/// One submitted purchase order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// Order transaction date.
    pub date: NaiveDate,
    /// Required-by date of the line.
    pub required_date: Option<NaiveDate>,
    /// Project of the line.
    pub project: Option<String>,
    /// Purchase order id.
    pub purchase_order: String,
    /// Order status.
    pub status: String,
    /// Supplier.
    pub supplier: String,
    /// Item code.
    pub item_code: String,
    /// Item name.
    pub item_name: Option<String>,
    /// Item description.
    pub description: Option<String>,
    /// Ordered quantity.
    pub qty: Decimal,
    /// Received quantity.
    pub received_qty: Decimal,
    /// Quantity on submitted purchase invoices.
    pub billed_qty: Decimal,
    /// Line amount in company currency.
    pub base_amount: Decimal,
    /// Line rate in company currency.
    pub base_rate: Decimal,
    /// Billed amount in order currency.
    pub billed_amt: Decimal,
    /// Order-to-company currency rate.
    pub conversion_rate: Option<Decimal>,
    /// Default warehouse of the order.
    pub warehouse: Option<String>,
    /// Company placing the order.
    pub company: String,
}

/// Quantities and amounts derived from an order line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineFigures {
    /// Ordered quantity.
    pub qty: Decimal,
    /// Received quantity.
    pub received_qty: Decimal,
    /// `qty - received_qty`.
    pub pending_qty: Decimal,
    /// Billed quantity.
    pub billed_qty: Decimal,
    /// `qty - billed_qty`.
    pub qty_to_bill: Decimal,
    /// Line amount in company currency.
    pub amount: Decimal,
    /// `billed_amt * conversion_rate`.
    pub billed_amount: Decimal,
    /// `amount - billed_amount`.
    pub pending_amount: Decimal,
    /// `received_qty * base_rate`.
    pub received_qty_amount: Decimal,
}

impl PurchaseOrderLine {
    /// Derives the report figures of this line.
    #[must_use]
    pub fn figures(&self) -> LineFigures {
        let billed_amount = self.billed_amt * self.conversion_rate.unwrap_or(Decimal::ONE);
        LineFigures {
            qty: self.qty,
            received_qty: self.received_qty,
            pending_qty: self.qty - self.received_qty,
            billed_qty: self.billed_qty,
            qty_to_bill: self.qty - self.billed_qty,
            amount: self.base_amount,
            billed_amount,
            pending_amount: self.base_amount - billed_amount,
            received_qty_amount: self.received_qty * self.base_rate,
        }
    }
}

impl AddAssign for LineFigures {
    fn add_assign(&mut self, rhs: Self) {
        self.qty += rhs.qty;
        self.received_qty += rhs.received_qty;
        self.pending_qty += rhs.pending_qty;
        self.billed_qty += rhs.billed_qty;
        self.qty_to_bill += rhs.qty_to_bill;
        self.amount += rhs.amount;
        self.billed_amount += rhs.billed_amount;
        self.pending_amount += rhs.pending_amount;
        self.received_qty_amount += rhs.received_qty_amount;
    }
}

/// Purchase order analysis report.
pub struct PurchaseOrderReport;

impl PurchaseOrderReport {
    /// Runs the report. An entirely empty filter set yields empty output
    /// without querying.
    pub async fn run<S>(filters: &PurchaseOrderFilters, source: &S) -> Result<ReportOutput, ReportError>
    where
        S: PurchaseOrderSource + ?Sized,
    {
        let Some(query) = filters.validate()? else {
            return Ok(ReportOutput::empty());
        };

        let lines = source.fetch_order_lines(&query).await?;

        info!(
            company = query.company.as_deref().unwrap_or("*"),
            lines = lines.len(),
            grouping = ?query.grouping,
            "Purchase order analysis generated"
        );

        Ok(Self::render(&lines, query.grouping))
    }

    /// Renders order lines with the requested grouping.
    #[must_use]
    pub fn render(lines: &[PurchaseOrderLine], grouping: PurchaseOrderGrouping) -> ReportOutput {
        if lines.is_empty() {
            return ReportOutput::empty();
        }

        let rows: Vec<Row> = match grouping {
            PurchaseOrderGrouping::None => lines.iter().map(|line| detail_row(line, None).build()).collect(),
            PurchaseOrderGrouping::Supplier => group_by_supplier(lines),
            PurchaseOrderGrouping::ItemCode => group_by_item_code(lines),
        };

        ReportOutput::new(Self::columns(), rows)
    }

    /// Column descriptors.
    #[must_use]
    pub fn columns() -> Vec<ColumnSpec> {
        let qty = |label: &str, field: &str, width| ColumnSpec::new(label, field, FieldType::Float, width);
        let money = |label: &str, field: &str, width| ColumnSpec::new(label, field, FieldType::Currency, width);
        vec![
            ColumnSpec::new("Date", "date", FieldType::Date, 90),
            ColumnSpec::new("Required By", "required_date", FieldType::Date, 90),
            ColumnSpec::link("Project", "project", "Project", 130),
            ColumnSpec::link("Purchase Order", "purchase_order", "Purchase Order", 160),
            ColumnSpec::new("Status", "status", FieldType::Data, 130),
            ColumnSpec::link("Supplier", "supplier", "Supplier", 130),
            ColumnSpec::link("Item Code", "item_code", "Item", 100),
            ColumnSpec::new("Item Name", "item_name", FieldType::Data, 120),
            ColumnSpec::new("Description", "description", FieldType::Data, 120),
            qty("Qty", "qty", 120),
            qty("Received Qty", "received_qty", 120),
            qty("Pending Qty", "pending_qty", 80),
            qty("Billed Qty", "billed_qty", 80),
            qty("Qty to Bill", "qty_to_bill", 80),
            money("Amount", "amount", 110),
            money("Billed Amount", "billed_amount", 110),
            money("Pending Amount", "pending_amount", 130),
            money("Received Qty Amount", "received_qty_amount", 130),
            ColumnSpec::link("Warehouse", "warehouse", "Warehouse", 100),
            ColumnSpec::link("Company", "company", "Company", 100),
        ]
    }
}

/// Detail row of one line; `supplier` overrides the line's supplier.
fn detail_row(line: &PurchaseOrderLine, supplier: Option<&str>) -> RowBuilder {
    let figures = line.figures();
    RowBuilder::new()
        .date("date", Some(line.date))
        .date("required_date", line.required_date)
        .opt_text("project", line.project.as_deref())
        .text("purchase_order", line.purchase_order.as_str())
        .text("status", line.status.as_str())
        .text("supplier", supplier.unwrap_or(&line.supplier))
        .text("item_code", line.item_code.as_str())
        .opt_text("item_name", line.item_name.as_deref())
        .opt_text("description", line.description.as_deref())
        .amount("qty", figures.qty)
        .amount("received_qty", figures.received_qty)
        .amount("pending_qty", figures.pending_qty)
        .amount("billed_qty", figures.billed_qty)
        .amount("qty_to_bill", figures.qty_to_bill)
        .amount("amount", figures.amount)
        .amount("billed_amount", figures.billed_amount)
        .amount("pending_amount", figures.pending_amount)
        .amount("received_qty_amount", figures.received_qty_amount)
        .opt_text("warehouse", line.warehouse.as_deref())
        .text("company", line.company.as_str())
}

/// Total row of one item code; carries the eight summed figures.
fn item_total_row(item_code: &str, lines: &[&PurchaseOrderLine]) -> RowBuilder {
    let mut total = LineFigures::default();
    for line in lines {
        total += line.figures();
    }

    RowBuilder::new()
        .text("item_code", format!("{item_code} (Total)"))
        .amount("qty", total.qty)
        .amount("received_qty", total.received_qty)
        .amount("pending_qty", total.pending_qty)
        .amount("billed_qty", total.billed_qty)
        .amount("amount", total.amount)
        .amount("billed_amount", total.billed_amount)
        .amount("pending_amount", total.pending_amount)
        .amount("received_qty_amount", total.received_qty_amount)
        .flag("is_bold", true)
}

fn group_by_supplier(lines: &[PurchaseOrderLine]) -> Vec<Row> {
    let mut rows = Vec::new();

    for (supplier, supplier_lines) in group_first_seen(lines.iter(), |line| line.supplier.as_str()) {
        rows.push(
            RowBuilder::new()
                .text("supplier", supplier)
                .text("item_code", "Supplier")
                .build(),
        );

        for (item_code, item_lines) in group_first_seen(supplier_lines.into_iter(), |line| line.item_code.as_str()) {
            rows.extend(item_lines.iter().map(|line| detail_row(line, Some("")).build()));
            rows.push(item_total_row(item_code, &item_lines).text("supplier", "").build());
        }
    }

    rows
}

fn group_by_item_code(lines: &[PurchaseOrderLine]) -> Vec<Row> {
    let mut rows = Vec::new();

    for (item_code, item_lines) in group_first_seen(lines.iter(), |line| line.item_code.as_str()) {
        rows.extend(
            item_lines
                .iter()
                .map(|line| detail_row(line, None).flag("is_bold", false).build()),
        );
        rows.push(item_total_row(item_code, &item_lines).build());
    }

    rows
}

/// Groups items by key, keeping groups and members in first-seen order.
fn group_first_seen<'a, I, F>(items: I, key: F) -> Vec<(&'a str, Vec<&'a PurchaseOrderLine>)>
where
    I: Iterator<Item = &'a PurchaseOrderLine>,
    F: Fn(&'a PurchaseOrderLine) -> &'a str,
{
    let mut groups: Vec<(&str, Vec<&PurchaseOrderLine>)> = Vec::new();
    for item in items {
        let k = key(item);
        match groups.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, members)) => members.push(item),
            None => groups.push((k, vec![item])),
        }
    }
    groups
}
