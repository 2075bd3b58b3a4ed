//! Purchase order line reads for the purchase order analysis.

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerlens_core::reports::{PurchaseOrderLine, PurchaseOrderQuery, PurchaseOrderSource, SourceError};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, FromQueryResult, Value};
use tracing::debug;

use super::query_error;
use crate::query::SqlQuery;

// Billed quantity sums submitted purchase invoice lines, hence the GROUP BY
const ORDER_LINES_SQL: &str = r#"SELECT po.transaction_date AS date, poi.schedule_date AS required_date, poi.project,
    po.name AS purchase_order, po.status, po.supplier,
    poi.item_code, poi.item_name, poi.description,
    poi.qty, poi.received_qty, COALESCE(SUM(pii.qty), 0) AS billed_qty,
    poi.base_amount, poi.base_rate, poi.billed_amt, po.conversion_rate,
    po.set_warehouse AS warehouse, po.company
FROM "tabPurchase Order" po
JOIN "tabPurchase Order Item" poi ON poi.parent = po.name
LEFT JOIN "tabPurchase Invoice Item" pii ON pii.po_detail = poi.name AND pii.docstatus = 1
WHERE po.status NOT IN ('Stopped', 'Closed') AND po.docstatus = 1"#;

#[derive(Debug, FromQueryResult)]
struct OrderLineRecord {
    date: NaiveDate,
    required_date: Option<NaiveDate>,
    project: Option<String>,
    purchase_order: String,
    status: String,
    supplier: String,
    item_code: String,
    item_name: Option<String>,
    description: Option<String>,
    qty: Decimal,
    received_qty: Decimal,
    billed_qty: Decimal,
    base_amount: Decimal,
    base_rate: Decimal,
    billed_amt: Decimal,
    conversion_rate: Option<Decimal>,
    warehouse: Option<String>,
    company: String,
}

impl From<OrderLineRecord> for PurchaseOrderLine {
    fn from(r: OrderLineRecord) -> Self {
        Self {
            date: r.date,
            required_date: r.required_date,
            project: r.project,
            purchase_order: r.purchase_order,
            status: r.status,
            supplier: r.supplier,
            item_code: r.item_code,
            item_name: r.item_name,
            description: r.description,
            qty: r.qty,
            received_qty: r.received_qty,
            billed_qty: r.billed_qty,
            base_amount: r.base_amount,
            base_rate: r.base_rate,
            billed_amt: r.billed_amt,
            conversion_rate: r.conversion_rate,
            warehouse: r.warehouse,
            company: r.company,
        }
    }
}

/// Reads purchase order lines.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    db: DatabaseConnection,
}

impl PurchaseOrderRepository {
    /// Creates a new purchase order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn order_lines_query(q: &PurchaseOrderQuery) -> SqlQuery {
    let mut query = SqlQuery::new(ORDER_LINES_SQL);

    if let Some(company) = &q.company {
        query.and("po.company = {}", [Value::from(company.as_str())]);
    }
    if let Some(name) = &q.name {
        query.and("po.name = {}", [Value::from(name.as_str())]);
    }
    if let Some((from, to)) = q.period {
        query.and(
            "po.transaction_date BETWEEN {} AND {}",
            [Value::from(from), Value::from(to)],
        );
    }
    query.and_in("po.status", &q.statuses);
    if let Some(project) = &q.project {
        query.and("poi.project = {}", [Value::from(project.as_str())]);
    }

    query.push(" GROUP BY poi.name, po.name ORDER BY po.transaction_date");
    query
}

#[async_trait]
impl PurchaseOrderSource for PurchaseOrderRepository {
    async fn fetch_order_lines(
        &self,
        query: &PurchaseOrderQuery,
    ) -> Result<Vec<PurchaseOrderLine>, SourceError> {
        let records = OrderLineRecord::find_by_statement(order_lines_query(query).build())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        debug!(lines = records.len(), "Fetched purchase order lines");
        Ok(records.into_iter().map(PurchaseOrderLine::from).collect())
    }
}
