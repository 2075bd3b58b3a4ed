//! Stock bin reads for the item shortage report.

use async_trait::async_trait;
use ledgerlens_core::reports::{ShortageQuery, ShortageRow, ShortageSource, SourceError};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, FromQueryResult, Value};
use tracing::debug;

use super::query_error;
use crate::query::SqlQuery;

const SHORTAGE_SQL: &str = r#"SELECT bin.warehouse, bin.item_code, bin.actual_qty, bin.ordered_qty, bin.planned_qty,
    bin.reserved_qty, bin.reserved_qty_for_production, bin.projected_qty,
    wh.company, item.item_name, item.description, item.item_group,
    poi.received_qty, poi.returned_qty
FROM "tabBin" bin
LEFT JOIN "tabWarehouse" wh ON wh.name = bin.warehouse
LEFT JOIN "tabItem" item ON item.name = bin.item_code
LEFT JOIN "tabPurchase Order Item" poi ON poi.item_code = bin.item_code
LEFT JOIN "tabPurchase Order" po ON po.name = poi.parent
WHERE item.disabled = 0 AND bin.projected_qty < 0 AND po.docstatus = 1"#;

#[derive(Debug, FromQueryResult)]
struct ShortageRecord {
    warehouse: String,
    item_code: String,
    actual_qty: Decimal,
    ordered_qty: Decimal,
    planned_qty: Decimal,
    reserved_qty: Decimal,
    reserved_qty_for_production: Decimal,
    projected_qty: Decimal,
    company: Option<String>,
    item_name: Option<String>,
    description: Option<String>,
    item_group: Option<String>,
    received_qty: Option<Decimal>,
    returned_qty: Option<Decimal>,
}

impl From<ShortageRecord> for ShortageRow {
    fn from(r: ShortageRecord) -> Self {
        Self {
            warehouse: r.warehouse,
            item_code: r.item_code,
            actual_qty: r.actual_qty,
            ordered_qty: r.ordered_qty,
            planned_qty: r.planned_qty,
            reserved_qty: r.reserved_qty,
            reserved_qty_for_production: r.reserved_qty_for_production,
            projected_qty: r.projected_qty,
            company: r.company.unwrap_or_default(),
            item_name: r.item_name,
            description: r.description,
            item_group: r.item_group,
            received_qty: r.received_qty,
            returned_qty: r.returned_qty,
        }
    }
}

/// Reads stock bins.
#[derive(Debug, Clone)]
pub struct StockRepository {
    db: DatabaseConnection,
}

impl StockRepository {
    /// Creates a new stock repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn shortage_query(q: &ShortageQuery) -> SqlQuery {
    let mut query = SqlQuery::new(SHORTAGE_SQL);
    query
        .and("wh.company = {}", [Value::from(q.company.as_str())])
        .and_in("bin.warehouse", &q.warehouses)
        .and_in("item.item_group", &q.item_groups)
        .push(" ORDER BY bin.projected_qty");
    query
}

#[async_trait]
impl ShortageSource for StockRepository {
    async fn fetch_shortages(&self, query: &ShortageQuery) -> Result<Vec<ShortageRow>, SourceError> {
        let records = ShortageRecord::find_by_statement(shortage_query(query).build())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        debug!(company = %query.company, rows = records.len(), "Fetched shortage bins");
        Ok(records.into_iter().map(ShortageRow::from).collect())
    }
}
