//! Sales invoice reads for the outstanding sales invoice report.

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerlens_core::reports::{OutstandingInvoice, SalesInvoiceQuery, SalesInvoiceSource, SourceError};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, FromQueryResult, Value};
use tracing::debug;

use super::query_error;
use crate::query::SqlQuery;

const OUTSTANDING_SQL: &str = r#"SELECT si.customer, si.category, si.name, si.due_date, si.outstanding_amount,
    ccl.category AS credit_category, ccl.credit_limit_amount, CAST(ccl.credit_days AS BIGINT) AS credit_days
FROM "tabSales Invoice" si
LEFT JOIN "tabCustomer Credit Limit Custom" ccl ON si.customer = ccl.parent AND si.category = ccl.category
WHERE si.docstatus = 1 AND si.outstanding_amount > 0"#;

#[derive(Debug, FromQueryResult)]
struct InvoiceRecord {
    customer: String,
    category: Option<String>,
    name: String,
    due_date: Option<NaiveDate>,
    outstanding_amount: Decimal,
    credit_category: Option<String>,
    credit_limit_amount: Option<Decimal>,
    credit_days: Option<i64>,
}

impl From<InvoiceRecord> for OutstandingInvoice {
    fn from(r: InvoiceRecord) -> Self {
        Self {
            customer: r.customer,
            category: r.category,
            name: r.name,
            due_date: r.due_date,
            outstanding_amount: r.outstanding_amount,
            credit_category: r.credit_category,
            credit_limit_amount: r.credit_limit_amount,
            credit_days: r.credit_days,
        }
    }
}

/// Reads submitted sales invoices with an unpaid balance.
#[derive(Debug, Clone)]
pub struct SalesInvoiceRepository {
    db: DatabaseConnection,
}

impl SalesInvoiceRepository {
    /// Creates a new sales invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn outstanding_query(q: &SalesInvoiceQuery) -> SqlQuery {
    let mut query = SqlQuery::new(OUTSTANDING_SQL);

    if let Some(from) = q.from_date {
        query.and("si.posting_date >= {}", [Value::from(from)]);
    }
    if let Some(to) = q.to_date {
        query.and("si.posting_date <= {}", [Value::from(to)]);
    }
    if let Some(customer) = &q.customer {
        query.and("si.customer = {}", [Value::from(customer.as_str())]);
    }

    query.push(" ORDER BY si.posting_date, si.name");
    query
}

#[async_trait]
impl SalesInvoiceSource for SalesInvoiceRepository {
    async fn fetch_outstanding(
        &self,
        query: &SalesInvoiceQuery,
    ) -> Result<Vec<OutstandingInvoice>, SourceError> {
        let records = InvoiceRecord::find_by_statement(outstanding_query(query).build())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        debug!(invoices = records.len(), "Fetched outstanding sales invoices");
        Ok(records.into_iter().map(OutstandingInvoice::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::placeholder_count;

    #[test]
    fn test_customer_is_bound_not_interpolated() {
        let sql = outstanding_query(&SalesInvoiceQuery {
            from_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            to_date: None,
            customer: Some("O'Brien & Sons".to_string()),
            as_of: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        });

        assert_eq!(sql.values().len(), 2);
        assert_eq!(placeholder_count(sql.sql()), 2);
        assert!(sql.sql().contains("si.customer = $2"));
        assert!(!sql.sql().contains("O'Brien"));
    }
}
