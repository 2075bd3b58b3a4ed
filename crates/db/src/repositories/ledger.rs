//! Chart of accounts and general ledger reads for the income and expenses
//! report.

use async_trait::async_trait;
use chrono::Datelike;
use ledgerlens_core::reports::{AccountSource, Frequency, LedgerQuery, LedgerSource, SourceError};
use ledgerlens_core::rollup::{AccountNode, LedgerRow, RootType};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, FromQueryResult, Value};
use tracing::debug;

use super::query_error;
use crate::query::SqlQuery;

const ACCOUNTS_SQL: &str = r#"SELECT a.name AS account, a.parent_account, (a.is_group = 1) AS is_group, a.root_type
FROM "tabAccount" a
WHERE a.root_type IN ('Income', 'Expense')"#;

const LEDGER_SQL: &str = r#"SELECT gle.account, gle.branch, COALESCE(SUM(gle.debit), 0) AS debit, COALESCE(SUM(gle.credit), 0) AS credit
FROM "tabGL Entry" gle
JOIN "tabAccount" a ON gle.account = a.name
WHERE a.root_type IN ('Income', 'Expense')"#;

#[derive(Debug, FromQueryResult)]
struct AccountRecord {
    account: String,
    parent_account: Option<String>,
    is_group: bool,
    root_type: String,
}

#[derive(Debug, FromQueryResult)]
struct LedgerRecord {
    account: String,
    branch: Option<String>,
    debit: Decimal,
    credit: Decimal,
}

/// Reads accounts and aggregated GL entries.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn accounts_query(company: &str) -> SqlQuery {
    let mut query = SqlQuery::new(ACCOUNTS_SQL);
    query.and("a.company = {}", [Value::from(company)]);
    query
}

pub(crate) fn ledger_query(q: &LedgerQuery) -> SqlQuery {
    let mut query = SqlQuery::new(LEDGER_SQL);
    query
        .and("gle.company = {}", [Value::from(q.company.as_str())])
        .and(
            "gle.posting_date BETWEEN {} AND {}",
            [Value::from(q.from_date), Value::from(q.to_date)],
        );

    match q.frequency {
        Some(Frequency::Monthly) => {
            let month = i32::try_from(q.from_date.month()).unwrap_or_default();
            query.and("EXTRACT(MONTH FROM gle.posting_date) = {}", [Value::from(month)]);
        }
        Some(Frequency::Yearly) => {
            query.and("EXTRACT(YEAR FROM gle.posting_date) = {}", [Value::from(q.from_date.year())]);
        }
        None => {}
    }

    if let Some(branch) = &q.branch {
        query.and("LOWER(TRIM(gle.branch)) = LOWER(TRIM({}))", [Value::from(branch.as_str())]);
    }

    query.push(" GROUP BY gle.account, gle.branch");
    query
}

#[async_trait]
impl AccountSource for LedgerRepository {
    async fn fetch_accounts(&self, company: &str) -> Result<Vec<AccountNode>, SourceError> {
        let records = AccountRecord::find_by_statement(accounts_query(company).build())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let fetched = records.len();
        let accounts: Vec<AccountNode> = records
            .into_iter()
            .filter_map(|record| {
                RootType::parse(&record.root_type).map(|root_type| AccountNode {
                    id: record.account,
                    parent_id: record.parent_account.filter(|p| !p.is_empty()),
                    is_group: record.is_group,
                    root_type,
                })
            })
            .collect();

        debug!(company, fetched, kept = accounts.len(), "Fetched account hierarchy");
        Ok(accounts)
    }
}

#[async_trait]
impl LedgerSource for LedgerRepository {
    async fn fetch_ledger(&self, query: &LedgerQuery) -> Result<Vec<LedgerRow>, SourceError> {
        let records = LedgerRecord::find_by_statement(ledger_query(query).build())
            .all(&self.db)
            .await
            .map_err(query_error)?;

        debug!(company = %query.company, rows = records.len(), "Fetched ledger aggregates");

        Ok(records
            .into_iter()
            .map(|record| LedgerRow {
                account_id: record.account,
                branch: record.branch,
                debit: record.debit,
                credit: record.credit,
            })
            .collect())
    }
}
