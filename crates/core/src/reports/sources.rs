//! Data sources the reports read from.
//!
//! Each trait is one read-only fetch against the ERP database. The database
//! crate implements them with parameterized SQL; tests substitute mocks.

use async_trait::async_trait;
use thiserror::Error;

use super::filters::{LedgerQuery, PurchaseOrderQuery, SalesInvoiceQuery, ShortageQuery};
use super::item_shortage::ShortageRow;
use super::purchase_order::PurchaseOrderLine;
use super::sales_invoice::OutstandingInvoice;
use crate::rollup::{AccountNode, LedgerRow};

/// Errors raised by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The query failed or returned undecodable rows.
    #[error("Query failed: {0}")]
    Query(String),
}

/// Fetches the Income/Expense account hierarchy of a company.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Returns every Income and Expense account of `company`, unordered.
    async fn fetch_accounts(&self, company: &str) -> Result<Vec<AccountNode>, SourceError>;
}

/// Fetches ledger postings aggregated per account and branch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// Returns debit/credit sums per (account, branch) admitted by `query`.
    async fn fetch_ledger(&self, query: &LedgerQuery) -> Result<Vec<LedgerRow>, SourceError>;
}

/// Fetches stock bins projected below zero.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortageSource: Send + Sync {
    /// Returns shortage rows matching `query`.
    async fn fetch_shortages(&self, query: &ShortageQuery) -> Result<Vec<ShortageRow>, SourceError>;
}

/// Fetches submitted purchase order lines.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurchaseOrderSource: Send + Sync {
    /// Returns order lines matching `query`, ordered by transaction date.
    async fn fetch_order_lines(
        &self,
        query: &PurchaseOrderQuery,
    ) -> Result<Vec<PurchaseOrderLine>, SourceError>;
}

/// Fetches sales invoices joined with customer credit limits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SalesInvoiceSource: Send + Sync {
    /// Returns invoices matching `query`.
    async fn fetch_outstanding(
        &self,
        query: &SalesInvoiceQuery,
    ) -> Result<Vec<OutstandingInvoice>, SourceError>;
}
