//! Repository implementations of the report sources.
//!
//! Repositories read the ERP's tables through parameterized statements,
//! hiding the `SeaORM` details from the report logic.

pub mod ledger;
pub mod purchasing;
pub mod sales;
pub mod stock;

pub use ledger::LedgerRepository;
pub use purchasing::PurchaseOrderRepository;
pub use sales::SalesInvoiceRepository;
pub use stock::StockRepository;

use ledgerlens_core::reports::SourceError;
use sea_orm::DbErr;
use tracing::error;

pub(crate) fn query_error(err: DbErr) -> SourceError {
    error!(error = %err, "Report query failed");
    SourceError::Query(err.to_string())
}
