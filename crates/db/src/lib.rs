//! Database layer for LedgerLens.
//!
//! This crate provides:
//! - Parameterized SQL construction for the ERP's tables
//! - Repository implementations of the report source traits
//! - Connection pool setup

pub mod query;
pub mod repositories;

pub use repositories::{
    LedgerRepository, PurchaseOrderRepository, SalesInvoiceRepository, StockRepository,
};

use std::time::Duration;

use ledgerlens_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the ERP database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
