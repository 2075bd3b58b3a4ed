//! ERP business-intelligence reports.
//!
//! Each report validates its filters, reads through a source trait and
//! renders a `ReportOutput`:
//! - Income and Expenses (account rollup with per-branch columns)
//! - Item Shortage
//! - Purchase Order Analysis
//! - Outstanding Sales Invoices

pub mod error;
pub mod filters;
pub mod income_expense;
pub mod item_shortage;
pub mod purchase_order;
pub mod sales_invoice;
pub mod sources;
pub mod types;


pub use error::ReportError;
pub use filters::{
    Frequency, IncomeExpenseFilters, LedgerQuery, PurchaseOrderFilters, PurchaseOrderGrouping,
    PurchaseOrderQuery, SalesInvoiceFilters, SalesInvoiceQuery, ShortageFilters, ShortageQuery,
};
pub use income_expense::IncomeExpenseReport;
pub use item_shortage::{ItemShortageReport, ShortageRow};
pub use purchase_order::{PurchaseOrderLine, PurchaseOrderReport};
pub use sales_invoice::{OutstandingInvoice, SalesInvoiceReport};
pub use sources::{
    AccountSource, LedgerSource, PurchaseOrderSource, SalesInvoiceSource, ShortageSource, SourceError,
};
pub use types::*;
