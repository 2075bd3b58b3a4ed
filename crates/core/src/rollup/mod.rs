//! Account rollup engine.
//!
//! Builds the income and expense account tree for one report execution:
//! - Signed ledger postings per account and branch
//! - Post-order summation of children into their parents
//! - Display-ordered flattening with indent levels
//! - A synthesized totals row (income minus expense)

pub mod branch;
pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use branch::{BranchColumn, BranchColumns, normalize_branch};
pub use engine::{RollupEngine, RollupResult};
pub use error::RollupError;
pub use types::{AccountNode, LedgerRow, RollupRow, RootType, TotalsRow};
