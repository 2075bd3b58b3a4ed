//! Core report logic for LedgerLens.
//!
//! This crate contains pure report logic with ZERO web or database dependencies.
//! Data is read through the source traits in [`reports::sources`], which the
//! database crate implements.
//!
//! # Modules
//!
//! - `rollup` - Account tree construction, rollup and flattening
//! - `reports` - Filters, sources and the report assemblers

pub mod reports;
pub mod rollup;
