//! Report error types.

use chrono::NaiveDate;
use ledgerlens_shared::AppError;
use thiserror::Error;

use super::sources::SourceError;
use crate::rollup::RollupError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A required filter was not supplied.
    #[error("Please select a '{0}' filter")]
    MissingFilter(&'static str),

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The account hierarchy could not be rolled up.
    #[error(transparent)]
    Rollup(#[from] RollupError),

    /// A fetch against the ERP database failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::MissingFilter(_) | ReportError::InvalidDateRange { .. } => {
                Self::Validation(err.to_string())
            }
            ReportError::Rollup(_) => Self::BusinessRule(err.to_string()),
            ReportError::Source(_) => Self::Database(err.to_string()),
        }
    }
}
