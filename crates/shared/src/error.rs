//! Application-wide error types.

use thiserror::Error;

/// Errors surfaced to report consumers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing report filters.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The ERP data breaks a rule the report depends on, such as a
    /// cyclic account hierarchy.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// A read against the ERP database failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Database(_) => 500,
        }
    }

    /// Machine-readable code used in API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
