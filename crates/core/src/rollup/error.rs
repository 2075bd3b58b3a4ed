//! Rollup error types.

use thiserror::Error;

/// Errors raised while building the account tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollupError {
    /// The parent chain of an account loops back onto itself.
    #[error("Account hierarchy contains a cycle through account {account}")]
    CyclicHierarchy {
        /// An account that lies on the cycle.
        account: String,
    },

    /// The same account id was fetched twice.
    #[error("Duplicate account in hierarchy: {0}")]
    DuplicateAccount(String),
}
