//! Rollup data types.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level classification of an account.
///
/// Declaration order is the display order: income accounts are listed
/// before expense accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RootType {
    /// Credit-normal income account.
    Income,
    /// Debit-normal expense account.
    Expense,
}

impl RootType {
    /// Parses the root type stored by the ERP (`"Income"` / `"Expense"`).
    ///
    /// Any other root type (Asset, Liability, Equity) yields `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Returns the ERP spelling of this root type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// Signed contribution of a posting so both root types read positive
    /// on their natural side.
    ///
    /// - Income: credit - debit
    /// - Expense: debit - credit
    #[must_use]
    pub fn signed_amount(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Income => credit - debit,
            Self::Expense => debit - credit,
        }
    }
}

impl fmt::Display for RootType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account as returned by the hierarchy fetch.
///
/// Balances are attached to a private tree node while the rollup runs, so
/// the fetched snapshot itself is never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNode {
    /// Unique account identifier (the ERP account name).
    pub id: String,
    /// Parent account, `None` for roots.
    pub parent_id: Option<String>,
    /// Whether the account groups other accounts.
    pub is_group: bool,
    /// Income or expense.
    pub root_type: RootType,
}

impl AccountNode {
    /// Creates a leaf account.
    #[must_use]
    pub fn leaf(id: impl Into<String>, parent_id: Option<&str>, root_type: RootType) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            is_group: false,
            root_type,
        }
    }

    /// Creates a group account.
    #[must_use]
    pub fn group(id: impl Into<String>, parent_id: Option<&str>, root_type: RootType) -> Self {
        Self {
            is_group: true,
            ..Self::leaf(id, parent_id, root_type)
        }
    }
}

/// Ledger postings for one account, optionally tagged with a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Account the postings were made against.
    pub account_id: String,
    /// Branch tag as stored in the ledger (not normalized).
    pub branch: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

impl LedgerRow {
    /// Creates a ledger row.
    #[must_use]
    pub fn new(
        account_id: impl Into<String>,
        branch: Option<&str>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            branch: branch.map(str::to_string),
            debit,
            credit,
        }
    }
}

/// One account line of the flattened report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollupRow {
    /// Account id.
    pub account: String,
    /// Parent account when it exists in the fetched hierarchy.
    pub parent_account: Option<String>,
    /// Income or expense.
    pub root_type: RootType,
    /// Depth from the root (roots are 0).
    pub indent: usize,
    /// Whether the account is a group.
    pub is_group: bool,
    /// Own postings plus everything rolled up from descendants.
    pub total: Decimal,
    /// Same as `total`, split by normalized branch key.
    pub balances: BTreeMap<String, Decimal>,
}

impl RollupRow {
    /// Returns the balance of a branch, zero when the branch is unknown.
    #[must_use]
    pub fn balance(&self, branch_key: &str) -> Decimal {
        self.balances.get(branch_key).copied().unwrap_or_default()
    }
}

/// Synthetic last row: income leaves minus expense leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TotalsRow {
    /// Sum of income leaf totals.
    pub income: Decimal,
    /// Sum of expense leaf totals.
    pub expense: Decimal,
    /// `income - expense`.
    pub total: Decimal,
    /// `income - expense` per branch key.
    pub balances: BTreeMap<String, Decimal>,
}

impl TotalsRow {
    /// Returns the net amount of a branch, zero when the branch is unknown.
    #[must_use]
    pub fn balance(&self, branch_key: &str) -> Decimal {
        self.balances.get(branch_key).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_root_type_parse() {
        assert_eq!(RootType::parse("Income"), Some(RootType::Income));
        assert_eq!(RootType::parse("EXPENSE"), Some(RootType::Expense));
        assert_eq!(RootType::parse(" expense "), Some(RootType::Expense));
        assert_eq!(RootType::parse("Asset"), None);
        assert_eq!(RootType::parse(""), None);
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(RootType::Income.signed_amount(dec!(30), dec!(100)), dec!(70));
        assert_eq!(RootType::Expense.signed_amount(dec!(100), dec!(30)), dec!(70));
        assert_eq!(RootType::Income.signed_amount(dec!(100), dec!(30)), dec!(-70));
    }

    #[test]
    fn test_income_sorts_before_expense() {
        assert!(RootType::Income < RootType::Expense);
    }
}
