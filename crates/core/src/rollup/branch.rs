//! Per-branch report columns.
//!
//! The set of branches is computed once per execution and threaded through
//! both column generation and row population, so headers and values always
//! line up.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::types::LedgerRow;

/// Normalizes a branch name into its key: trimmed and lowercased.
///
/// Blank names are treated as "no branch".
#[must_use]
pub fn normalize_branch(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// One dynamically generated branch column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchColumn {
    /// Normalized branch key.
    pub key: String,
    /// Branch name as first seen in the ledger.
    pub label: String,
    /// Field id of the amount column (`"<slug>_amount"`).
    pub field_id: String,
}

/// Ordered list of branch columns, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BranchColumns {
    columns: Vec<BranchColumn>,
}

impl BranchColumns {
    /// Builds the column list from raw branch names.
    ///
    /// Case variants collapse into one column labelled with the first
    /// spelling seen.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: BTreeMap<String, String> = BTreeMap::new();
        for name in names {
            let name = name.as_ref();
            if let Some(key) = normalize_branch(name) {
                labels
                    .entry(key)
                    .or_insert_with(|| name.trim().to_string());
            }
        }

        let mut used_ids = HashSet::new();
        let columns = labels
            .into_iter()
            .map(|(key, label)| {
                let field_id = unique_field_id(&key, &mut used_ids);
                BranchColumn {
                    key,
                    label,
                    field_id,
                }
            })
            .collect();

        Self { columns }
    }

    /// Builds the column list from the branches observed in ledger rows.
    #[must_use]
    pub fn from_ledger(rows: &[LedgerRow]) -> Self {
        Self::new(rows.iter().filter_map(|row| row.branch.as_deref()))
    }

    /// Iterates columns in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, BranchColumn> {
        self.columns.iter()
    }

    /// Iterates normalized branch keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    /// Returns the column for a normalized key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&BranchColumn> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Number of branch columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no branch was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a BranchColumns {
    type Item = &'a BranchColumn;
    type IntoIter = std::slice::Iter<'a, BranchColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

fn unique_field_id(key: &str, used: &mut HashSet<String>) -> String {
    let slug: String = key
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    let mut candidate = format!("{slug}_amount");
    let mut suffix = 2;
    while used.contains(&candidate) {
        candidate = format!("{slug}_{suffix}_amount");
        suffix += 1;
    }
    used.insert(candidate.clone());
    candidate
}
