//! Rollup engine: tree construction, post-order summation and flattening.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::debug;

use super::branch::{BranchColumns, normalize_branch};
use super::error::RollupError;
use super::types::{AccountNode, LedgerRow, RollupRow, RootType, TotalsRow};

/// Output of a rollup: display-ordered rows plus the synthesized totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollupResult {
    /// Account rows in display order.
    pub rows: Vec<RollupRow>,
    /// Income minus expense over the emitted leaf rows.
    pub totals: TotalsRow,
}

/// Stateless engine for the income and expense account tree.
pub struct RollupEngine;

impl RollupEngine {
    /// Builds the flattened, rolled-up account tree.
    ///
    /// Sibling order is income before expense, then account id. Ledger rows
    /// for unknown accounts are dropped; branches outside `branches` count
    /// towards the account total only.
    ///
    /// # Errors
    ///
    /// Returns `RollupError::DuplicateAccount` when an id appears twice and
    /// `RollupError::CyclicHierarchy` when a parent chain loops.
    pub fn build(
        accounts: &[AccountNode],
        ledger_rows: &[LedgerRow],
        branches: &BranchColumns,
    ) -> Result<RollupResult, RollupError> {
        let mut tree = AccountTree::new(accounts, branches)?;
        tree.post_ledger(ledger_rows);
        tree.roll_up()?;

        let rows = tree.flatten();
        let totals = leaf_totals(&rows, branches);

        Ok(RollupResult { rows, totals })
    }
}

// Internal node tracking balances during one rollup
struct TreeNode {
    account: AccountNode,
    parent: Option<usize>,
    children: Vec<usize>,
    total: Decimal,
    balances: BTreeMap<String, Decimal>,
}

struct AccountTree {
    nodes: Vec<TreeNode>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
}

impl AccountTree {
    fn new(accounts: &[AccountNode], branches: &BranchColumns) -> Result<Self, RollupError> {
        let zero_balances: BTreeMap<String, Decimal> = branches
            .keys()
            .map(|key| (key.to_string(), Decimal::ZERO))
            .collect();

        let mut index = HashMap::with_capacity(accounts.len());
        for (i, account) in accounts.iter().enumerate() {
            if index.insert(account.id.clone(), i).is_some() {
                return Err(RollupError::DuplicateAccount(account.id.clone()));
            }
        }

        let mut nodes: Vec<TreeNode> = accounts
            .iter()
            .map(|account| TreeNode {
                account: account.clone(),
                parent: account
                    .parent_id
                    .as_deref()
                    .and_then(|parent| index.get(parent).copied()),
                children: Vec::new(),
                total: Decimal::ZERO,
                balances: zero_balances.clone(),
            })
            .collect();

        // Orphans (parent missing from the fetched set) become roots
        let mut roots = Vec::new();
        for i in 0..nodes.len() {
            match nodes[i].parent {
                Some(parent) => nodes[parent].children.push(i),
                None => roots.push(i),
            }
        }

        let sort_key = |nodes: &[TreeNode], i: usize| -> (RootType, String) {
            (nodes[i].account.root_type, nodes[i].account.id.clone())
        };
        roots.sort_by_cached_key(|&i| sort_key(&nodes, i));
        for i in 0..nodes.len() {
            let mut children = std::mem::take(&mut nodes[i].children);
            children.sort_by_cached_key(|&c| sort_key(&nodes, c));
            nodes[i].children = children;
        }

        Ok(Self {
            nodes,
            index,
            roots,
        })
    }

    fn post_ledger(&mut self, ledger_rows: &[LedgerRow]) {
        let mut dropped = 0usize;

        for row in ledger_rows {
            let Some(&i) = self.index.get(&row.account_id) else {
                dropped += 1;
                continue;
            };

            let node = &mut self.nodes[i];
            let amount = node.account.root_type.signed_amount(row.debit, row.credit);
            node.total += amount;

            if let Some(key) = row.branch.as_deref().and_then(normalize_branch)
                && let Some(balance) = node.balances.get_mut(&key)
            {
                *balance += amount;
            }
        }

        if dropped > 0 {
            debug!(dropped, "Ignored ledger rows for accounts outside the hierarchy");
        }
    }

    fn roll_up(&mut self) -> Result<(), RollupError> {
        let mut on_path = vec![false; self.nodes.len()];
        let mut visited = vec![false; self.nodes.len()];

        for &root in &self.roots {
            roll_up_node(&mut self.nodes, root, &mut on_path, &mut visited)?;
        }

        // Members of a pure cycle never hang below a root
        if visited.iter().any(|v| !v) {
            return Err(RollupError::CyclicHierarchy {
                account: self.find_cycle_member(&visited),
            });
        }

        Ok(())
    }

    fn find_cycle_member(&self, visited: &[bool]) -> String {
        let start = (0..self.nodes.len())
            .filter(|&i| !visited[i])
            .min_by(|&a, &b| self.nodes[a].account.id.cmp(&self.nodes[b].account.id));

        let Some(mut current) = start else {
            return String::new();
        };

        // Walk up until a node repeats; everything from there on is the cycle
        let mut seen = HashSet::new();
        while seen.insert(current) {
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let mut member = current;
        let mut cursor = current;
        loop {
            if self.nodes[cursor].account.id < self.nodes[member].account.id {
                member = cursor;
            }
            match self.nodes[cursor].parent {
                Some(parent) if parent != current => cursor = parent,
                _ => break,
            }
        }

        self.nodes[member].account.id.clone()
    }

    fn flatten(&self) -> Vec<RollupRow> {
        let mut rows = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            emit_rows(&self.nodes, root, 0, &mut rows);
        }
        rows
    }
}

fn roll_up_node(
    nodes: &mut [TreeNode],
    i: usize,
    on_path: &mut [bool],
    visited: &mut [bool],
) -> Result<(), RollupError> {
    if on_path[i] {
        return Err(RollupError::CyclicHierarchy {
            account: nodes[i].account.id.clone(),
        });
    }
    on_path[i] = true;

    let children = nodes[i].children.clone();
    for child in children {
        roll_up_node(nodes, child, on_path, visited)?;

        let child_total = nodes[child].total;
        let child_balances = nodes[child].balances.clone();

        let parent = &mut nodes[i];
        parent.total += child_total;
        for (key, amount) in child_balances {
            *parent.balances.entry(key).or_default() += amount;
        }
    }

    on_path[i] = false;
    visited[i] = true;
    Ok(())
}

fn emit_rows(nodes: &[TreeNode], i: usize, indent: usize, rows: &mut Vec<RollupRow>) {
    let node = &nodes[i];
    rows.push(RollupRow {
        account: node.account.id.clone(),
        parent_account: node.parent.map(|p| nodes[p].account.id.clone()),
        root_type: node.account.root_type,
        indent,
        is_group: node.account.is_group,
        total: node.total,
        balances: node.balances.clone(),
    });

    for &child in &node.children {
        emit_rows(nodes, child, indent + 1, rows);
    }
}

/// Income leaves minus expense leaves, per branch and overall.
fn leaf_totals(rows: &[RollupRow], branches: &BranchColumns) -> TotalsRow {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut balances: BTreeMap<String, Decimal> = branches
        .keys()
        .map(|key| (key.to_string(), Decimal::ZERO))
        .collect();

    for row in rows.iter().filter(|row| !row.is_group) {
        let sign = match row.root_type {
            RootType::Income => {
                income += row.total;
                Decimal::ONE
            }
            RootType::Expense => {
                expense += row.total;
                Decimal::NEGATIVE_ONE
            }
        };

        for (key, net) in &mut balances {
            *net += sign * row.balance(key);
        }
    }

    TotalsRow {
        income,
        expense,
        total: income - expense,
        balances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn chart() -> Vec<AccountNode> {
        vec![
            AccountNode::group("Expenses", None, RootType::Expense),
            AccountNode::group("Direct Expenses", Some("Expenses"), RootType::Expense),
            AccountNode::leaf("Cost of Goods Sold", Some("Direct Expenses"), RootType::Expense),
            AccountNode::leaf("Rent", Some("Expenses"), RootType::Expense),
            AccountNode::group("Income", None, RootType::Income),
            AccountNode::leaf("Sales", Some("Income"), RootType::Income),
            AccountNode::leaf("Service", Some("Income"), RootType::Income),
        ]
    }

    fn ids(rows: &[RollupRow]) -> Vec<(&str, usize)> {
        rows.iter().map(|r| (r.account.as_str(), r.indent)).collect()
    }

    #[test]
    fn test_empty_ledger_yields_zero_totals() {
        let branches = BranchColumns::new(["North"]);
        let result = RollupEngine::build(&chart(), &[], &branches).unwrap();

        assert!(result.rows.iter().all(|r| r.total.is_zero()));
        assert_eq!(result.totals.total, Decimal::ZERO);
        assert_eq!(result.totals.balance("north"), Decimal::ZERO);
    }

    #[test]
    fn test_no_accounts_and_no_rows() {
        let result = RollupEngine::build(&[], &[], &BranchColumns::default()).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.totals, TotalsRow::default());
    }

    #[rstest]
    #[case(RootType::Income, dec!(30), dec!(100), dec!(70))]
    #[case(RootType::Expense, dec!(100), dec!(30), dec!(70))]
    #[case(RootType::Income, dec!(100), dec!(0), dec!(-100))]
    fn test_sign_convention(
        #[case] root_type: RootType,
        #[case] debit: Decimal,
        #[case] credit: Decimal,
        #[case] expected: Decimal,
    ) {
        let accounts = vec![AccountNode::leaf("A", None, root_type)];
        let rows = vec![LedgerRow::new("A", None, debit, credit)];
        let result = RollupEngine::build(&accounts, &rows, &BranchColumns::default()).unwrap();

        assert_eq!(result.rows[0].total, expected);
    }

    #[test]
    fn test_display_order_and_indent() {
        let result = RollupEngine::build(&chart(), &[], &BranchColumns::default()).unwrap();

        assert_eq!(
            ids(&result.rows),
            vec![
                ("Income", 0),
                ("Sales", 1),
                ("Service", 1),
                ("Expenses", 0),
                ("Direct Expenses", 1),
                ("Cost of Goods Sold", 2),
                ("Rent", 1),
            ]
        );
        assert_eq!(result.rows[1].parent_account.as_deref(), Some("Income"));
        assert_eq!(result.rows[0].parent_account, None);
    }

    #[test]
    fn test_income_before_expense_among_siblings() {
        let accounts = vec![
            AccountNode::group("All", None, RootType::Income),
            AccountNode::leaf("A Expense", Some("All"), RootType::Expense),
            AccountNode::leaf("Z Income", Some("All"), RootType::Income),
        ];
        let result = RollupEngine::build(&accounts, &[], &BranchColumns::default()).unwrap();
        assert_eq!(
            ids(&result.rows),
            vec![("All", 0), ("Z Income", 1), ("A Expense", 1)]
        );
    }

    #[test]
    fn test_group_total_includes_own_postings_and_descendants() {
        let rows = vec![
            LedgerRow::new("Cost of Goods Sold", None, dec!(120), dec!(0)),
            LedgerRow::new("Direct Expenses", None, dec!(5), dec!(0)),
            LedgerRow::new("Rent", None, dec!(50), dec!(10)),
        ];
        let result = RollupEngine::build(&chart(), &rows, &BranchColumns::default()).unwrap();
        let find = |id: &str| result.rows.iter().find(|r| r.account == id).unwrap().total;

        assert_eq!(find("Direct Expenses"), dec!(125));
        assert_eq!(find("Expenses"), dec!(165));
        assert_eq!(find("Rent"), dec!(40));
    }

    #[test]
    fn test_branch_scoped_totals() {
        let branches = BranchColumns::new(["North", "South"]);
        let rows = vec![
            LedgerRow::new("Sales", Some("North"), dec!(0), dec!(40)),
            LedgerRow::new("Sales", Some("South"), dec!(0), dec!(60)),
        ];
        let result = RollupEngine::build(&chart(), &rows, &branches).unwrap();
        let sales = result.rows.iter().find(|r| r.account == "Sales").unwrap();

        assert_eq!(sales.balance("north"), dec!(40));
        assert_eq!(sales.balance("south"), dec!(60));
        assert_eq!(sales.total, dec!(100));

        let income = result.rows.iter().find(|r| r.account == "Income").unwrap();
        assert_eq!(income.balance("north"), dec!(40));
        assert_eq!(income.total, dec!(100));
    }

    #[test]
    fn test_unknown_branch_counts_towards_total_only() {
        let branches = BranchColumns::new(["North"]);
        let rows = vec![LedgerRow::new("Sales", Some("West"), dec!(0), dec!(25))];
        let result = RollupEngine::build(&chart(), &rows, &branches).unwrap();
        let sales = result.rows.iter().find(|r| r.account == "Sales").unwrap();

        assert_eq!(sales.total, dec!(25));
        assert_eq!(sales.balance("north"), Decimal::ZERO);
        assert!(!sales.balances.contains_key("west"));
    }

    #[test]
    fn test_grand_total_is_income_minus_expense() {
        let branches = BranchColumns::new(["North", "South"]);
        let rows = vec![
            LedgerRow::new("Sales", Some("North"), dec!(0), dec!(300)),
            LedgerRow::new("Service", Some("South"), dec!(0), dec!(200)),
            LedgerRow::new("Rent", Some("North"), dec!(150), dec!(0)),
            LedgerRow::new("Cost of Goods Sold", Some("South"), dec!(50), dec!(0)),
        ];
        let result = RollupEngine::build(&chart(), &rows, &branches).unwrap();

        assert_eq!(result.totals.income, dec!(500));
        assert_eq!(result.totals.expense, dec!(200));
        assert_eq!(result.totals.total, dec!(300));
        assert_eq!(result.totals.balance("north"), dec!(150));
        assert_eq!(result.totals.balance("south"), dec!(150));
    }

    #[test]
    fn test_group_postings_excluded_from_leaf_totals() {
        let rows = vec![
            LedgerRow::new("Income", None, dec!(0), dec!(999)),
            LedgerRow::new("Sales", None, dec!(0), dec!(10)),
        ];
        let result = RollupEngine::build(&chart(), &rows, &BranchColumns::default()).unwrap();

        assert_eq!(result.totals.income, dec!(10));
        assert_eq!(result.totals.total, dec!(10));
    }

    #[test]
    fn test_unknown_accounts_are_dropped() {
        let rows = vec![
            LedgerRow::new("Ghost", None, dec!(0), dec!(100)),
            LedgerRow::new("Sales", None, dec!(0), dec!(10)),
        ];
        let result = RollupEngine::build(&chart(), &rows, &BranchColumns::default()).unwrap();
        assert_eq!(result.totals.total, dec!(10));
        assert!(result.rows.iter().all(|r| r.account != "Ghost"));
    }

    #[test]
    fn test_orphan_is_treated_as_root() {
        let accounts = vec![
            AccountNode::group("Income", None, RootType::Income),
            AccountNode::leaf("Commission", Some("Missing Parent"), RootType::Income),
        ];
        let rows = vec![LedgerRow::new("Commission", None, dec!(0), dec!(80))];
        let result = RollupEngine::build(&accounts, &rows, &BranchColumns::default()).unwrap();

        assert_eq!(ids(&result.rows), vec![("Commission", 0), ("Income", 0)]);
        assert_eq!(result.rows[0].parent_account, None);
        assert_eq!(result.totals.total, dec!(80));
    }

    #[test]
    fn test_two_node_cycle_is_rejected() {
        let accounts = vec![
            AccountNode::group("A", Some("B"), RootType::Income),
            AccountNode::group("B", Some("A"), RootType::Income),
        ];
        let err = RollupEngine::build(&accounts, &[], &BranchColumns::default()).unwrap_err();
        assert_eq!(
            err,
            RollupError::CyclicHierarchy {
                account: "A".to_string()
            }
        );
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let accounts = vec![
            AccountNode::group("Income", None, RootType::Income),
            AccountNode::group("Loop", Some("Loop"), RootType::Income),
        ];
        let err = RollupEngine::build(&accounts, &[], &BranchColumns::default()).unwrap_err();
        assert_eq!(
            err,
            RollupError::CyclicHierarchy {
                account: "Loop".to_string()
            }
        );
    }

    #[test]
    fn test_cycle_below_valid_tree_reports_cycle_member() {
        let accounts = vec![
            AccountNode::group("Income", None, RootType::Income),
            AccountNode::leaf("Hanging", Some("Y"), RootType::Income),
            AccountNode::group("X", Some("Z"), RootType::Income),
            AccountNode::group("Y", Some("X"), RootType::Income),
            AccountNode::group("Z", Some("Y"), RootType::Income),
        ];
        let err = RollupEngine::build(&accounts, &[], &BranchColumns::default()).unwrap_err();
        assert_eq!(
            err,
            RollupError::CyclicHierarchy {
                account: "X".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_account_is_rejected() {
        let accounts = vec![
            AccountNode::leaf("Sales", None, RootType::Income),
            AccountNode::leaf("Sales", None, RootType::Income),
        ];
        let err = RollupEngine::build(&accounts, &[], &BranchColumns::default()).unwrap_err();
        assert_eq!(err, RollupError::DuplicateAccount("Sales".to_string()));
    }

    #[test]
    fn test_build_is_idempotent() {
        let branches = BranchColumns::new(["North"]);
        let rows = vec![
            LedgerRow::new("Sales", Some("North"), dec!(0), dec!(40)),
            LedgerRow::new("Rent", None, dec!(15), dec!(0)),
        ];
        let accounts = chart();

        let first = RollupEngine::build(&accounts, &rows, &branches).unwrap();
        let second = RollupEngine::build(&accounts, &rows, &branches).unwrap();
        assert_eq!(first, second);
    }
}
