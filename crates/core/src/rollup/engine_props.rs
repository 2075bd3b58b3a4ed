//! Property-based tests for RollupEngine.
//!
//! - Every fetched account is emitted exactly once
//! - A node's total equals its own postings plus its children's totals
//! - Branch balances never exceed the branch-tagged postings they came from
//! - Output does not depend on the order accounts are fetched in

use std::collections::HashMap;

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::branch::BranchColumns;
use super::engine::RollupEngine;
use super::types::{AccountNode, LedgerRow, RollupRow, RootType};

const BRANCHES: [&str; 3] = ["North", "South", "East"];

/// Strategy to generate posting amounts (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn root_type() -> impl Strategy<Value = RootType> {
    prop_oneof![Just(RootType::Income), Just(RootType::Expense)]
}

/// Strategy to generate an acyclic chart: account `i` may only hang below
/// an account with a smaller index.
fn chart() -> impl Strategy<Value = Vec<AccountNode>> {
    prop::collection::vec((any::<prop::sample::Index>(), any::<bool>(), root_type()), 1..25)
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (parent, is_root, root_type))| {
                    let parent_id = if i == 0 || is_root {
                        None
                    } else {
                        Some(format!("ACC-{:03}", parent.index(i)))
                    };
                    AccountNode {
                        id: format!("ACC-{i:03}"),
                        parent_id,
                        // Flagged after generation so every parent is a group
                        is_group: false,
                        root_type,
                    }
                })
                .collect::<Vec<_>>()
        })
        .prop_map(|mut accounts| {
            let parents: Vec<String> = accounts
                .iter()
                .filter_map(|a| a.parent_id.clone())
                .collect();
            for account in &mut accounts {
                account.is_group = parents.contains(&account.id);
            }
            accounts
        })
}

fn chart_with_postings() -> impl Strategy<Value = (Vec<AccountNode>, Vec<LedgerRow>)> {
    chart().prop_flat_map(|accounts| {
        let len = accounts.len();
        let posting = (
            0..len,
            prop::option::of(prop::sample::select(BRANCHES.to_vec())),
            amount(),
            amount(),
        );
        (
            Just(accounts),
            prop::collection::vec(posting, 0..40),
        )
            .prop_map(|(accounts, postings)| {
                let rows = postings
                    .into_iter()
                    .map(|(i, branch, debit, credit)| {
                        LedgerRow::new(accounts[i].id.clone(), branch, debit, credit)
                    })
                    .collect();
                (accounts, rows)
            })
    })
}

fn own_postings(account: &AccountNode, rows: &[LedgerRow]) -> Decimal {
    rows.iter()
        .filter(|row| row.account_id == account.id)
        .map(|row| account.root_type.signed_amount(row.debit, row.credit))
        .sum()
}

fn by_account(rows: &[RollupRow]) -> HashMap<&str, &RollupRow> {
    rows.iter().map(|row| (row.account.as_str(), row)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every account appears once, roots at indent 0, children one deeper.
    #[test]
    fn prop_every_account_emitted_once((accounts, rows) in chart_with_postings()) {
        let branches = BranchColumns::from_ledger(&rows);
        let result = RollupEngine::build(&accounts, &rows, &branches).unwrap();

        prop_assert_eq!(result.rows.len(), accounts.len());

        let emitted = by_account(&result.rows);
        prop_assert_eq!(emitted.len(), accounts.len());

        for row in &result.rows {
            match &row.parent_account {
                None => prop_assert_eq!(row.indent, 0),
                Some(parent) => prop_assert_eq!(row.indent, emitted[parent.as_str()].indent + 1),
            }
        }
    }

    /// A node's total is its own postings plus the totals of its children.
    #[test]
    fn prop_total_is_own_plus_children((accounts, rows) in chart_with_postings()) {
        let branches = BranchColumns::from_ledger(&rows);
        let result = RollupEngine::build(&accounts, &rows, &branches).unwrap();
        let emitted = by_account(&result.rows);

        for account in &accounts {
            let children: Decimal = result
                .rows
                .iter()
                .filter(|row| row.parent_account.as_deref() == Some(account.id.as_str()))
                .map(|row| row.total)
                .sum();

            prop_assert_eq!(
                emitted[account.id.as_str()].total,
                own_postings(account, &rows) + children
            );
        }
    }

    /// Branch balances of a node add up to its branch-tagged share.
    #[test]
    fn prop_branch_balances_partition_tagged_postings((accounts, rows) in chart_with_postings()) {
        let branches = BranchColumns::from_ledger(&rows);
        let result = RollupEngine::build(&accounts, &rows, &branches).unwrap();

        let untagged: Vec<LedgerRow> = rows
            .iter()
            .filter(|row| row.branch.is_none())
            .cloned()
            .collect();
        let untagged_result =
            RollupEngine::build(&accounts, &untagged, &branches).unwrap();
        let untagged_by_account = by_account(&untagged_result.rows);

        for row in &result.rows {
            let branch_sum: Decimal = row.balances.values().copied().sum();
            prop_assert_eq!(
                branch_sum + untagged_by_account[row.account.as_str()].total,
                row.total
            );
        }
    }

    /// Grand total equals income leaves minus expense leaves.
    #[test]
    fn prop_grand_total_from_leaves((accounts, rows) in chart_with_postings()) {
        let branches = BranchColumns::from_ledger(&rows);
        let result = RollupEngine::build(&accounts, &rows, &branches).unwrap();

        let signed: Decimal = result
            .rows
            .iter()
            .filter(|row| !row.is_group)
            .map(|row| match row.root_type {
                RootType::Income => row.total,
                RootType::Expense => -row.total,
            })
            .sum();

        prop_assert_eq!(result.totals.total, signed);
        prop_assert_eq!(result.totals.total, result.totals.income - result.totals.expense);
    }

    /// Reversing the fetch order does not change the output.
    #[test]
    fn prop_fetch_order_irrelevant((accounts, rows) in chart_with_postings()) {
        let branches = BranchColumns::from_ledger(&rows);
        let forward = RollupEngine::build(&accounts, &rows, &branches).unwrap();

        let mut reversed = accounts.clone();
        reversed.reverse();
        let backward = RollupEngine::build(&reversed, &rows, &branches).unwrap();

        prop_assert_eq!(forward, backward);
    }
}
