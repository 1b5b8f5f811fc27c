//! Normalization pipeline: rewrites a condition tree into its canonical form.
//!
//! The pipeline runs bottom-up: a node's children are normalized before the
//! node's own stages run, so every stage may assume canonical children.
//!
//! | # | stage | applies to |
//! |---|-------|------------|
//! | 1 | clean empty fields | raw form ([`normalize_raw`]) |
//! | 2 | prune trailing `Pass` | Calldata / AbiEncoded / dynamic Tuple `Matches` |
//! | 3 | pad to match type tree | sibling `Matches` branches, during push-down |
//! | 4 | flatten nested branches | And, Or |
//! | 5 | dedupe children | And, Or, Nor |
//! | 6 | unwrap single child | And, Or (never Nor) |
//! | 7 | push down Or | Or (optional) |
//! | 8 | canonical sort | And, Or, Nor |
//!
//! Normalization is idempotent, and any permutation of a logical group's
//! children normalizes to the same tree.

use std::cmp::Ordering;
use std::collections::HashSet;

use rolescope_core::{Condition, Operator, RawCondition, Result};
use tracing::trace;

use crate::prune::prune_trailing_pass;
use crate::push_down::push_down_or;

/// Knobs for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Run the OR push-down stage.
    pub push_down: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { push_down: true }
    }
}

impl NormalizeOptions {
    pub fn without_push_down() -> Self {
        Self { push_down: false }
    }
}

/// Normalize a condition tree into canonical form.
pub fn normalize(condition: &Condition, options: &NormalizeOptions) -> Result<Condition> {
    let normalized = normalize_node(condition.clone(), options)?;
    trace!(id = %normalized.id(), nodes = normalized.node_count(), "Normalized condition");
    Ok(normalized)
}

/// Clean and validate a raw tree, then normalize it.
pub fn normalize_raw(raw: RawCondition, options: &NormalizeOptions) -> Result<Condition> {
    let condition = Condition::try_from(raw.clean())?;
    normalize(&condition, options)
}

/// Whether two conditions have the same canonical form.
pub fn equivalent(a: &Condition, b: &Condition, options: &NormalizeOptions) -> Result<bool> {
    Ok(normalize(a, options)?.id() == normalize(b, options)?.id())
}

fn normalize_node(condition: Condition, options: &NormalizeOptions) -> Result<Condition> {
    let condition = if condition.is_leaf() {
        condition
    } else {
        let param_type = condition.param_type();
        let operator = condition.operator();
        let children = condition
            .into_children()
            .into_iter()
            .map(|child| normalize_node(child, options))
            .collect::<Result<Vec<_>>>()?;
        Condition::branch(param_type, operator, children)?
    };

    let condition = prune_trailing_pass(condition)?;
    let condition = flatten_nested_branches(condition)?;
    let condition = dedupe_children(condition)?;
    let condition = unwrap_single_branch(condition);

    let condition = if options.push_down && condition.operator() == Operator::Or {
        match push_down_or(&condition, |node| normalize_node(node, options))? {
            Some(rewritten) => rewritten,
            None => condition,
        }
    } else {
        condition
    };

    sort_children(condition)
}

/// Splice children of And/Or nodes that carry the same operator.
pub fn flatten_nested_branches(condition: Condition) -> Result<Condition> {
    let operator = condition.operator();
    if !matches!(operator, Operator::And | Operator::Or)
        || condition.children().iter().all(|c| c.operator() != operator)
    {
        return Ok(condition);
    }

    let children = condition
        .children()
        .iter()
        .flat_map(|child| {
            if child.operator() == operator {
                child.children().to_vec()
            } else {
                vec![child.clone()]
            }
        })
        .collect();
    condition.with_children(children)
}

/// Drop And/Or/Nor children that are identical to an earlier sibling.
pub fn dedupe_children(condition: Condition) -> Result<Condition> {
    if !matches!(condition.operator(), Operator::And | Operator::Or | Operator::Nor) {
        return Ok(condition);
    }

    let mut seen = HashSet::with_capacity(condition.children().len());
    let unique: Vec<Condition> = condition
        .children()
        .iter()
        .filter(|child| seen.insert(child.id()))
        .cloned()
        .collect();
    if unique.len() == condition.children().len() {
        return Ok(condition);
    }
    condition.with_children(unique)
}

/// Collapse a single-child And/Or into that child. Nor is never unwrapped:
/// `Nor(x)` means "x does not hold".
pub fn unwrap_single_branch(condition: Condition) -> Condition {
    if matches!(condition.operator(), Operator::And | Operator::Or) && condition.children().len() == 1 {
        condition.into_children().remove(0)
    } else {
        condition
    }
}

/// Order And/Or/Nor children by content id, whole-call branches first.
pub fn sort_children(condition: Condition) -> Result<Condition> {
    if !matches!(condition.operator(), Operator::And | Operator::Or | Operator::Nor)
        || condition.children().is_sorted_by(|a, b| canonical_order(a, b) != Ordering::Greater)
    {
        return Ok(condition);
    }

    let mut children = condition.children().to_vec();
    children.sort_by(canonical_order);
    condition.with_children(children)
}

fn canonical_order(a: &Condition, b: &Condition) -> Ordering {
    b.is_whole_call()
        .cmp(&a.is_whole_call())
        .then_with(|| a.id().cmp(&b.id()))
}
