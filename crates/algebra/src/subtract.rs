//! Subtraction: removing one independently-satisfiable path from a
//! condition.
//!
//! This is push-down in reverse: where push-down factors an alternation into
//! a single hinge, subtraction finds the hinge a fragment differs at and
//! removes that one alternative, leaving everything else in place.

use std::collections::HashSet;

use rolescope_core::{Condition, ConditionId, Operator, ParamType, Result};
use tracing::debug;

use crate::pad::pad_to_match;
use crate::prune::is_dynamic;

/// The outcome of [`subtract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subtraction {
    /// The fragment was not found; the condition stands as it was.
    Unchanged,
    /// The fragment covered the whole condition.
    Empty,
    /// What is left after removing the fragment.
    Remainder(Condition),
}

impl Subtraction {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Subtraction::Unchanged)
    }

    /// The condition that remains, given the original. `None` when the
    /// condition was fully consumed.
    pub fn resolve(self, original: &Condition) -> Option<Condition> {
        match self {
            Subtraction::Unchanged => Some(original.clone()),
            Subtraction::Empty => None,
            Subtraction::Remainder(remainder) => Some(remainder),
        }
    }
}

/// Remove `fragment` from `condition`.
///
/// The remainder keeps `condition`'s child order; normalize it when a
/// canonical form is needed.
pub fn subtract(condition: &Condition, fragment: &Condition) -> Result<Subtraction> {
    if condition.id() == fragment.id() {
        return Ok(Subtraction::Empty);
    }

    let outcome = match (condition.operator(), fragment.operator()) {
        (Operator::Or, Operator::Or) => subtract_branches(condition, fragment)?,
        (Operator::Or, _) => subtract_from_each_branch(condition, fragment)?,
        (Operator::And, Operator::And) => subtract_and_hinge(condition, fragment)?,
        (Operator::Matches, Operator::Matches) => subtract_matches_hinge(condition, fragment)?,
        _ => Subtraction::Unchanged,
    };
    debug!(
        condition = %condition.operator(),
        fragment = %fragment.operator(),
        outcome = outcome_name(&outcome),
        "Subtracted fragment"
    );
    Ok(outcome)
}

/// `Or` minus `Or`: remove every fragment branch, all of which must exist.
fn subtract_branches(condition: &Condition, fragment: &Condition) -> Result<Subtraction> {
    let present: HashSet<ConditionId> = condition.children().iter().map(Condition::id).collect();
    if fragment.children().iter().any(|f| !present.contains(&f.id())) {
        return Ok(Subtraction::Unchanged);
    }

    let removed: HashSet<ConditionId> = fragment.children().iter().map(Condition::id).collect();
    let remaining = condition
        .children()
        .iter()
        .filter(|child| !removed.contains(&child.id()))
        .cloned()
        .collect();
    collapse_or(condition, remaining)
}

/// `Or` minus anything else: subtract from every branch (this reaches
/// nested alternations too).
fn subtract_from_each_branch(condition: &Condition, fragment: &Condition) -> Result<Subtraction> {
    let mut changed = false;
    let mut remaining = Vec::with_capacity(condition.children().len());
    for child in condition.children() {
        match subtract(child, fragment)? {
            Subtraction::Unchanged => remaining.push(child.clone()),
            Subtraction::Empty => changed = true,
            Subtraction::Remainder(rest) => {
                changed = true;
                remaining.push(rest);
            }
        }
    }
    if !changed {
        return Ok(Subtraction::Unchanged);
    }
    collapse_or(condition, remaining)
}

fn collapse_or(condition: &Condition, mut remaining: Vec<Condition>) -> Result<Subtraction> {
    Ok(match remaining.len() {
        0 => Subtraction::Empty,
        1 => Subtraction::Remainder(remaining.remove(0)),
        _ => Subtraction::Remainder(condition.with_children(remaining)?),
    })
}

/// `And` minus `And`: the two must differ in exactly one child each, and
/// the fragment's child must be subtractable from the condition's.
fn subtract_and_hinge(condition: &Condition, fragment: &Condition) -> Result<Subtraction> {
    if !same_shape(condition, fragment) {
        return Ok(Subtraction::Unchanged);
    }

    let condition_ids: HashSet<ConditionId> = condition.children().iter().map(Condition::id).collect();
    let fragment_ids: HashSet<ConditionId> = fragment.children().iter().map(Condition::id).collect();

    let condition_only: Vec<usize> = condition
        .children()
        .iter()
        .enumerate()
        .filter(|(_, child)| !fragment_ids.contains(&child.id()))
        .map(|(index, _)| index)
        .collect();
    let fragment_only: Vec<&Condition> = fragment
        .children()
        .iter()
        .filter(|child| !condition_ids.contains(&child.id()))
        .collect();

    let (&[index], &[part]) = (condition_only.as_slice(), fragment_only.as_slice()) else {
        return Ok(Subtraction::Unchanged);
    };
    replace_at_hinge(condition, index, part)
}

/// `Matches` minus `Matches`: the two must differ at exactly one position.
///
/// Canonical forms of prunable nodes drop trailing `Pass` children, so the
/// shorter side is padded back before positions are compared.
fn subtract_matches_hinge(condition: &Condition, fragment: &Condition) -> Result<Subtraction> {
    if condition.param_type() == fragment.param_type()
        && condition.children().len() != fragment.children().len()
        && is_prunable(condition)
        && is_prunable(fragment)
    {
        let padded = pad_to_match(&[condition.clone(), fragment.clone()])?;
        if let [condition, fragment] = padded.as_slice() {
            return subtract_matches_positions(condition, fragment);
        }
    }
    subtract_matches_positions(condition, fragment)
}

fn subtract_matches_positions(condition: &Condition, fragment: &Condition) -> Result<Subtraction> {
    if !same_shape(condition, fragment) {
        return Ok(Subtraction::Unchanged);
    }

    let differing: Vec<usize> = condition
        .children()
        .iter()
        .zip(fragment.children())
        .enumerate()
        .filter(|(_, (a, b))| a.id() != b.id())
        .map(|(index, _)| index)
        .collect();
    let &[index] = differing.as_slice() else {
        return Ok(Subtraction::Unchanged);
    };
    replace_at_hinge(condition, index, &fragment.children()[index])
}

fn replace_at_hinge(condition: &Condition, index: usize, part: &Condition) -> Result<Subtraction> {
    match subtract(&condition.children()[index], part)? {
        Subtraction::Remainder(rest) => {
            let mut children = condition.children().to_vec();
            children[index] = rest;
            Ok(Subtraction::Remainder(condition.with_children(children)?))
        }
        Subtraction::Empty | Subtraction::Unchanged => Ok(Subtraction::Unchanged),
    }
}

/// Whether trailing `Pass` children of this `Matches` node are pruned.
fn is_prunable(condition: &Condition) -> bool {
    condition.is_whole_call() || (condition.param_type() == ParamType::Tuple && is_dynamic(condition))
}

fn same_shape(a: &Condition, b: &Condition) -> bool {
    a.operator() == b.operator()
        && a.param_type() == b.param_type()
        && a.children().len() == b.children().len()
}

fn outcome_name(outcome: &Subtraction) -> &'static str {
    match outcome {
        Subtraction::Unchanged => "unchanged",
        Subtraction::Empty => "empty",
        Subtraction::Remainder(_) => "remainder",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn sub(condition: &Condition, fragment: &Condition) -> Subtraction {
        subtract(condition, fragment).unwrap()
    }

    #[test]
    fn exact_match_is_empty() {
        assert_eq!(sub(&c(1), &c(1)), Subtraction::Empty);
        let tree = calldata(vec![c(1), c(2)]);
        assert_eq!(sub(&tree, &tree.clone()), Subtraction::Empty);
    }

    #[test]
    fn remove_one_alternative() {
        let out = sub(&or(vec![c(1), c(2), c(3)]), &c(2));
        assert_eq!(out, Subtraction::Remainder(or(vec![c(1), c(3)])));
    }

    #[test]
    fn remove_to_single_alternative_unwraps() {
        assert_eq!(sub(&or(vec![c(1), c(2)]), &c(2)), Subtraction::Remainder(c(1)));
    }

    #[test]
    fn remove_last_alternative_is_empty() {
        assert_eq!(sub(&or(vec![c(1)]), &c(1)), Subtraction::Empty);
    }

    #[test]
    fn absent_fragment_unchanged() {
        assert!(sub(&or(vec![c(1), c(2)]), &c(3)).is_unchanged());
        assert!(sub(&c(1), &c(2)).is_unchanged());
        assert!(sub(&and(vec![c(1), c(2)]), &or(vec![c(1), c(2)])).is_unchanged());
    }

    #[test]
    fn or_minus_or() {
        let condition = or(vec![c(1), c(2), c(3), c(4)]);
        let out = sub(&condition, &or(vec![c(4), c(2)]));
        assert_eq!(out, Subtraction::Remainder(or(vec![c(1), c(3)])));

        // Every fragment branch must be present.
        assert!(sub(&condition, &or(vec![c(2), c(9)])).is_unchanged());

        assert_eq!(sub(&or(vec![c(1), c(2), c(3)]), &or(vec![c(1), c(3)])), Subtraction::Remainder(c(2)));
    }

    #[test]
    fn nested_or_reached_transitively() {
        let condition = or(vec![c(1), and(vec![c(2), or(vec![c(3), c(4)])])]);
        let out = sub(&condition, &and(vec![c(2), c(3)]));
        assert_eq!(out, Subtraction::Remainder(or(vec![c(1), and(vec![c(2), c(4)])])));
    }

    #[test]
    fn and_hinge_keeps_order() {
        let condition = and(vec![c(1), or(vec![c(2), c(10)]), c(3)]);
        let out = sub(&condition, &and(vec![c(3), c(1), c(2)]));
        assert_eq!(out, Subtraction::Remainder(and(vec![c(1), c(10), c(3)])));
    }

    #[test]
    fn and_hinge_requires_single_difference() {
        let condition = and(vec![c(1), or(vec![c(2), c(10)]), or(vec![c(3), c(11)])]);
        assert!(sub(&condition, &and(vec![c(1), c(2), c(3)])).is_unchanged());

        // Different arity.
        let condition = and(vec![c(1), or(vec![c(2), c(10)])]);
        assert!(sub(&condition, &and(vec![c(1), c(2), c(3)])).is_unchanged());
    }

    #[test]
    fn and_hinge_aborts_when_child_fully_consumed() {
        let condition = and(vec![c(1), c(2)]);
        assert!(sub(&condition, &and(vec![c(1), c(3)])).is_unchanged());
    }

    #[test]
    fn matches_hinge() {
        let condition = calldata(vec![c(1), or(vec![c(2), c(3)])]);
        let out = sub(&condition, &calldata(vec![c(1), c(3)]));
        assert_eq!(out, Subtraction::Remainder(calldata(vec![c(1), c(2)])));
    }

    #[test]
    fn matches_hinge_mismatch_unchanged() {
        let condition = calldata(vec![c(1), or(vec![c(2), c(3)])]);
        assert!(sub(&condition, &calldata(vec![c(5), c(3)])).is_unchanged());
        assert!(sub(&condition, &calldata(vec![c(1)])).is_unchanged());
        assert!(sub(&condition, &tuple(vec![c(1), c(3)])).is_unchanged());
    }

    #[test]
    fn matches_hinge_pads_pruned_fragment() {
        let condition = calldata(vec![c(1), or(vec![c(3), pass()])]);
        let out = sub(&condition, &calldata(vec![c(1)]));
        assert_eq!(out, Subtraction::Remainder(calldata(vec![c(1), c(3)])));
    }

    #[test]
    fn static_tuple_is_not_padded() {
        let condition = tuple(vec![c(1), or(vec![c(3), pass()])]);
        assert!(sub(&condition, &tuple(vec![c(1)])).is_unchanged());
    }

    #[test]
    fn resolve_outcomes() {
        let original = or(vec![c(1), c(2)]);
        assert_eq!(Subtraction::Unchanged.resolve(&original), Some(original.clone()));
        assert_eq!(Subtraction::Empty.resolve(&original), None);
        assert_eq!(Subtraction::Remainder(c(1)).resolve(&original), Some(c(1)));
    }
}
