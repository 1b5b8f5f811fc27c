//! OR push-down: factoring an alternation into the single position where
//! its branches differ.
//!
//! ```text
//! Or(Matches(a, b), Matches(a, c))   =>  Matches(a, Or(b, c))
//! Or(And(x, y, z), And(x, w, z))     =>  And(x, Or(y, w), z)
//! ```
//!
//! The rewrite is only sound when the branches differ in exactly one
//! structural position (the *hinge*). Anything else is left alone.

use std::collections::HashSet;

use rolescope_core::{Condition, ConditionId, Error, Operator, ParamType, Result, Stage};
use tracing::debug;

use crate::pad::pad_to_match;

/// Push an `Or` node's alternation down to its hinge.
///
/// Returns `Ok(None)` when there is no valid hinge. On success the rebuilt
/// node is passed through `normalize_child` before being returned, so that
/// nested structure introduced by the rewrite gets normalized too.
///
/// Calling this with anything but an `Or` of at least two children is an
/// invariant violation.
pub fn push_down_or<F>(condition: &Condition, mut normalize_child: F) -> Result<Option<Condition>>
where
    F: FnMut(Condition) -> Result<Condition>,
{
    if condition.operator() != Operator::Or {
        return Err(Error::invariant(
            Stage::PushDown,
            format!("expected an Or node, got {condition}"),
        ));
    }
    let branches = condition.children();
    if branches.len() < 2 {
        return Err(Error::invariant(
            Stage::PushDown,
            format!("Or must have more than one child, got {condition}"),
        ));
    }

    let first = &branches[0];
    if branches.iter().any(|b| b.param_type() != first.param_type()) {
        debug!("Push-down skipped: mixed param types");
        return Ok(None);
    }
    if first.param_type() == ParamType::Array {
        return Ok(None);
    }
    if branches.iter().any(|b| b.operator() != first.operator()) {
        debug!("Push-down skipped: mixed operators");
        return Ok(None);
    }

    let rebuilt = match first.operator() {
        Operator::Matches => factor_matches(branches)?,
        Operator::And => factor_and(branches)?,
        _ => None,
    };

    rebuilt.map(&mut normalize_child).transpose()
}

/// Positional hinge: every pair of branches must differ at exactly one
/// index, and it must be the same index for all pairs.
fn factor_matches(branches: &[Condition]) -> Result<Option<Condition>> {
    let padded = pad_to_match(branches)?;
    let width = padded[0].children().len();
    if padded.iter().any(|b| b.children().len() != width) {
        return Ok(None);
    }

    let mut hinge = None;
    for (i, a) in padded.iter().enumerate() {
        for b in &padded[i + 1..] {
            let differing: Vec<usize> = a
                .children()
                .iter()
                .zip(b.children())
                .enumerate()
                .filter(|(_, (x, y))| x.id() != y.id())
                .map(|(index, _)| index)
                .collect();
            let &[index] = differing.as_slice() else {
                debug!(positions = differing.len(), "Push-down skipped: branches differ in more than one position");
                return Ok(None);
            };
            match hinge {
                None => hinge = Some(index),
                Some(h) if h == index => {}
                Some(_) => {
                    debug!("Push-down skipped: branch pairs disagree on the hinge");
                    return Ok(None);
                }
            }
        }
    }

    let Some(hinge) = hinge else {
        return Ok(None);
    };
    let template = &padded[0];
    if template.children()[hinge].is_global_allowance() {
        return Ok(None);
    }

    let alternatives = padded.iter().map(|b| b.children()[hinge].clone()).collect();
    let mut children = template.children().to_vec();
    children[hinge] = Condition::branch(ParamType::None, Operator::Or, alternatives)?;
    debug!(hinge, branches = padded.len(), "Pushed Or down into Matches");
    Ok(Some(template.with_children(children)?))
}

/// Set hinge: every branch must have exactly one child that is not shared
/// by all the other branches.
fn factor_and(branches: &[Condition]) -> Result<Option<Condition>> {
    let mut common: HashSet<ConditionId> = branches[0].children().iter().map(Condition::id).collect();
    for branch in &branches[1..] {
        let ids: HashSet<ConditionId> = branch.children().iter().map(Condition::id).collect();
        common.retain(|id| ids.contains(id));
    }

    let mut hinges = Vec::with_capacity(branches.len());
    for branch in branches {
        let unique: Vec<usize> = branch
            .children()
            .iter()
            .enumerate()
            .filter(|(_, child)| !common.contains(&child.id()))
            .map(|(index, _)| index)
            .collect();
        let &[index] = unique.as_slice() else {
            debug!(unique = unique.len(), "Push-down skipped: And branch needs exactly one unique child");
            return Ok(None);
        };
        hinges.push(index);
    }

    let alternatives = branches
        .iter()
        .zip(&hinges)
        .map(|(branch, &index)| branch.children()[index].clone())
        .collect();
    let template = &branches[0];
    let mut children = template.children().to_vec();
    children[hinges[0]] = Condition::branch(ParamType::None, Operator::Or, alternatives)?;
    debug!(branches = branches.len(), "Pushed Or down into And");
    Ok(Some(template.with_children(children)?))
}
