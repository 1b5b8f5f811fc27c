//! Padding sibling `Matches` branches to a common shape.
//!
//! Pruning makes `Matches(Calldata, a, b)` and `Matches(Calldata, a)` the
//! canonical forms of two branches over the same function, but before their
//! children can be compared position by position they need the same length.
//! The shorter branches are padded with trailing `Pass` nodes typed after the
//! reference branch: the one with the most positional children, ties broken
//! by the smallest content id so the choice does not depend on sibling order.

use rolescope_core::{Condition, Error, Operator, ParamType, Result, Stage};
use tracing::trace;

/// Pad every branch to the positional length of the reference branch.
///
/// All branches must be `Matches` nodes. Global allowance children stay at
/// the end of each branch.
pub fn pad_to_match(branches: &[Condition]) -> Result<Vec<Condition>> {
    if let Some(other) = branches.iter().find(|b| b.operator() != Operator::Matches) {
        return Err(Error::invariant(
            Stage::Pad,
            format!("expected Matches branches, found {other}"),
        ));
    }

    let Some(reference) = branches.iter().max_by(|a, b| {
        positional(a)
            .count()
            .cmp(&positional(b).count())
            .then_with(|| b.id().cmp(&a.id()))
    }) else {
        return Ok(Vec::new());
    };
    let template: Vec<&Condition> = positional(reference).collect();

    branches
        .iter()
        .map(|branch| {
            let own: Vec<&Condition> = positional(branch).collect();
            let own_len = own.len();
            if own_len >= template.len() {
                return Ok(branch.clone());
            }
            trace!(from = own_len, to = template.len(), "Padding Matches branch");
            let children = own
                .into_iter()
                .cloned()
                .chain(
                    template[own_len..]
                        .iter()
                        .map(|slot| Condition::pass(slot_type(slot))),
                )
                .chain(branch.children().iter().filter(|c| c.is_global_allowance()).cloned())
                .collect();
            branch.with_children(children)
        })
        .collect()
}

fn positional(branch: &Condition) -> impl Iterator<Item = &Condition> {
    branch.children().iter().filter(|c| !c.is_global_allowance())
}

/// The ABI type a slot decodes as. Logical nodes carry `None` and take the
/// type of their first child.
fn slot_type(slot: &Condition) -> ParamType {
    match (slot.param_type(), slot.children().first()) {
        (ParamType::None, Some(first)) => slot_type(first),
        (param_type, _) => param_type,
    }
}
