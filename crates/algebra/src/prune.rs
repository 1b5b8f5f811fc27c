//! Trailing-`Pass` pruning for positional (`Matches`) nodes.
//!
//! A trailing `Pass` child places no constraint, so dropping it does not
//! change what the node accepts, as long as decoding of the remaining
//! children does not depend on the dropped ones. That holds for whole-call
//! nodes (Calldata, AbiEncoded) and for dynamic tuples. Static tuples are
//! never pruned: every field occupies a fixed word, so their shape is part
//! of the encoding.

use rolescope_core::{Condition, Operator, ParamType, Result};
use tracing::debug;

/// Whether the ABI encoding of `condition`'s region is dynamically sized.
///
/// Tuples (and logical nodes, which take the type of their children) are
/// dynamic if any descendant is.
pub fn is_dynamic(condition: &Condition) -> bool {
    match condition.param_type() {
        ParamType::Dynamic | ParamType::Array | ParamType::Calldata | ParamType::AbiEncoded => true,
        ParamType::Static => false,
        ParamType::Tuple | ParamType::None => condition.children().iter().any(is_dynamic),
    }
}

/// Prune trailing `Pass` children of a Calldata, AbiEncoded or dynamic
/// Tuple `Matches` node. Global allowance children form a tail group that is
/// never pruned and is always placed last.
///
/// Other nodes are returned as-is.
pub fn prune_trailing_pass(condition: Condition) -> Result<Condition> {
    if condition.operator() != Operator::Matches {
        return Ok(condition);
    }
    let dynamic_tuple = condition.param_type() == ParamType::Tuple && is_dynamic(&condition);
    if !condition.is_whole_call() && !dynamic_tuple {
        return Ok(condition);
    }

    let (positional, tail): (Vec<&Condition>, Vec<&Condition>) = condition
        .children()
        .iter()
        .partition(|child| !child.is_global_allowance());

    // The first positional child is always kept; dynamic tuples also keep
    // everything up to their first dynamic field.
    let mut keep = positional.len().min(1);
    if dynamic_tuple {
        if let Some(first_dynamic) = positional.iter().position(|child| is_dynamic(child)) {
            keep = keep.max(first_dynamic + 1);
        }
    }

    let mut end = positional.len();
    while end > keep && positional[end - 1].is_pass() {
        end -= 1;
    }

    let pruned = positional.len() - end;
    let tail_in_place = condition
        .children()
        .iter()
        .rev()
        .take(tail.len())
        .all(Condition::is_global_allowance);
    if pruned == 0 && tail_in_place {
        return Ok(condition);
    }

    debug!(pruned, tail = tail.len(), "Pruned trailing Pass children");
    let children = positional[..end]
        .iter()
        .chain(tail.iter())
        .map(|child| (*child).clone())
        .collect();
    condition.with_children(children)
}
