//! `rolescope diff` — Decide whether a proposed condition needs a write.
//!
//! Two conditions that normalize to the same tree share an id and a
//! deployment address, so replacing one with the other is a no-op.

use std::path::Path;

use rolescope_algebra::{Create2Params, NormalizeOptions, address, normalize};
use rolescope_config::RolescopeConfig;
use rolescope_core::{Condition, ConditionId};

use super::{CommandResult, create2_params, load_condition, normalize_options};

pub fn run(config: &RolescopeConfig, prev: &Path, next: &Path) -> CommandResult {
    let prev = load_condition(prev)?;
    let next = load_condition(next)?;
    let outcome = compare(&prev, &next, &normalize_options(config), &create2_params(config)?)?;

    match outcome {
        Outcome::Same { id } => {
            println!("✅ Equivalent, no write needed");
            println!("   Id: {id}");
        }
        Outcome::Changed {
            prev,
            next,
            address,
        } => {
            println!("⚠️  Condition changed, write needed");
            println!("   Prev:    {prev}");
            println!("   Next:    {next}");
            println!("   Address: {address}");
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Same {
        id: ConditionId,
    },
    Changed {
        prev: ConditionId,
        next: ConditionId,
        address: String,
    },
}

fn compare(
    prev: &Condition,
    next: &Condition,
    options: &NormalizeOptions,
    params: &Create2Params,
) -> CommandResult<Outcome> {
    let prev = normalize(prev, options)?;
    let next = normalize(next, options)?;
    if prev.id() == next.id() {
        return Ok(Outcome::Same { id: next.id() });
    }
    tracing::debug!(prev = %prev.id(), next = %next.id(), "Canonical forms differ");
    Ok(Outcome::Changed {
        prev: prev.id(),
        next: next.id(),
        address: address(&next, params)?.to_checksum(),
    })
}
