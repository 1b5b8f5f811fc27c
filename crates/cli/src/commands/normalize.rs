//! `rolescope normalize` — Print the canonical form of a condition.

use std::path::Path;

use rolescope_algebra::{NormalizeOptions, normalize};
use rolescope_config::RolescopeConfig;
use rolescope_core::Condition;

use super::{CommandResult, load_condition, normalize_options, to_json};

pub fn run(config: &RolescopeConfig, file: &Path, no_push_down: bool) -> CommandResult {
    let condition = load_condition(file)?;
    let mut options = normalize_options(config);
    if no_push_down {
        options.push_down = false;
    }
    println!("{}", to_json(&canonicalize(&condition, &options)?)?);
    Ok(())
}

pub(crate) fn canonicalize(condition: &Condition, options: &NormalizeOptions) -> CommandResult<Condition> {
    let canonical = normalize(condition, options)?;
    tracing::debug!(
        before = condition.node_count(),
        after = canonical.node_count(),
        id = %canonical.id(),
        "Normalized"
    );
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{fixtures, parse_condition};
    use rolescope_core::Operator;

    #[test]
    fn push_down_collapses_alternatives() {
        let condition = parse_condition(fixtures::EITHER_TRANSFER).unwrap();
        let canonical = canonicalize(&condition, &NormalizeOptions::default()).unwrap();
        assert_eq!(canonical.operator(), Operator::Matches);
        assert_eq!(canonical.children().len(), 1);
        assert_eq!(canonical.children()[0].operator(), Operator::Or);
    }

    #[test]
    fn without_push_down_keeps_or() {
        let condition = parse_condition(fixtures::EITHER_TRANSFER).unwrap();
        let canonical = canonicalize(&condition, &NormalizeOptions::without_push_down()).unwrap();
        assert_eq!(canonical.operator(), Operator::Or);
        // trailing Pass pruned in the second branch
        assert!(canonical.children().iter().all(|b| b.children().len() == 1));
    }
}
