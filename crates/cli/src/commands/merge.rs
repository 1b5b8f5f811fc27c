//! `rolescope merge` — Merge alternative conditions into one.

use std::path::PathBuf;

use rolescope_algebra::merge_alternatives;
use rolescope_config::RolescopeConfig;

use super::{CommandResult, load_condition, normalize_options, to_json};

pub fn run(config: &RolescopeConfig, files: &[PathBuf]) -> CommandResult {
    let variants = files
        .iter()
        .map(|file| load_condition(file))
        .collect::<CommandResult<Vec<_>>>()?;
    let merged = merge_alternatives(variants, &normalize_options(config))?;
    println!("{}", to_json(&merged)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use rolescope_core::Operator;

    #[test]
    fn merges_files() {
        let dir = tempfile::tempdir().unwrap();
        let one = dir.path().join("one.json");
        let two = dir.path().join("two.json");
        std::fs::write(&one, fixtures::TRANSFER_TO_ONE).unwrap();
        std::fs::write(&two, fixtures::TRANSFER_TO_TWO).unwrap();

        let variants = [one, two]
            .iter()
            .map(|f| load_condition(f))
            .collect::<CommandResult<Vec<_>>>()
            .unwrap();
        let merged = merge_alternatives(variants, &normalize_options(&RolescopeConfig::default())).unwrap();
        assert_eq!(merged.operator(), Operator::Matches);
        assert_eq!(merged.children()[0].operator(), Operator::Or);
    }
}
