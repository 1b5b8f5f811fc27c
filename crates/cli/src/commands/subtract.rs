//! `rolescope subtract` — Remove a fragment from a condition.

use std::path::Path;

use rolescope_algebra::{NormalizeOptions, Subtraction, normalize, subtract};
use rolescope_config::RolescopeConfig;
use rolescope_core::Condition;

use super::{CommandResult, load_condition, normalize_options, to_json};

pub fn run(config: &RolescopeConfig, condition: &Path, fragment: &Path) -> CommandResult {
    let condition = load_condition(condition)?;
    let fragment = load_condition(fragment)?;
    println!("{}", render(&condition, &fragment, &normalize_options(config))?);
    Ok(())
}

/// Subtract on canonical forms and render the outcome: the remainder as
/// canonical JSON, `empty`, or `unchanged`.
fn render(condition: &Condition, fragment: &Condition, options: &NormalizeOptions) -> CommandResult<String> {
    let condition = normalize(condition, options)?;
    let fragment = normalize(fragment, options)?;
    let rendered = match subtract(&condition, &fragment)? {
        Subtraction::Unchanged => "unchanged".to_string(),
        Subtraction::Empty => "empty".to_string(),
        Subtraction::Remainder(remainder) => to_json(&normalize(&remainder, options)?)?,
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{fixtures, parse_condition};

    #[test]
    fn removes_one_alternative() {
        let either = parse_condition(fixtures::EITHER_TRANSFER).unwrap();
        let two = parse_condition(fixtures::TRANSFER_TO_TWO).unwrap();
        let out = render(&either, &two, &NormalizeOptions::default()).unwrap();

        let remainder = parse_condition(&out).unwrap();
        let one = parse_condition(fixtures::TRANSFER_TO_ONE).unwrap();
        assert_eq!(remainder, normalize(&one, &NormalizeOptions::default()).unwrap());
    }

    #[test]
    fn whole_condition_is_empty() {
        let one = parse_condition(fixtures::TRANSFER_TO_ONE).unwrap();
        assert_eq!(render(&one, &one, &NormalizeOptions::default()).unwrap(), "empty");
    }

    #[test]
    fn absent_fragment_is_unchanged() {
        let one = parse_condition(fixtures::TRANSFER_TO_ONE).unwrap();
        let two = parse_condition(fixtures::TRANSFER_TO_TWO).unwrap();
        assert_eq!(render(&one, &two, &NormalizeOptions::default()).unwrap(), "unchanged");
    }
}
