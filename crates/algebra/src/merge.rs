//! Merging alternative permissions into one canonical condition.

use rolescope_core::{Condition, Error, Operator, ParamType, Result, Stage};
use tracing::info;

use crate::normalize::{NormalizeOptions, normalize};

/// Combine N alternative conditions (typically the same function permission
/// allowed with different argument values) into one canonical condition.
///
/// The variants are joined in an `Or` and normalized, so variants that
/// differ in a single slot collapse into one condition with an `Or` only at
/// that slot.
pub fn merge_alternatives(variants: Vec<Condition>, options: &NormalizeOptions) -> Result<Condition> {
    if variants.is_empty() {
        return Err(Error::invariant(Stage::Merge, "no variants to merge"));
    }
    let count = variants.len();
    let merged = normalize(
        &Condition::branch(ParamType::None, Operator::Or, variants)?,
        options,
    )?;
    info!(variants = count, operator = %merged.operator(), "Merged alternatives");
    Ok(merged)
}
