//! Integrity checks: operator/parameter-type compatibility rules that a tree
//! must satisfy before it is deployed.
//!
//! Construction only guarantees structural well-formedness. This module is
//! the stricter boundary check; it reports the first violation together with
//! the child-index path to the offending node (`$` is the root, `$.1.0` is
//! the first child of the second child).

use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{Condition, Operator, ParamType};

const WORD: usize = 32;

/// Check the whole tree, returning the first violation found (pre-order).
pub fn check_integrity(condition: &Condition) -> Result<()> {
    let mut path = vec![];
    check_node(condition, None, &mut path).inspect_err(|e| warn!("Integrity check failed: {e}"))
}

fn check_node(condition: &Condition, parent: Option<&Condition>, path: &mut Vec<usize>) -> Result<()> {
    check_operator(condition).map_err(|reason| Error::Integrity {
        path: render_path(path),
        reason,
    })?;

    if condition.is_global_allowance() {
        let allowed = parent.is_none_or(|p| p.operator() == Operator::Matches && p.is_whole_call());
        if !allowed {
            return Err(Error::Integrity {
                path: render_path(path),
                reason: format!(
                    "{} may only appear at the root or directly below a Calldata/AbiEncoded Matches",
                    condition.operator()
                ),
            });
        }
    }

    for (i, child) in condition.children().iter().enumerate() {
        path.push(i);
        check_node(child, Some(condition), path)?;
        path.pop();
    }
    Ok(())
}

fn check_operator(condition: &Condition) -> std::result::Result<(), String> {
    use ParamType as P;

    let op = condition.operator();
    let pt = condition.param_type();
    let operand = condition.comp_value();

    let expect_types = |allowed: &[ParamType]| {
        if allowed.contains(&pt) {
            Ok(())
        } else {
            Err(format!(
                "{op} cannot scope a {pt} parameter (expected one of {})",
                allowed.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
            ))
        }
    };
    let expect_operand = || match operand {
        Some(_) => Ok(()),
        None => Err(format!("{op} requires a compValue")),
    };
    let expect_word = || match operand {
        Some(bytes) if bytes.len() == WORD => Ok(()),
        Some(bytes) => Err(format!("{op} requires a 32-byte compValue, got {} bytes", bytes.len())),
        None => Err(format!("{op} requires a compValue")),
    };
    let expect_no_operand = || match operand {
        Some(_) => Err(format!("{op} does not take a compValue")),
        None => Ok(()),
    };

    match op {
        Operator::And | Operator::Or | Operator::Nor | Operator::Xor => expect_types(&[P::None]),
        Operator::Matches => expect_types(&[P::Tuple, P::Array, P::Calldata, P::AbiEncoded]),
        Operator::ArraySome | Operator::ArrayEvery => {
            expect_types(&[P::Array])?;
            if condition.children().len() != 1 {
                return Err(format!(
                    "{op} requires exactly one child, got {}",
                    condition.children().len()
                ));
            }
            Ok(())
        }
        Operator::ArraySubset => expect_types(&[P::Array]),
        Operator::Pass => expect_no_operand(),
        Operator::EqualToAvatar => {
            expect_types(&[P::Static])?;
            expect_no_operand()
        }
        Operator::EqualTo => {
            expect_types(&[P::Static, P::Dynamic, P::Tuple, P::Array])?;
            expect_operand()
        }
        Operator::GreaterThan
        | Operator::LessThan
        | Operator::SignedIntGreaterThan
        | Operator::SignedIntLessThan => {
            expect_types(&[P::Static])?;
            expect_word()
        }
        Operator::Bitmask => {
            expect_types(&[P::Static, P::Dynamic])?;
            expect_operand()
        }
        Operator::Custom => expect_operand(),
        Operator::WithinAllowance => {
            expect_types(&[P::Static])?;
            expect_word()
        }
        Operator::EtherWithinAllowance | Operator::CallWithinAllowance => {
            expect_types(&[P::None])?;
            expect_word()
        }
    }
}

fn render_path(path: &[usize]) -> String {
    let mut out = String::from("$");
    for i in path {
        out.push('.');
        out.push_str(&i.to_string());
    }
    out
}
