//! Shared fixtures for unit tests.

use rolescope_core::{Condition, Operator, ParamType};

/// A 32-byte big-endian word holding `n`.
pub fn word(n: u8) -> Vec<u8> {
    let mut bytes = vec![0u8; 32];
    bytes[31] = n;
    bytes
}

/// `EqualTo<Static>(n)`, the stand-in for an arbitrary distinct leaf `C<n>`.
pub fn c(n: u8) -> Condition {
    Condition::leaf(ParamType::Static, Operator::EqualTo, Some(word(n))).unwrap()
}

/// `EqualTo<Dynamic>(n)`.
pub fn dynamic(n: u8) -> Condition {
    Condition::leaf(ParamType::Dynamic, Operator::EqualTo, Some(word(n))).unwrap()
}

pub fn pass() -> Condition {
    Condition::pass(ParamType::Static)
}

pub fn allowance(n: u8) -> Condition {
    Condition::leaf(ParamType::None, Operator::CallWithinAllowance, Some(word(n))).unwrap()
}

pub fn calldata(children: Vec<Condition>) -> Condition {
    Condition::branch(ParamType::Calldata, Operator::Matches, children).unwrap()
}

pub fn tuple(children: Vec<Condition>) -> Condition {
    Condition::branch(ParamType::Tuple, Operator::Matches, children).unwrap()
}

pub fn and(children: Vec<Condition>) -> Condition {
    Condition::branch(ParamType::None, Operator::And, children).unwrap()
}

pub fn or(children: Vec<Condition>) -> Condition {
    Condition::branch(ParamType::None, Operator::Or, children).unwrap()
}

pub fn nor(children: Vec<Condition>) -> Condition {
    Condition::branch(ParamType::None, Operator::Nor, children).unwrap()
}
