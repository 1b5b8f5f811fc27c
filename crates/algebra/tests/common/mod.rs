//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use rolescope_core::{Condition, Operator, ParamType};

pub fn word(n: u8) -> Vec<u8> {
    let mut bytes = vec![0u8; 32];
    bytes[31] = n;
    bytes
}

/// An arbitrary distinct static leaf `C<n>`.
pub fn c(n: u8) -> Condition {
    Condition::leaf(ParamType::Static, Operator::EqualTo, Some(word(n))).unwrap()
}

pub fn dynamic(n: u8) -> Condition {
    Condition::leaf(ParamType::Dynamic, Operator::EqualTo, Some(word(n))).unwrap()
}

pub fn pass() -> Condition {
    Condition::pass(ParamType::Static)
}

pub fn matches(param_type: ParamType, children: Vec<Condition>) -> Condition {
    Condition::branch(param_type, Operator::Matches, children).unwrap()
}

pub fn calldata(children: Vec<Condition>) -> Condition {
    matches(ParamType::Calldata, children)
}

pub fn tuple(children: Vec<Condition>) -> Condition {
    matches(ParamType::Tuple, children)
}

pub fn logical(operator: Operator, children: Vec<Condition>) -> Condition {
    Condition::branch(ParamType::None, operator, children).unwrap()
}

pub fn and(children: Vec<Condition>) -> Condition {
    logical(Operator::And, children)
}

pub fn or(children: Vec<Condition>) -> Condition {
    logical(Operator::Or, children)
}

pub fn nor(children: Vec<Condition>) -> Condition {
    logical(Operator::Nor, children)
}

/// Every permutation of `items` (Heap's algorithm).
pub fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    fn heap<T: Clone>(k: usize, items: &mut Vec<T>, out: &mut Vec<Vec<T>>) {
        if k <= 1 {
            out.push(items.clone());
            return;
        }
        for i in 0..k {
            heap(k - 1, items, out);
            if k % 2 == 0 {
                items.swap(i, k - 1);
            } else {
                items.swap(0, k - 1);
            }
        }
    }
    let mut items = items.to_vec();
    let mut out = Vec::new();
    heap(items.len(), &mut items, &mut out);
    out
}

/// A corpus of trees covering every normalization stage.
pub fn corpus() -> Vec<Condition> {
    vec![
        and(vec![c(0), and(vec![c(1), and(vec![c(2)])])]),
        and(vec![c(0), c(0), c(1)]),
        or(vec![calldata(vec![c(1), c(2)]), calldata(vec![c(1), c(3)])]),
        or(vec![and(vec![c(1), c(2), c(3)]), and(vec![c(1), c(10), c(3)])]),
        or(vec![and(vec![c(1), c(2), c(3)]), and(vec![c(1), c(2), c(3), c(4)])]),
        calldata(vec![c(1), pass(), pass()]),
        calldata(vec![tuple(vec![c(1), pass(), pass()]), pass()]),
        nor(vec![c(1)]),
        or(vec![
            calldata(vec![c(1), tuple(vec![c(2), c(3)]), pass()]),
            calldata(vec![c(1), tuple(vec![c(2), c(4)])]),
            calldata(vec![c(1), tuple(vec![c(2), c(5)]), pass()]),
        ]),
        or(vec![calldata(vec![c(1)]), calldata(vec![c(1), dynamic(3)])]),
        and(vec![or(vec![c(4), or(vec![c(5), c(6)])]), nor(vec![c(7), c(7)]), c(8)]),
        or(vec![calldata(vec![c(1), c(2)]), and(vec![c(3), c(4)]), c(9)]),
    ]
}
