//! Content identifiers: a structural SHA-256 tree hash.
//!
//! `id(leaf) = H(0x00, paramType, operator, len(compValue), compValue)`
//! `id(node) = H(0x01, paramType, operator, n, id(child_0), …, id(child_n-1))`
//!
//! Child order is hashed as-is. Canonical ordering of logical groups happens
//! in normalization, which is what makes equivalent And/Or trees hash
//! identically.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::model::Condition;

const LEAF_TAG: u8 = 0x00;
const NODE_TAG: u8 = 0x01;

/// A 256-bit content identifier. Ordering is that of unsigned big-endian
/// integers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionId([u8; 32]);

impl ConditionId {
    /// Compute the identifier of `condition`. Children use their memoized ids.
    pub(crate) fn of(condition: &Condition) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([
            if condition.is_leaf() { LEAF_TAG } else { NODE_TAG },
            condition.param_type().code(),
            condition.operator().code(),
        ]);
        if condition.is_leaf() {
            match condition.comp_value() {
                Some(bytes) => {
                    hasher.update((bytes.len() as u64).to_be_bytes());
                    hasher.update(bytes);
                }
                None => hasher.update(0u64.to_be_bytes()),
            }
        } else {
            let children = condition.children();
            hasher.update((children.len() as u64).to_be_bytes());
            for child in children {
                hasher.update(child.id().0);
            }
        }
        Self(hasher.finalize().into())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConditionId({}…)", &hex::encode(self.0)[..12])
    }
}
