//! # rolescope core
//!
//! The condition tree model shared by every rolescope crate: parameter types,
//! operators, the immutable [`Condition`] node, its raw serde form, content
//! identifiers, integrity checks, and error definitions.
//!
//! ## Design Philosophy
//!
//! A `Condition` can only be obtained through validating constructors, so the
//! algebra built on top of it (normalization, push-down, subtraction) works on
//! trees that are structurally well-formed by construction. Equality is
//! content equality: two nodes are equal iff their [`ConditionId`]s match.

pub mod error;
pub mod id;
pub mod integrity;
pub mod model;
pub mod raw;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, Stage};
pub use id::ConditionId;
pub use integrity::check_integrity;
pub use model::{Condition, Operator, OperatorKind, ParamType};
pub use raw::{RawCondition, decode_hex};
