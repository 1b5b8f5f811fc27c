//! Condition algebra: canonicalization, content addressing, OR push-down,
//! and subtraction over permission condition trees.
//!
//! Two semantically equivalent policies must normalize to byte-identical
//! trees: the canonical tree is packed and deployed once per unique content,
//! at an address derived from its bytes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌──────────────┐
//! │  Raw tree    │───▶│  normalize    │───▶│  pack        │
//! │  (authoring) │    │  prune / pad  │    │  address     │
//! └──────────────┘    │  flatten ...  │    └──────────────┘
//!                     │  push_down_or │
//!                     └───────┬───────┘
//!                             │ canonical trees
//!                     ┌───────┴───────┐
//!                     │  subtract     │  narrowing permissions
//!                     │  merge        │  widening permissions
//!                     └───────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rolescope_algebra::{NormalizeOptions, normalize};
//! use rolescope_core::Condition;
//!
//! let json = r#"{
//!   "paramType": "None", "operator": "Or",
//!   "children": [
//!     { "paramType": "Calldata", "operator": "Matches", "children": [
//!         { "paramType": "Static", "operator": "EqualTo", "compValue": "0x01" },
//!         { "paramType": "Static", "operator": "Pass" } ] },
//!     { "paramType": "Calldata", "operator": "Matches", "children": [
//!         { "paramType": "Static", "operator": "EqualTo", "compValue": "0x02" } ] }
//!   ]
//! }"#;
//! let condition: Condition = serde_json::from_str(json).unwrap();
//! let canonical = normalize(&condition, &NormalizeOptions::default()).unwrap();
//! assert_eq!(canonical.operator().as_str(), "Matches");
//! assert_eq!(canonical.children()[0].operator().as_str(), "Or");
//! ```

mod address;
mod merge;
mod normalize;
mod pack;
mod pad;
mod prune;
mod push_down;
mod subtract;

#[cfg(test)]
mod test_helpers;

pub use address::{Address, Create2Params, SINGLETON_FACTORY, address, create2_address, init_code};
pub use merge::merge_alternatives;
pub use normalize::{
    NormalizeOptions, dedupe_children, equivalent, flatten_nested_branches, normalize, normalize_raw,
    sort_children, unwrap_single_branch,
};
pub use pack::{FlatNode, MAX_PACKED_NODES, flatten_breadth_first, pack, unpack};
pub use pad::pad_to_match;
pub use prune::{is_dynamic, prune_trailing_pass};
pub use push_down::push_down_or;
pub use subtract::{Subtraction, subtract};
