//! Raw (interchange) form of a condition tree.
//!
//! This is the shape the authoring layer hands over and the CLI reads and
//! writes as JSON:
//!
//! ```json
//! { "paramType": "Calldata", "operator": "Matches",
//!   "children": [ { "paramType": "Static", "operator": "EqualTo", "compValue": "0x…" } ] }
//! ```
//!
//! A raw tree may be malformed; converting it into a [`Condition`] validates it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Condition, Operator, ParamType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCondition {
    pub param_type: ParamType,
    pub operator: Operator,
    /// `0x`-prefixed hex operand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comp_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawCondition>>,
}

impl RawCondition {
    /// Parse a raw tree from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Drop empty `children` lists and empty `compValue` operands, recursively.
    pub fn clean(self) -> Self {
        let comp_value = self
            .comp_value
            .filter(|hex| !hex.is_empty() && hex != "0x" && hex != "0X");
        let children = self
            .children
            .map(|children| children.into_iter().map(RawCondition::clean).collect::<Vec<_>>())
            .filter(|children| !children.is_empty());
        Self {
            param_type: self.param_type,
            operator: self.operator,
            comp_value,
            children,
        }
    }
}

/// Decode a `0x`-prefixed (or bare) hex string.
pub fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    Ok(hex::decode(digits)?)
}

impl TryFrom<RawCondition> for Condition {
    type Error = Error;

    fn try_from(raw: RawCondition) -> Result<Self> {
        let comp_value = raw.comp_value.as_deref().map(decode_hex).transpose()?;
        let children = raw
            .children
            .unwrap_or_default()
            .into_iter()
            .map(Condition::try_from)
            .collect::<Result<Vec<_>>>()?;
        Condition::new(raw.param_type, raw.operator, comp_value, children)
    }
}

impl From<Condition> for RawCondition {
    fn from(condition: Condition) -> Self {
        let param_type = condition.param_type();
        let operator = condition.operator();
        let comp_value = condition
            .comp_value()
            .map(|bytes| format!("0x{}", hex::encode(bytes)));
        let children = if condition.is_leaf() {
            None
        } else {
            Some(
                condition
                    .into_children()
                    .into_iter()
                    .map(RawCondition::from)
                    .collect(),
            )
        };
        Self {
            param_type,
            operator,
            comp_value,
            children,
        }
    }
}
