//! Condition tree model: parameter types, operators, and the immutable
//! [`Condition`] node.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::ConditionId;
use crate::raw::RawCondition;

/// How the region of call data a node scopes is ABI-encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    /// No data of its own (logical nodes, global allowances).
    None,
    Static,
    Dynamic,
    Tuple,
    Array,
    /// The outermost call data of a function call.
    Calldata,
    /// A nested ABI-encoded blob.
    AbiEncoded,
}

impl ParamType {
    pub const ALL: [ParamType; 7] = [
        ParamType::None,
        ParamType::Static,
        ParamType::Dynamic,
        ParamType::Tuple,
        ParamType::Array,
        ParamType::Calldata,
        ParamType::AbiEncoded,
    ];

    /// Stable numeric code used by content ids and the packed encoding.
    pub const fn code(self) -> u8 {
        match self {
            ParamType::None => 0,
            ParamType::Static => 1,
            ParamType::Dynamic => 2,
            ParamType::Tuple => 3,
            ParamType::Array => 4,
            ParamType::Calldata => 5,
            ParamType::AbiEncoded => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Calldata and AbiEncoded scope a whole call rather than a parameter.
    pub const fn is_whole_call(self) -> bool {
        matches!(self, ParamType::Calldata | ParamType::AbiEncoded)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ParamType::None => "None",
            ParamType::Static => "Static",
            ParamType::Dynamic => "Dynamic",
            ParamType::Tuple => "Tuple",
            ParamType::Array => "Array",
            ParamType::Calldata => "Calldata",
            ParamType::AbiEncoded => "AbiEncoded",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad role of an operator within a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// And / Or / Nor / Xor: children evaluated against the same data.
    Logical,
    /// Matches: children are positional ABI components.
    Structural,
    /// ArraySome / ArrayEvery / ArraySubset: children scope array elements.
    Array,
    /// Leaf comparisons (including Pass).
    Comparison,
    /// Leaf allowance checks.
    Allowance,
}

/// The role of a condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Pass,
    And,
    Or,
    Nor,
    Xor,
    Matches,
    ArraySome,
    ArrayEvery,
    ArraySubset,
    EqualToAvatar,
    EqualTo,
    GreaterThan,
    LessThan,
    SignedIntGreaterThan,
    SignedIntLessThan,
    Bitmask,
    Custom,
    WithinAllowance,
    EtherWithinAllowance,
    CallWithinAllowance,
}

impl Operator {
    pub const ALL: [Operator; 20] = [
        Operator::Pass,
        Operator::And,
        Operator::Or,
        Operator::Nor,
        Operator::Xor,
        Operator::Matches,
        Operator::ArraySome,
        Operator::ArrayEvery,
        Operator::ArraySubset,
        Operator::EqualToAvatar,
        Operator::EqualTo,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::SignedIntGreaterThan,
        Operator::SignedIntLessThan,
        Operator::Bitmask,
        Operator::Custom,
        Operator::WithinAllowance,
        Operator::EtherWithinAllowance,
        Operator::CallWithinAllowance,
    ];

    /// Stable numeric code (fits in 5 bits).
    pub const fn code(self) -> u8 {
        match self {
            Operator::Pass => 0,
            Operator::And => 1,
            Operator::Or => 2,
            Operator::Nor => 3,
            Operator::Xor => 4,
            Operator::Matches => 5,
            Operator::ArraySome => 6,
            Operator::ArrayEvery => 7,
            Operator::ArraySubset => 8,
            Operator::EqualToAvatar => 15,
            Operator::EqualTo => 16,
            Operator::GreaterThan => 17,
            Operator::LessThan => 18,
            Operator::SignedIntGreaterThan => 19,
            Operator::SignedIntLessThan => 20,
            Operator::Bitmask => 21,
            Operator::Custom => 22,
            Operator::WithinAllowance => 28,
            Operator::EtherWithinAllowance => 29,
            Operator::CallWithinAllowance => 30,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    pub const fn kind(self) -> OperatorKind {
        match self {
            Operator::And | Operator::Or | Operator::Nor | Operator::Xor => OperatorKind::Logical,
            Operator::Matches => OperatorKind::Structural,
            Operator::ArraySome | Operator::ArrayEvery | Operator::ArraySubset => {
                OperatorKind::Array
            }
            Operator::Pass
            | Operator::EqualToAvatar
            | Operator::EqualTo
            | Operator::GreaterThan
            | Operator::LessThan
            | Operator::SignedIntGreaterThan
            | Operator::SignedIntLessThan
            | Operator::Bitmask
            | Operator::Custom => OperatorKind::Comparison,
            Operator::WithinAllowance
            | Operator::EtherWithinAllowance
            | Operator::CallWithinAllowance => OperatorKind::Allowance,
        }
    }

    pub const fn is_logical(self) -> bool {
        matches!(self.kind(), OperatorKind::Logical)
    }

    /// Operators whose nodes must have at least one child.
    pub const fn requires_children(self) -> bool {
        matches!(
            self.kind(),
            OperatorKind::Logical | OperatorKind::Structural | OperatorKind::Array
        )
    }

    pub const fn is_leaf(self) -> bool {
        !self.requires_children()
    }

    /// Allowances that are checked once per call rather than per parameter.
    pub const fn is_global_allowance(self) -> bool {
        matches!(
            self,
            Operator::EtherWithinAllowance | Operator::CallWithinAllowance
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Pass => "Pass",
            Operator::And => "And",
            Operator::Or => "Or",
            Operator::Nor => "Nor",
            Operator::Xor => "Xor",
            Operator::Matches => "Matches",
            Operator::ArraySome => "ArraySome",
            Operator::ArrayEvery => "ArrayEvery",
            Operator::ArraySubset => "ArraySubset",
            Operator::EqualToAvatar => "EqualToAvatar",
            Operator::EqualTo => "EqualTo",
            Operator::GreaterThan => "GreaterThan",
            Operator::LessThan => "LessThan",
            Operator::SignedIntGreaterThan => "SignedIntGreaterThan",
            Operator::SignedIntLessThan => "SignedIntLessThan",
            Operator::Bitmask => "Bitmask",
            Operator::Custom => "Custom",
            Operator::WithinAllowance => "WithinAllowance",
            Operator::EtherWithinAllowance => "EtherWithinAllowance",
            Operator::CallWithinAllowance => "CallWithinAllowance",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable condition tree node.
///
/// Nodes are only built through validating constructors, so every
/// `Condition` value is structurally well-formed: operators that require
/// children have at least one, leaves have none, and only leaves carry a
/// comparison operand. The content id is computed lazily and memoized in
/// the node.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCondition", into = "RawCondition")]
pub struct Condition {
    param_type: ParamType,
    operator: Operator,
    comp_value: Option<Vec<u8>>,
    children: Vec<Condition>,
    id: OnceLock<ConditionId>,
}

impl Condition {
    /// Build a node, rejecting structurally malformed combinations.
    ///
    /// An empty operand is treated as absent.
    pub fn new(
        param_type: ParamType,
        operator: Operator,
        comp_value: Option<Vec<u8>>,
        children: Vec<Condition>,
    ) -> Result<Self> {
        let comp_value = comp_value.filter(|bytes| !bytes.is_empty());

        if operator.requires_children() {
            if children.is_empty() {
                return Err(Error::Malformed {
                    operator,
                    reason: "requires at least one child".into(),
                });
            }
            if comp_value.is_some() {
                return Err(Error::Malformed {
                    operator,
                    reason: "only leaf operators may carry a compValue".into(),
                });
            }
        } else if !children.is_empty() {
            return Err(Error::Malformed {
                operator,
                reason: format!("leaf operator cannot carry {} children", children.len()),
            });
        }

        Ok(Self {
            param_type,
            operator,
            comp_value,
            children,
            id: OnceLock::new(),
        })
    }

    /// Build a leaf node.
    pub fn leaf(param_type: ParamType, operator: Operator, comp_value: Option<Vec<u8>>) -> Result<Self> {
        Self::new(param_type, operator, comp_value, Vec::new())
    }

    /// Build a node with children and no operand.
    pub fn branch(param_type: ParamType, operator: Operator, children: Vec<Condition>) -> Result<Self> {
        Self::new(param_type, operator, None, children)
    }

    /// A `Pass` leaf: no constraint on this region of the call data.
    pub fn pass(param_type: ParamType) -> Self {
        Self {
            param_type,
            operator: Operator::Pass,
            comp_value: None,
            children: Vec::new(),
            id: OnceLock::new(),
        }
    }

    /// Rebuild this node with a different child list.
    pub fn with_children(&self, children: Vec<Condition>) -> Result<Self> {
        Self::new(self.param_type, self.operator, self.comp_value.clone(), children)
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn comp_value(&self) -> Option<&[u8]> {
        self.comp_value.as_deref()
    }

    pub fn children(&self) -> &[Condition] {
        &self.children
    }

    /// Consume the node, returning its children.
    pub fn into_children(self) -> Vec<Condition> {
        self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_pass(&self) -> bool {
        self.operator == Operator::Pass
    }

    pub fn is_global_allowance(&self) -> bool {
        self.operator.is_global_allowance()
    }

    /// Whether this node scopes a whole call (Calldata / AbiEncoded).
    pub fn is_whole_call(&self) -> bool {
        self.param_type.is_whole_call()
    }

    /// Content identifier of this subtree (memoized).
    pub fn id(&self) -> ConditionId {
        *self.id.get_or_init(|| ConditionId::of(self))
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Condition::node_count).sum::<usize>()
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Condition {}

impl std::hash::Hash for Condition {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Condition");
        s.field("param_type", &self.param_type)
            .field("operator", &self.operator);
        if let Some(bytes) = &self.comp_value {
            s.field("comp_value", &format_args!("0x{}", hex::encode(bytes)));
        }
        if !self.children.is_empty() {
            s.field("children", &self.children);
        }
        s.finish()
    }
}

/// Compact single-line notation, e.g.
/// `Matches<Calldata>(EqualTo<Static>[0x0000…0001], Pass<Static>)`.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operator)?;
        if self.param_type != ParamType::None {
            write!(f, "<{}>", self.param_type)?;
        }
        if let Some(bytes) = &self.comp_value {
            if bytes.len() > 8 {
                write!(
                    f,
                    "[0x{}…{}]",
                    hex::encode(&bytes[..2]),
                    hex::encode(&bytes[bytes.len() - 2..])
                )?;
            } else {
                write!(f, "[0x{}]", hex::encode(bytes))?;
            }
        }
        if !self.children.is_empty() {
            f.write_str("(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
