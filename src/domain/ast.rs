//! Structural types produced by the domain parser.

use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::SyntaxError;

/// Comparison operator accepted inside a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Eq,         // =
    Ne,         // !=
    Gt,         // >
    Ge,         // >=
    Lt,         // <
    Le,         // <=
    EqOrUnset,  // =?
    EqLike,     // =like
    Like,       // like
    NotLike,    // not like
    ILike,      // ilike
    NotILike,   // not ilike
    EqILike,    // =ilike
    In,         // in
    NotIn,      // not in
    ChildOf,    // child_of
    ParentOf,   // parent_of
}

impl Comparator {
    pub const ALL: [Comparator; 17] = [
        Comparator::Eq,
        Comparator::Ne,
        Comparator::Gt,
        Comparator::Ge,
        Comparator::Lt,
        Comparator::Le,
        Comparator::EqOrUnset,
        Comparator::EqLike,
        Comparator::Like,
        Comparator::NotLike,
        Comparator::ILike,
        Comparator::NotILike,
        Comparator::EqILike,
        Comparator::In,
        Comparator::NotIn,
        Comparator::ChildOf,
        Comparator::ParentOf,
    ];

    /// The token as written in a domain and sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::EqOrUnset => "=?",
            Comparator::EqLike => "=like",
            Comparator::Like => "like",
            Comparator::NotLike => "not like",
            Comparator::ILike => "ilike",
            Comparator::NotILike => "not ilike",
            Comparator::EqILike => "=ilike",
            Comparator::In => "in",
            Comparator::NotIn => "not in",
            Comparator::ChildOf => "child_of",
            Comparator::ParentOf => "parent_of",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Comparator::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| format!("unsupported comparator '{value}'"))
    }
}

/// A single `(field, comparator, value)` comparison.
///
/// Terms produced by the parser have a word-character `field` and a trimmed
/// word/whitespace `value`, so their `Display` form parses back to an equal
/// term. `new` and the public fields do not check this; a hand-built term
/// with a quote or comma in it still serializes, but its text form does
/// not re-parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterTerm {
    pub field: String,
    pub comparator: Comparator,
    pub value: String,
}

impl FilterTerm {
    pub fn new(field: impl Into<String>, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            comparator,
            value: value.into(),
        }
    }
}

impl fmt::Display for FilterTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}','{}','{}')", self.field, self.comparator, self.value)
    }
}

impl FromStr for FilterTerm {
    type Err = SyntaxError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        super::parser::parse_term(text)
    }
}

impl Serialize for FilterTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.field)?;
        seq.serialize_element(self.comparator.as_str())?;
        seq.serialize_element(&self.value)?;
        seq.end()
    }
}

/// Two-operand logical connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And, // &
    Or,  // |
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token of the only unary connective.
pub const NOT_OP: &str = "!";

/// One top-level element of a domain.
///
/// Combinators take plain terms as operands and never nest; a domain such as
/// `'&','|',a,b,c` has no representation here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    /// A bare comparison.
    Leaf(FilterTerm),

    /// `'&',left,right` or `'|',left,right`
    Binary {
        op: BinaryOp,
        left: FilterTerm,
        right: FilterTerm,
    },

    /// `'!',operand`
    Unary { operand: FilterTerm },
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Leaf(term) => write!(f, "{term}"),
            FilterNode::Binary { op, left, right } => write!(f, "'{op}',{left},{right}"),
            FilterNode::Unary { operand } => write!(f, "'{NOT_OP}',{operand}"),
        }
    }
}

impl FromStr for FilterNode {
    type Err = SyntaxError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        super::parser::parse_node(text)
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterNode::Leaf(term) => term.serialize(serializer),
            FilterNode::Binary { op, left, right } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element(op.as_str())?;
                seq.serialize_element(left)?;
                seq.serialize_element(right)?;
                seq.end()
            }
            FilterNode::Unary { operand } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(NOT_OP)?;
                seq.serialize_element(operand)?;
                seq.end()
            }
        }
    }
}

/// Parsed domain: an implicit conjunction of nodes in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    nodes: Vec<FilterNode>,
}

impl FilterExpression {
    pub fn new(nodes: Vec<FilterNode>) -> Self {
        Self { nodes }
    }

    /// Expression with a single bare term.
    pub fn term(term: FilterTerm) -> Self {
        Self::new(vec![FilterNode::Leaf(term)])
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterNode> {
        self.nodes.iter()
    }
}

impl From<Vec<FilterNode>> for FilterExpression {
    fn from(nodes: Vec<FilterNode>) -> Self {
        Self::new(nodes)
    }
}

impl<'a> IntoIterator for &'a FilterExpression {
    type Item = &'a FilterNode;
    type IntoIter = std::slice::Iter<'a, FilterNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return Ok(());
        }
        f.write_str("[")?;
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{node}")?;
        }
        f.write_str("]")
    }
}

impl FromStr for FilterExpression {
    type Err = SyntaxError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        super::parser::parse_domain(text)
    }
}

impl Serialize for FilterExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.nodes.len()))?;
        for node in &self.nodes {
            seq.serialize_element(node)?;
        }
        seq.end()
    }
}
