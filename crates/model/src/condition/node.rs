//! The condition tree: single predicates ([`Leaf`]) and logical groupings
//! ([`Group`]) joined through shared node handles ([`NodeRef`]).

use crate::{
    condition::operator::{Logic, Operator},
    core::value::Operand,
    error::ModelError,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// A single `field <operator> value` predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaf {
    pub operator: Operator,
    pub field: String,
    pub value: Operand,
}

impl Leaf {
    pub fn new(operator: Operator, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self {
            operator,
            field: field.into(),
            value: value.into(),
        }
    }

    /// A leaf for operators that do not read a value (`IS_NULL`, `IS_NOT_NULL`).
    pub fn unary(operator: Operator, field: impl Into<String>) -> Self {
        Self {
            operator,
            field: field.into(),
            value: Operand::default(),
        }
    }
}

/// A logical AND/OR combination of child nodes.
///
/// The public constructors never produce an empty group. The fields stay
/// public, so an empty `children` list is still representable; the compiler
/// skips such a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub logic: Logic,
    pub children: Vec<NodeRef>,
}

impl Group {
    pub fn new(logic: Logic, children: Vec<NodeRef>) -> Result<Self, ModelError> {
        if children.is_empty() {
            return Err(ModelError::EmptyGroup);
        }
        Ok(Self { logic, children })
    }

    pub fn single(logic: Logic, child: impl Into<NodeRef>) -> Self {
        Self {
            logic,
            children: vec![child.into()],
        }
    }

    pub fn pair(logic: Logic, first: impl Into<NodeRef>, second: impl Into<NodeRef>) -> Self {
        Self {
            logic,
            children: vec![first.into(), second.into()],
        }
    }

    pub fn push(&mut self, child: impl Into<NodeRef>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// A node of the condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Leaf(Leaf),
    Group(Group),
}

impl ConditionNode {
    pub fn leaf(operator: Operator, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        ConditionNode::Leaf(Leaf::new(operator, field, value))
    }

    pub fn group(logic: Logic, children: Vec<NodeRef>) -> Result<Self, ModelError> {
        Group::new(logic, children).map(ConditionNode::Group)
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            ConditionNode::Leaf(leaf) => Some(leaf),
            ConditionNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            ConditionNode::Group(group) => Some(group),
            ConditionNode::Leaf(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            ConditionNode::Group(group) => Some(group),
            ConditionNode::Leaf(_) => None,
        }
    }

    /// Number of node levels below and including this one.
    pub fn depth(&self) -> usize {
        match self {
            ConditionNode::Leaf(_) => 1,
            ConditionNode::Group(group) => {
                1 + group
                    .children
                    .iter()
                    .map(|child| child.read().depth())
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

impl From<Leaf> for ConditionNode {
    fn from(leaf: Leaf) -> Self {
        ConditionNode::Leaf(leaf)
    }
}

impl From<Group> for ConditionNode {
    fn from(group: Group) -> Self {
        ConditionNode::Group(group)
    }
}

impl Serialize for ConditionNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConditionNode::Leaf(leaf) => leaf.serialize(serializer),
            ConditionNode::Group(group) => group.serialize(serializer),
        }
    }
}

/// Wire shape shared by leaves and groups; the presence of `children`
/// (or the legacy `conditions` key) decides which one it is.
#[derive(Deserialize)]
struct RawNode {
    operator: Option<Operator>,
    field: Option<String>,
    #[serde(default, deserialize_with = "present")]
    value: Option<Operand>,
    #[serde(default)]
    logic: Logic,
    #[serde(alias = "conditions")]
    children: Option<Vec<NodeRef>>,
}

impl TryFrom<RawNode> for ConditionNode {
    type Error = ModelError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        if let Some(children) = raw.children {
            return ConditionNode::group(raw.logic, children);
        }

        let operator = raw.operator.ok_or(ModelError::MissingKey("operator"))?;
        let field = raw.field.ok_or(ModelError::MissingKey("field"))?;
        let value = match raw.value {
            Some(value) => value,
            None if operator.ignores_value() => Operand::default(),
            None => return Err(ModelError::MissingKey("value")),
        };
        Ok(ConditionNode::Leaf(Leaf {
            operator,
            field,
            value,
        }))
    }
}

/// Keeps an explicit `null` apart from an absent key.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Operand>, D::Error> {
    Operand::deserialize(deserializer).map(Some)
}

impl<'de> Deserialize<'de> for ConditionNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawNode::deserialize(deserializer)?;
        ConditionNode::try_from(raw).map_err(de::Error::custom)
    }
}

/// Shared handle to a condition node.
///
/// Cloning a `NodeRef` clones the handle, not the node: both handles see
/// every later mutation. Use [`NodeRef::deep_clone`] for an independent copy.
#[derive(Clone)]
pub struct NodeRef(Arc<RwLock<ConditionNode>>);

impl NodeRef {
    pub fn new(node: impl Into<ConditionNode>) -> Self {
        Self(Arc::new(RwLock::new(node.into())))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ConditionNode> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ConditionNode> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` when both handles point at the same node.
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Copies the node and every node below it into fresh handles.
    pub fn deep_clone(&self) -> NodeRef {
        let copy = match &*self.read() {
            ConditionNode::Leaf(leaf) => ConditionNode::Leaf(leaf.clone()),
            ConditionNode::Group(group) => ConditionNode::Group(Group {
                logic: group.logic,
                children: group.children.iter().map(NodeRef::deep_clone).collect(),
            }),
        };
        NodeRef::new(copy)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.read() == *other.read()
    }
}

impl From<ConditionNode> for NodeRef {
    fn from(node: ConditionNode) -> Self {
        NodeRef::new(node)
    }
}

impl From<Leaf> for NodeRef {
    fn from(leaf: Leaf) -> Self {
        NodeRef::new(leaf)
    }
}

impl From<Group> for NodeRef {
    fn from(group: Group) -> Self {
        NodeRef::new(group)
    }
}

impl Serialize for NodeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NodeRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ConditionNode::deserialize(deserializer).map(NodeRef::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Scalar;

    #[test]
    fn test_group_rejects_empty_children() {
        assert!(matches!(
            Group::new(Logic::And, vec![]),
            Err(ModelError::EmptyGroup)
        ));
        assert!(ConditionNode::group(Logic::Or, vec![]).is_err());
    }

    #[test]
    fn test_deserialize_leaf_and_group() {
        let node: ConditionNode = serde_json::from_str(
            r#"{
                "logic": "or",
                "conditions": [
                    { "operator": "EQ", "field": "status", "value": "draft" },
                    { "children": [ { "operator": "IS_NULL", "field": "deleted_at" } ] }
                ]
            }"#,
        )
        .unwrap();

        let group = node.as_group().unwrap();
        assert_eq!(group.logic, Logic::Or);
        assert_eq!(group.len(), 2);

        let first = group.children[0].read();
        let leaf = first.as_leaf().unwrap();
        assert_eq!(leaf.operator, Operator::Eq);
        assert_eq!(leaf.value, Operand::Scalar(Scalar::from("draft")));

        let second = group.children[1].read();
        let nested = second.as_group().unwrap();
        assert_eq!(nested.logic, Logic::And);
        assert_eq!(
            nested.children[0].read().as_leaf().unwrap().value,
            Operand::Scalar(Scalar::Null)
        );
    }

    #[test]
    fn test_deserialize_rejects_empty_group() {
        let err = serde_json::from_str::<ConditionNode>(r#"{ "logic": "and", "children": [] }"#)
            .unwrap_err();
        assert!(err.to_string().contains("at least one child"));
    }

    #[test]
    fn test_deserialize_rejects_leaf_without_field() {
        let err = serde_json::from_str::<ConditionNode>(r#"{ "operator": "EQ", "value": 1 }"#)
            .unwrap_err();
        assert!(err.to_string().contains("`field`"));
    }

    #[test]
    fn test_deserialize_requires_value_when_operator_reads_it() {
        let err = serde_json::from_str::<ConditionNode>(r#"{ "operator": "EQ", "field": "a" }"#)
            .unwrap_err();
        assert!(err.to_string().contains("`value`"));

        let explicit_null: ConditionNode =
            serde_json::from_str(r#"{ "operator": "EQ", "field": "a", "value": null }"#).unwrap();
        assert_eq!(
            explicit_null.as_leaf().unwrap().value,
            Operand::Scalar(Scalar::Null)
        );

        let unknown: ConditionNode =
            serde_json::from_str(r#"{ "operator": "REGEX", "field": "a" }"#).unwrap();
        assert_eq!(unknown.as_leaf().unwrap().operator, Operator::Unrecognized);
    }

    #[test]
    fn test_serialize_round_trips_shape() {
        let node = ConditionNode::Group(Group::pair(
            Logic::And,
            Leaf::new(Operator::Gt, "age", 18),
            Leaf::new(Operator::In, "tag", vec!["a", "b"]),
        ));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "logic": "and",
                "children": [
                    { "operator": "GT", "field": "age", "value": 18 },
                    { "operator": "IN", "field": "tag", "value": ["a", "b"] }
                ]
            })
        );
    }

    #[test]
    fn test_node_ref_clone_shares_and_deep_clone_copies() {
        let original = NodeRef::new(Group::single(Logic::And, Leaf::new(Operator::Eq, "a", 1)));
        let shared = original.clone();
        let copied = original.deep_clone();

        shared
            .write()
            .as_group_mut()
            .unwrap()
            .push(Leaf::new(Operator::Eq, "b", 2));

        assert!(shared.ptr_eq(&original));
        assert_eq!(original.read().as_group().unwrap().len(), 2);
        assert_eq!(copied.read().as_group().unwrap().len(), 1);
    }

    #[test]
    fn test_depth() {
        let inner = Group::single(Logic::Or, Leaf::new(Operator::Eq, "a", 1));
        let outer = ConditionNode::Group(Group::pair(
            Logic::And,
            inner,
            Leaf::new(Operator::Eq, "b", 2),
        ));
        assert_eq!(outer.depth(), 3);
    }
}
