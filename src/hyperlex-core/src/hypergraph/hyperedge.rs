//! Weighted n-ary hyperedge representation.

use serde::{Deserialize, Serialize};

use super::attributes::HasAttributes;
use super::{EdgeId, Label, NodeId, AttributeMap};
use crate::types::Value;

/// Default hyperedge weight.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A weighted relation joining two or more nodes.
///
/// Members are deduplicated on construction and keep first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperedge {
    /// Unique hyperedge identifier.
    pub id: EdgeId,
    /// Hyperedge type (`"cites"`, `"collaboration"`, ...).
    pub edge_type: Label,
    members: Vec<NodeId>,
    /// Weight in `[0, 1]`.
    pub weight: f64,
    /// Hyperedge attributes.
    pub attributes: AttributeMap,
}

impl Hyperedge {
    /// Create a hyperedge with the default weight.
    pub fn new<I, S>(id: impl Into<EdgeId>, edge_type: impl Into<Label>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        let mut deduped: Vec<NodeId> = Vec::new();
        for member in members {
            let member = member.into();
            if !deduped.contains(&member) {
                deduped.push(member);
            }
        }
        Self {
            id: id.into(),
            edge_type: edge_type.into(),
            members: deduped,
            weight: DEFAULT_WEIGHT,
            attributes: AttributeMap::new(),
        }
    }

    /// Set the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Add one attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Member node ids.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Number of members.
    pub fn arity(&self) -> usize {
        self.members.len()
    }

    /// Check if this is a pairwise relation.
    pub fn is_binary(&self) -> bool {
        self.arity() == 2
    }

    /// Check if this hyperedge involves a specific node.
    pub fn involves(&self, node_id: &str) -> bool {
        self.members.iter().any(|m| m == node_id)
    }

    /// Whether every member is contained in `nodes`.
    pub fn is_within<F>(&self, contains: F) -> bool
    where
        F: Fn(&str) -> bool,
    {
        self.members.iter().all(|m| contains(m))
    }

    /// Drop a member; returns whether it was present.
    pub(crate) fn remove_member(&mut self, node_id: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != node_id);
        self.members.len() != before
    }
}

impl HasAttributes for Hyperedge {
    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hyperedge_creation() {
        let edge = Hyperedge::new("e1", "applies", ["p1", "p2", "c1"]);

        assert_eq!(edge.arity(), 3);
        assert!(!edge.is_binary());
        assert!(edge.involves("p2"));
        assert!(!edge.involves("p9"));
        assert_eq!(edge.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn test_members_are_deduplicated_in_order() {
        let edge = Hyperedge::new("e1", "cites", ["b", "a", "b", "c", "a"]);
        assert_eq!(edge.members(), ["b", "a", "c"]);
    }

    #[test]
    fn test_remove_member() {
        let mut edge = Hyperedge::new("e1", "cites", ["a", "b", "c"]);
        assert!(edge.remove_member("b"));
        assert!(!edge.remove_member("b"));
        assert_eq!(edge.members(), ["a", "c"]);
        assert!(edge.is_binary());
    }

    #[test]
    fn test_is_within() {
        let edge = Hyperedge::new("e1", "cites", ["a", "b"]);
        assert!(edge.is_within(|id| id == "a" || id == "b" || id == "c"));
        assert!(!edge.is_within(|id| id == "a"));
    }
}
