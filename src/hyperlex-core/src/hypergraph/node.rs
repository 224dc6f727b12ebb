//! Node representation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::attributes::HasAttributes;
use super::{Label, NodeId, AttributeMap};
use crate::types::{random_normal, Embedding, Value};

/// Standard deviation of freshly initialised embedding components.
pub const INIT_STD: f32 = 0.1;

/// An entity in the hypergraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Node type (`"party"`, `"statute"`, `"agent"`, ...).
    pub node_type: Label,
    /// Node attributes.
    pub attributes: AttributeMap,
    /// Embedding, absent until initialised.
    pub embedding: Option<Embedding>,
}

impl Node {
    /// Create a node without attributes or embedding.
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<Label>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            attributes: AttributeMap::new(),
            embedding: None,
        }
    }

    /// Add one attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Replace the attribute map.
    #[must_use]
    pub fn with_attributes(mut self, attributes: AttributeMap) -> Self {
        self.attributes = attributes;
        self
    }

    /// Attach an embedding.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Fill the embedding with `N(0, INIT_STD²)` samples drawn from `rng`.
    ///
    /// Overwrites any previous embedding; use it before the node joins a graph.
    pub fn initialize_embedding<R: Rng + ?Sized>(&mut self, dim: usize, rng: &mut R) {
        self.embedding = Some(random_normal(dim, INIT_STD, rng));
    }

    /// Embedding length, if initialised.
    pub fn embedding_dim(&self) -> Option<usize> {
        self.embedding.as_ref().map(Vec::len)
    }

    /// Check the node type.
    pub fn has_type(&self, node_type: &str) -> bool {
        self.node_type == node_type
    }
}

impl HasAttributes for Node {
    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new("n0", "party").with_attribute("name", "Alice");

        assert!(node.has_type("party"));
        assert!(!node.has_type("judge"));
        assert_eq!(node.attribute("name"), Some(&Value::from("Alice")));
        assert_eq!(node.text_attribute("name"), Some("Alice"));
        assert_eq!(node.embedding_dim(), None);
    }

    #[test]
    fn test_node_attributes() {
        let mut node = Node::new("n1", "precedent");
        assert_eq!(node.set_attribute("legal_domain", "contract"), None);
        node.set_attribute("year", 1998i64);

        // non-string values have no text form
        assert_eq!(node.text_attribute("year"), None);
        assert_eq!(
            node.set_attribute("legal_domain", "tort"),
            Some(Value::from("contract"))
        );
        assert_eq!(node.remove_attribute("year"), Some(Value::Int64(1998)));
        assert_eq!(node.attributes().len(), 1);
    }

    #[test]
    fn test_initialize_embedding_is_seeded() {
        let mut a = Node::new("a", "agent");
        let mut b = Node::new("b", "agent");
        a.initialize_embedding(32, &mut ChaCha8Rng::seed_from_u64(9));
        b.initialize_embedding(32, &mut ChaCha8Rng::seed_from_u64(9));

        assert_eq!(a.embedding_dim(), Some(32));
        assert_eq!(a.embedding, b.embedding);
        assert!(a.embedding.unwrap().iter().any(|x| *x != 0.0));
    }
}
