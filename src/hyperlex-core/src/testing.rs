//! Testing utilities and helpers for hyperlex-core.
//!
//! Fixtures build the graphs used across the workspace's tests and demos;
//! assertions chain so one statement checks the shape of a graph.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::hypergraph::{HasAttributes, Hyperedge, Hypergraph, Node, NodeId, INIT_STD};
use crate::types::{random_normal, Value};

/// Build an `AttributeMap` from `key => value` pairs.
#[macro_export]
macro_rules! attrs {
    ($($key:expr => $val:expr),* $(,)?) => {{
        let mut map = $crate::hypergraph::AttributeMap::new();
        $(map.insert(::std::string::String::from($key), $crate::types::Value::from($val));)*
        map
    }};
}

/// Test fixture builder for creating common hypergraph scenarios.
#[derive(Debug, Clone, Default)]
pub struct HypergraphFixture {
    hypergraph: Hypergraph,
}

impl HypergraphFixture {
    /// Create a new empty fixture.
    pub fn new() -> Self {
        Self::default()
    }

    /// `num_nodes` nodes `node_0..` joined by `num_edges` pairwise edges
    /// `edge_i = {node_i, node_(i+1) % num_nodes}`, each node carrying a
    /// seeded `dim`-dimensional embedding.
    ///
    /// # Panics
    ///
    /// Panics if `num_nodes < 2`.
    pub fn ring(num_nodes: usize, num_edges: usize, dim: usize, seed: u64) -> Self {
        assert!(num_nodes >= 2, "a ring needs at least two nodes");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut fixture = Self::new();
        for i in 0..num_nodes {
            let mut node = Node::new(format!("node_{i}"), "entity");
            node.initialize_embedding(dim, &mut rng);
            fixture.add_node(node);
        }
        for i in 0..num_edges {
            fixture.add_edge(Hyperedge::new(
                format!("edge_{i}"),
                "relation",
                [
                    format!("node_{}", i % num_nodes),
                    format!("node_{}", (i + 1) % num_nodes),
                ],
            ));
        }
        fixture
    }

    /// A small dispute: two parties, a witness, a judge and two pieces of
    /// evidence, linked by multi-party relations. No embeddings.
    pub fn legal_case() -> Self {
        let mut fixture = Self::new();
        fixture
            .add_node(Node::new("plaintiff", "person").with_attributes(attrs! {
                "name" => "Avery Stone",
                "role" => "plaintiff",
            }))
            .add_node(Node::new("defendant", "person").with_attributes(attrs! {
                "name" => "Blake Rivers",
                "role" => "defendant",
            }))
            .add_node(Node::new("witness", "person").with_attribute("role", "witness"))
            .add_node(Node::new("judge", "person").with_attribute("role", "judge"))
            .add_node(Node::new("contract", "evidence").with_attribute("reliability", 0.9))
            .add_node(Node::new("email", "evidence").with_attribute("reliability", 0.6));

        fixture
            .add_edge(
                Hyperedge::new("agreement", "contract", ["plaintiff", "defendant", "contract"])
                    .with_weight(0.9),
            )
            .add_edge(
                Hyperedge::new("testimony", "testimony", ["witness", "email", "defendant"])
                    .with_weight(0.6),
            )
            .add_edge(
                Hyperedge::new("hearing", "proceeding", ["judge", "plaintiff", "defendant"])
                    .with_attribute("stage", "trial"),
            );
        fixture
    }

    /// Give every node a seeded `dim`-dimensional embedding.
    pub fn with_random_embeddings(mut self, dim: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ids: Vec<NodeId> = self.hypergraph.node_ids().to_vec();
        for id in ids {
            let embedding = random_normal(dim, INIT_STD, &mut rng);
            self.hypergraph
                .set_embedding(&id, embedding)
                .expect("fixture embeddings share one dimension");
        }
        self
    }

    /// Add a node.
    ///
    /// # Panics
    ///
    /// Panics if the node id is already present.
    pub fn add_node(&mut self, node: Node) -> &mut Self {
        let id = node.id.clone();
        if let Err(err) = self.hypergraph.add_node(node) {
            panic!("fixture node '{id}' rejected: {err}");
        }
        self
    }

    /// Add a hyperedge.
    ///
    /// # Panics
    ///
    /// Panics if the hyperedge is rejected by the graph.
    pub fn add_edge(&mut self, edge: Hyperedge) -> &mut Self {
        let id = edge.id.clone();
        if let Err(err) = self.hypergraph.add_hyperedge(edge) {
            panic!("fixture hyperedge '{id}' rejected: {err}");
        }
        self
    }

    /// Get the hypergraph.
    pub const fn hypergraph(&self) -> &Hypergraph {
        &self.hypergraph
    }

    /// Get the hypergraph mutably.
    pub fn hypergraph_mut(&mut self) -> &mut Hypergraph {
        &mut self.hypergraph
    }

    /// Consume the fixture.
    pub fn into_hypergraph(self) -> Hypergraph {
        self.hypergraph
    }
}

/// Assertion helpers for testing hypergraphs.
pub struct HypergraphAssertions<'a> {
    hypergraph: &'a Hypergraph,
}

impl<'a> HypergraphAssertions<'a> {
    /// Create new assertions for a hypergraph.
    pub const fn new(hypergraph: &'a Hypergraph) -> Self {
        Self { hypergraph }
    }

    /// Assert that the hypergraph has the expected number of nodes.
    #[must_use]
    pub fn assert_node_count(self, expected: usize) -> Self {
        assert_eq!(
            self.hypergraph.node_count(),
            expected,
            "Expected {} nodes, found {}",
            expected,
            self.hypergraph.node_count()
        );
        self
    }

    /// Assert that the hypergraph has the expected number of hyperedges.
    #[must_use]
    pub fn assert_hyperedge_count(self, expected: usize) -> Self {
        assert_eq!(
            self.hypergraph.hyperedge_count(),
            expected,
            "Expected {} hyperedges, found {}",
            expected,
            self.hypergraph.hyperedge_count()
        );
        self
    }

    /// Assert that a node with the given type exists.
    #[must_use]
    pub fn assert_has_node_with_type(self, node_type: &str) -> Self {
        assert!(
            self.hypergraph.nodes().any(|n| n.has_type(node_type)),
            "Expected at least one node with type '{node_type}'"
        );
        self
    }

    /// Assert that a node has a specific attribute.
    #[must_use]
    pub fn assert_node_has_attribute(self, node_id: &str, key: &str, expected: &Value) -> Self {
        let node = self
            .hypergraph
            .get_node(node_id)
            .unwrap_or_else(|| panic!("Node {node_id} should exist"));
        assert_eq!(
            node.attribute(key),
            Some(expected),
            "Node {node_id} should have attribute {key} = {expected:?}"
        );
        self
    }

    /// Assert that a hyperedge involves a specific node.
    #[must_use]
    pub fn assert_hyperedge_involves(self, edge_id: &str, node_id: &str) -> Self {
        let edge = self
            .hypergraph
            .get_hyperedge(edge_id)
            .unwrap_or_else(|| panic!("Hyperedge {edge_id} should exist"));
        assert!(
            edge.involves(node_id),
            "Hyperedge {edge_id} should involve node {node_id}"
        );
        self
    }

    /// Assert that two nodes share at least one hyperedge.
    #[must_use]
    pub fn assert_adjacent(self, a: &str, b: &str) -> Self {
        assert!(
            self.hypergraph.neighbors(a).contains(b),
            "Nodes {a} and {b} should share a hyperedge"
        );
        self
    }

    /// Assert that every node carries an embedding of length `dim`.
    #[must_use]
    pub fn assert_embedding_dim(self, dim: usize) -> Self {
        for node in self.hypergraph.nodes() {
            assert_eq!(
                node.embedding_dim(),
                Some(dim),
                "Node {} should have a {dim}-dimensional embedding",
                node.id
            );
        }
        self
    }

    /// Assert that adjacency matches hyperedge membership in both directions.
    #[must_use]
    pub fn assert_adjacency_consistent(self) -> Self {
        for edge in self.hypergraph.hyperedges() {
            for member in edge.members() {
                assert!(
                    self.hypergraph.incident_edges(member).any(|e| *e == edge.id),
                    "Adjacency of {member} should list hyperedge {}",
                    edge.id
                );
            }
        }
        for node in self.hypergraph.nodes() {
            for edge_id in self.hypergraph.incident_edges(&node.id) {
                let edge = self
                    .hypergraph
                    .get_hyperedge(edge_id)
                    .unwrap_or_else(|| panic!("Dangling hyperedge {edge_id} in adjacency"));
                assert!(edge.involves(&node.id));
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_legal_case() {
        let fixture = HypergraphFixture::legal_case();

        let _ = HypergraphAssertions::new(fixture.hypergraph())
            .assert_node_count(6)
            .assert_hyperedge_count(3)
            .assert_has_node_with_type("person")
            .assert_has_node_with_type("evidence")
            .assert_hyperedge_involves("testimony", "witness")
            .assert_adjacent("judge", "defendant")
            .assert_node_has_attribute("plaintiff", "role", &Value::from("plaintiff"))
            .assert_adjacency_consistent();
    }

    #[test]
    fn test_fixture_ring() {
        let fixture = HypergraphFixture::ring(20, 15, 32, 42);

        let _ = HypergraphAssertions::new(fixture.hypergraph())
            .assert_node_count(20)
            .assert_hyperedge_count(15)
            .assert_embedding_dim(32)
            .assert_adjacent("node_3", "node_4")
            .assert_adjacency_consistent();

        // same seed, same embeddings
        let again = HypergraphFixture::ring(20, 15, 32, 42);
        assert_eq!(fixture.hypergraph(), again.hypergraph());
    }

    #[test]
    fn test_random_embeddings_are_seeded() {
        let a = HypergraphFixture::legal_case().with_random_embeddings(8, 3);
        let b = HypergraphFixture::legal_case().with_random_embeddings(8, 3);

        let _ = HypergraphAssertions::new(a.hypergraph()).assert_embedding_dim(8);
        assert_eq!(a.hypergraph(), b.hypergraph());
    }

    #[test]
    fn test_attrs_macro() {
        let map = attrs! { "count" => 3i64, "label" => "x" };
        assert_eq!(map.get("count"), Some(&Value::Int64(3)));
        assert_eq!(map.len(), 2);
    }
}
