//! Hypergraph container - node/edge storage with a derived adjacency index.
//!
//! Nodes and hyperedges live in id-keyed maps; every cross-reference
//! (hyperedge members, adjacency entries) stores identifiers, never aliases.
//! Insertion order is tracked separately so iteration and export are
//! deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use common_error::{HyperlexError, HyperlexResult};

use super::{EdgeId, Hyperedge, Label, Node, NodeId};
use crate::types::{ensure_same_dim, Embedding};

/// A hypergraph of embedded nodes joined by weighted hyperedges.
///
/// ## Invariants
///
/// - every hyperedge has at least two distinct members, all present as nodes
/// - `adjacency[n]` holds exactly the ids of hyperedges that list `n`
/// - a node's embedding length never changes once set
/// - `nodes_by_type` / `edges_by_type` list every element under its type,
///   with no empty entries
///
/// ## Example
///
/// ```rust
/// use hyperlex_core::{Hyperedge, Hypergraph, Node};
///
/// let mut hg = Hypergraph::new();
/// hg.add_node(Node::new("statute", "statute")).unwrap();
/// hg.add_node(Node::new("case", "case")).unwrap();
/// hg.add_hyperedge(Hyperedge::new("cites", "cites", ["case", "statute"]))
///     .unwrap();
///
/// assert_eq!(hg.degree("case"), 1);
/// assert!(hg.neighbors("statute").contains("case"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hypergraph {
    nodes: HashMap<NodeId, Node>,
    hyperedges: HashMap<EdgeId, Hyperedge>,
    adjacency: HashMap<NodeId, BTreeSet<EdgeId>>,
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
    nodes_by_type: BTreeMap<Label, BTreeSet<NodeId>>,
    edges_by_type: BTreeMap<Label, BTreeSet<EdgeId>>,
}

/// Summary counts for a hypergraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStatistics {
    /// Number of nodes.
    pub num_nodes: usize,
    /// Number of hyperedges.
    pub num_hyperedges: usize,
    /// Mean number of incident hyperedges per node.
    pub avg_node_degree: f64,
    /// Largest number of incident hyperedges on one node.
    pub max_node_degree: usize,
    /// Mean hyperedge arity.
    pub avg_edge_size: f64,
    /// Largest hyperedge arity.
    pub max_edge_size: usize,
    /// Node count per node type.
    #[serde(default)]
    pub node_type_distribution: BTreeMap<Label, usize>,
    /// Hyperedge count per hyperedge type.
    #[serde(default)]
    pub edge_type_distribution: BTreeMap<Label, usize>,
}

impl Hypergraph {
    /// Create a new empty hypergraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of hyperedges.
    pub fn hyperedge_count(&self) -> usize {
        self.hyperedges.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a node with an empty adjacency entry.
    ///
    /// Fails with `DuplicateId` if the id is already present.
    pub fn add_node(&mut self, node: Node) -> HyperlexResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(HyperlexError::duplicate_id(format!("node '{}'", node.id)));
        }
        debug!("Adding node '{}' ({})", node.id, node.node_type);
        self.push_node_unchecked(node);
        Ok(())
    }

    /// Insert a hyperedge and index it under every member.
    ///
    /// Fails with `DuplicateId` for a known edge id, `InvalidArgument` for
    /// fewer than two members or a weight outside `[0, 1]`, and `NotFound`
    /// when a member is not a node of this graph.
    pub fn add_hyperedge(&mut self, edge: Hyperedge) -> HyperlexResult<()> {
        if self.hyperedges.contains_key(&edge.id) {
            return Err(HyperlexError::duplicate_id(format!("hyperedge '{}'", edge.id)));
        }
        self.check_hyperedge(&edge)?;

        debug!(
            "Adding hyperedge '{}' ({}) over {} nodes",
            edge.id,
            edge.edge_type,
            edge.arity()
        );
        self.push_edge_unchecked(edge);
        Ok(())
    }

    /// Validate arity, weight and member presence without touching the graph.
    pub(crate) fn check_hyperedge(&self, edge: &Hyperedge) -> HyperlexResult<()> {
        if edge.arity() < 2 {
            return Err(HyperlexError::invalid_argument(format!(
                "hyperedge '{}' has {} distinct member(s); at least 2 are required",
                edge.id,
                edge.arity()
            )));
        }
        if let Some(missing) = edge.members().iter().find(|m| !self.nodes.contains_key(*m)) {
            common_error::not_found_err!(
                "node '{missing}' referenced by hyperedge '{}'",
                edge.id
            );
        }
        if !(0.0..=1.0).contains(&edge.weight) {
            return Err(HyperlexError::invalid_argument(format!(
                "hyperedge '{}' weight {} is outside [0, 1]",
                edge.id, edge.weight
            )));
        }
        Ok(())
    }

    /// Remove a hyperedge and its adjacency entries.
    pub fn remove_hyperedge(&mut self, edge_id: &str) -> HyperlexResult<Hyperedge> {
        let edge = self
            .hyperedges
            .remove(edge_id)
            .ok_or_else(|| HyperlexError::not_found(format!("hyperedge '{edge_id}'")))?;
        for member in edge.members() {
            if let Some(incident) = self.adjacency.get_mut(member) {
                incident.remove(edge_id);
            }
        }
        unindex(&mut self.edges_by_type, &edge.edge_type, edge_id);
        self.edge_order.retain(|id| id != edge_id);
        debug!("Removed hyperedge '{edge_id}'");
        Ok(edge)
    }

    /// Remove a node, detaching it from every hyperedge that lists it.
    ///
    /// A hyperedge left with fewer than two members is removed as well.
    pub fn remove_node(&mut self, node_id: &str) -> HyperlexResult<Node> {
        let node = self
            .nodes
            .remove(node_id)
            .ok_or_else(|| HyperlexError::not_found(format!("node '{node_id}'")))?;
        let incident = self.adjacency.remove(node_id).unwrap_or_default();

        for edge_id in incident {
            let undersized = match self.hyperedges.get_mut(&edge_id) {
                Some(edge) => {
                    edge.remove_member(node_id);
                    edge.arity() < 2
                }
                None => false,
            };
            if undersized {
                self.remove_hyperedge(&edge_id)?;
            }
        }

        unindex(&mut self.nodes_by_type, &node.node_type, node_id);
        self.node_order.retain(|id| id != node_id);
        debug!("Removed node '{node_id}'");
        Ok(node)
    }

    /// Insert a node copied from a graph that already validated it.
    pub(crate) fn push_node_unchecked(&mut self, node: Node) {
        self.adjacency.entry(node.id.clone()).or_default();
        self.nodes_by_type
            .entry(node.node_type.clone())
            .or_default()
            .insert(node.id.clone());
        self.node_order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }

    /// Insert a hyperedge whose members are known to be present.
    pub(crate) fn push_edge_unchecked(&mut self, edge: Hyperedge) {
        for member in edge.members() {
            self.adjacency
                .entry(member.clone())
                .or_default()
                .insert(edge.id.clone());
        }
        self.edges_by_type
            .entry(edge.edge_type.clone())
            .or_default()
            .insert(edge.id.clone());
        self.edge_order.push(edge.id.clone());
        self.hyperedges.insert(edge.id.clone(), edge);
    }

    /// Swap in a new definition for `edge.id`, keeping its insertion position.
    pub(crate) fn replace_hyperedge_unchecked(&mut self, edge: Hyperedge) {
        match self.hyperedges.remove(&edge.id) {
            Some(previous) => {
                for member in previous.members() {
                    if let Some(incident) = self.adjacency.get_mut(member) {
                        incident.remove(&edge.id);
                    }
                }
                unindex(&mut self.edges_by_type, &previous.edge_type, &edge.id);
            }
            None => self.edge_order.push(edge.id.clone()),
        }
        for member in edge.members() {
            self.adjacency
                .entry(member.clone())
                .or_default()
                .insert(edge.id.clone());
        }
        self.edges_by_type
            .entry(edge.edge_type.clone())
            .or_default()
            .insert(edge.id.clone());
        self.hyperedges.insert(edge.id.clone(), edge);
    }

    /// Get a node by ID.
    pub fn get_node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Get a hyperedge by ID.
    pub fn get_hyperedge(&self, edge_id: &str) -> Option<&Hyperedge> {
        self.hyperedges.get(edge_id)
    }

    /// Check node membership.
    pub fn contains_node(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Check hyperedge membership.
    pub fn contains_hyperedge(&self, edge_id: &str) -> bool {
        self.hyperedges.contains_key(edge_id)
    }

    /// Iterate nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Iterate hyperedges in insertion order.
    pub fn hyperedges(&self) -> impl Iterator<Item = &Hyperedge> {
        self.edge_order.iter().filter_map(|id| self.hyperedges.get(id))
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    /// Hyperedge ids in insertion order.
    pub fn hyperedge_ids(&self) -> &[EdgeId] {
        &self.edge_order
    }

    /// Nodes of one type, ascending by id.
    pub fn get_nodes_by_type(&self, node_type: &str) -> Vec<&Node> {
        self.nodes_by_type
            .get(node_type)
            .into_iter()
            .flatten()
            .filter_map(|id| self.nodes.get(id))
            .collect()
    }

    /// Hyperedges of one type, ascending by id.
    pub fn get_edges_by_type(&self, edge_type: &str) -> Vec<&Hyperedge> {
        self.edges_by_type
            .get(edge_type)
            .into_iter()
            .flatten()
            .filter_map(|id| self.hyperedges.get(id))
            .collect()
    }

    /// Ids of hyperedges incident to a node, ascending. Empty for unknown ids.
    pub fn incident_edges(&self, node_id: &str) -> impl Iterator<Item = &EdgeId> {
        self.adjacency.get(node_id).into_iter().flatten()
    }

    /// Number of incident hyperedges.
    pub fn degree(&self, node_id: &str) -> usize {
        self.adjacency.get(node_id).map_or(0, BTreeSet::len)
    }

    /// Nodes sharing at least one hyperedge with `node_id`, ascending.
    pub fn neighbors(&self, node_id: &str) -> BTreeSet<NodeId> {
        self.incident_edges(node_id)
            .filter_map(|edge_id| self.hyperedges.get(edge_id))
            .flat_map(|edge| edge.members().iter())
            .filter(|member| member.as_str() != node_id)
            .cloned()
            .collect()
    }

    /// Set a node's embedding.
    ///
    /// A node whose embedding is already set only accepts vectors of the
    /// same length (`DimensionMismatch` otherwise).
    pub fn set_embedding(&mut self, node_id: &str, embedding: Embedding) -> HyperlexResult<()> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| HyperlexError::not_found(format!("node '{node_id}'")))?;
        if let Some(dim) = node.embedding_dim() {
            if dim != embedding.len() {
                return Err(HyperlexError::dimension_mismatch(dim, embedding.len()));
            }
        }
        node.embedding = Some(embedding);
        Ok(())
    }

    /// Build a new graph with the same structure and the given embeddings.
    ///
    /// Nodes absent from `embeddings` keep their current embedding. The new
    /// length may differ from this graph's (refined embeddings usually have
    /// the hidden dimension), but then every node that already has an
    /// embedding must be covered, so the result never mixes lengths.
    pub fn with_embeddings(&self, embeddings: &HashMap<NodeId, Embedding>) -> HyperlexResult<Self> {
        if let Some(unknown) = embeddings.keys().find(|id| !self.nodes.contains_key(*id)) {
            common_error::not_found_err!("node '{unknown}'");
        }
        if !embeddings.is_empty() {
            let vectors: Vec<&Embedding> = embeddings.values().collect();
            let new_dim = ensure_same_dim(&vectors)?;
            if let Some(current) = self.embedding_dim()?.filter(|&d| d != new_dim) {
                if let Some(stale) = self
                    .nodes()
                    .find(|n| n.embedding.is_some() && !embeddings.contains_key(&n.id))
                {
                    return Err(HyperlexError::invalid_argument(format!(
                        "node '{}' would keep a {current}-dim embedding beside {new_dim}-dim ones",
                        stale.id
                    )));
                }
            }
        }
        let mut graph = self.clone();
        for (node_id, embedding) in embeddings {
            if let Some(node) = graph.nodes.get_mut(node_id) {
                node.embedding = Some(embedding.clone());
            }
        }
        Ok(graph)
    }

    /// Common length of all initialised embeddings, `None` if there are none.
    pub fn embedding_dim(&self) -> HyperlexResult<Option<usize>> {
        let mut dim = None;
        for node in self.nodes() {
            match (dim, node.embedding_dim()) {
                (None, Some(d)) => dim = Some(d),
                (Some(expected), Some(actual)) if expected != actual => {
                    return Err(HyperlexError::dimension_mismatch(expected, actual));
                }
                _ => {}
            }
        }
        Ok(dim)
    }

    /// Compute summary statistics.
    pub fn statistics(&self) -> GraphStatistics {
        let degrees: Vec<usize> = self.node_order.iter().map(|id| self.degree(id)).collect();
        let sizes: Vec<usize> = self.hyperedges().map(Hyperedge::arity).collect();

        GraphStatistics {
            num_nodes: self.node_count(),
            num_hyperedges: self.hyperedge_count(),
            avg_node_degree: average(&degrees),
            max_node_degree: degrees.iter().copied().max().unwrap_or(0),
            avg_edge_size: average(&sizes),
            max_edge_size: sizes.iter().copied().max().unwrap_or(0),
            node_type_distribution: distribution(&self.nodes_by_type),
            edge_type_distribution: distribution(&self.edges_by_type),
        }
    }
}

fn distribution(index: &BTreeMap<Label, BTreeSet<String>>) -> BTreeMap<Label, usize> {
    index.iter().map(|(label, ids)| (label.clone(), ids.len())).collect()
}

/// Drop `id` from `label`'s entry, removing the entry once empty.
fn unindex(index: &mut BTreeMap<Label, BTreeSet<String>>, label: &str, id: &str) {
    if let Some(ids) = index.get_mut(label) {
        ids.remove(id);
        if ids.is_empty() {
            index.remove(label);
        }
    }
}

fn average(values: &[usize]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<usize>() as f64 / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Hypergraph {
        let mut hg = Hypergraph::new();
        for id in ["a", "b", "c", "d"] {
            hg.add_node(Node::new(id, "party")).unwrap();
        }
        hg.add_hyperedge(Hyperedge::new("e1", "contract", ["a", "b", "c"]))
            .unwrap();
        hg.add_hyperedge(Hyperedge::new("e2", "dispute", ["a", "b"]).with_weight(0.5))
            .unwrap();
        hg
    }

    #[test]
    fn test_hypergraph_creation() {
        let hg = Hypergraph::new();
        assert_eq!(hg.node_count(), 0);
        assert_eq!(hg.hyperedge_count(), 0);
        assert!(hg.is_empty());
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut hg = Hypergraph::new();
        hg.add_node(Node::new("a", "party")).unwrap();
        let err = hg.add_node(Node::new("a", "judge")).unwrap_err();
        assert!(matches!(err, HyperlexError::DuplicateId(_)));
        assert_eq!(hg.get_node("a").unwrap().node_type, "party");
    }

    #[test]
    fn test_add_hyperedge_validation() {
        let mut hg = triangle();

        let dangling = Hyperedge::new("e3", "cites", ["a", "zz"]);
        assert!(hg.add_hyperedge(dangling).unwrap_err().is_not_found());

        let single = Hyperedge::new("e4", "cites", ["a", "a"]);
        assert!(matches!(
            hg.add_hyperedge(single),
            Err(HyperlexError::InvalidArgument(_))
        ));

        let heavy = Hyperedge::new("e5", "cites", ["a", "d"]).with_weight(1.5);
        assert!(matches!(
            hg.add_hyperedge(heavy),
            Err(HyperlexError::InvalidArgument(_))
        ));

        let again = Hyperedge::new("e1", "cites", ["a", "d"]);
        assert!(matches!(
            hg.add_hyperedge(again),
            Err(HyperlexError::DuplicateId(_))
        ));

        assert_eq!(hg.hyperedge_count(), 2);
        assert_eq!(hg.degree("d"), 0);
    }

    #[test]
    fn test_adjacency_and_neighbors() {
        let hg = triangle();

        assert_eq!(hg.degree("a"), 2);
        assert_eq!(hg.degree("c"), 1);
        assert_eq!(hg.degree("d"), 0);
        assert_eq!(
            hg.incident_edges("a").cloned().collect::<Vec<_>>(),
            vec!["e1".to_string(), "e2".to_string()]
        );
        assert_eq!(
            hg.neighbors("c").into_iter().collect::<Vec<_>>(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(hg.neighbors("d").is_empty());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut hg = triangle();
        hg.remove_node("b").unwrap();

        // e2 = {a, b} dropped below two members, e1 = {a, b, c} survives as {a, c}
        assert!(!hg.contains_hyperedge("e2"));
        assert_eq!(hg.get_hyperedge("e1").unwrap().members(), ["a", "c"]);
        assert_eq!(hg.degree("a"), 1);
        assert_eq!(hg.node_ids(), ["a", "c", "d"]);
        assert!(hg.remove_node("b").unwrap_err().is_not_found());
    }

    #[test]
    fn test_remove_hyperedge_cleans_adjacency() {
        let mut hg = triangle();
        let removed = hg.remove_hyperedge("e1").unwrap();

        assert_eq!(removed.arity(), 3);
        assert_eq!(hg.degree("c"), 0);
        assert_eq!(hg.degree("a"), 1);
        assert_eq!(hg.hyperedge_ids(), ["e2"]);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut hg = Hypergraph::new();
        for id in ["z", "m", "a"] {
            hg.add_node(Node::new(id, "t")).unwrap();
        }
        let ids: Vec<&str> = hg.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["z", "m", "a"]);
    }

    #[test]
    fn test_embedding_length_is_fixed() {
        let mut hg = Hypergraph::new();
        hg.add_node(Node::new("a", "t").with_embedding(vec![1.0, 0.0])).unwrap();

        hg.set_embedding("a", vec![0.5, 0.5]).unwrap();
        let err = hg.set_embedding("a", vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            HyperlexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert!(hg.set_embedding("missing", vec![]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_with_embeddings_builds_new_graph() {
        let hg = triangle();
        let mut refined = HashMap::new();
        refined.insert("a".to_string(), vec![0.1, 0.2, 0.3]);

        let next = hg.with_embeddings(&refined).unwrap();
        assert_eq!(next.get_node("a").unwrap().embedding_dim(), Some(3));
        assert_eq!(hg.get_node("a").unwrap().embedding_dim(), None);
        assert_eq!(next.hyperedge_count(), hg.hyperedge_count());

        refined.insert("nope".to_string(), vec![]);
        assert!(hg.with_embeddings(&refined).is_err());
    }

    #[test]
    fn test_with_embeddings_rejects_mixed_lengths() {
        let mut hg = triangle();
        for id in ["a", "b"] {
            hg.set_embedding(id, vec![1.0, 0.0]).unwrap();
        }

        let partial: HashMap<NodeId, Embedding> =
            HashMap::from([("a".to_string(), vec![0.1, 0.2, 0.3])]);
        assert!(matches!(
            hg.with_embeddings(&partial),
            Err(HyperlexError::InvalidArgument(_))
        ));

        let uneven: HashMap<NodeId, Embedding> = HashMap::from([
            ("a".to_string(), vec![0.1, 0.2, 0.3]),
            ("b".to_string(), vec![0.1]),
        ]);
        assert!(matches!(
            hg.with_embeddings(&uneven),
            Err(HyperlexError::DimensionMismatch { .. })
        ));

        // same length as before: partial updates stay allowed
        let same: HashMap<NodeId, Embedding> = HashMap::from([("a".to_string(), vec![0.0, 1.0])]);
        assert_eq!(hg.with_embeddings(&same).unwrap().embedding_dim().unwrap(), Some(2));

        // covering every embedded node permits a new length
        let full: HashMap<NodeId, Embedding> = HashMap::from([
            ("a".to_string(), vec![0.1, 0.2, 0.3]),
            ("b".to_string(), vec![0.3, 0.2, 0.1]),
        ]);
        assert_eq!(hg.with_embeddings(&full).unwrap().embedding_dim().unwrap(), Some(3));
    }

    #[test]
    fn test_type_indexes_follow_mutations() {
        let mut hg = triangle();
        hg.add_node(Node::new("s1", "statute")).unwrap();
        hg.add_hyperedge(Hyperedge::new("e3", "dispute", ["c", "s1"])).unwrap();

        let parties: Vec<&str> = hg
            .get_nodes_by_type("party")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(parties, ["a", "b", "c", "d"]);
        assert_eq!(hg.get_edges_by_type("dispute").len(), 2);
        assert!(hg.get_nodes_by_type("judge").is_empty());

        hg.remove_node("s1").unwrap();
        assert!(hg.get_nodes_by_type("statute").is_empty());
        // e3 fell below two members with s1 gone
        let disputes: Vec<&str> = hg
            .get_edges_by_type("dispute")
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(disputes, ["e2"]);

        hg.remove_hyperedge("e2").unwrap();
        let stats = hg.statistics();
        assert_eq!(stats.edge_type_distribution, BTreeMap::from([("contract".to_string(), 1)]));
        assert_eq!(stats.node_type_distribution, BTreeMap::from([("party".to_string(), 4)]));
    }

    #[test]
    fn test_statistics() {
        let stats = triangle().statistics();

        assert_eq!(stats.num_nodes, 4);
        assert_eq!(stats.num_hyperedges, 2);
        assert_eq!(stats.max_node_degree, 2);
        assert_eq!(stats.max_edge_size, 3);
        assert!((stats.avg_node_degree - 5.0 / 4.0).abs() < 1e-12);
        assert!((stats.avg_edge_size - 2.5).abs() < 1e-12);
        assert_eq!(stats.node_type_distribution["party"], 4);
        assert_eq!(
            stats.edge_type_distribution,
            BTreeMap::from([("contract".to_string(), 1), ("dispute".to_string(), 1)])
        );
    }
}
