//! Read-only queries over a hypergraph.
//!
//! Two nodes are adjacent when they co-occur in a hyperedge. All queries are
//! pure and return owned results; traversal order is deterministic (incident
//! hyperedges by ascending id, members by ascending id).

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use common_error::{HyperlexError, HyperlexResult};

use super::{EdgeId, Hypergraph, NodeId};
use crate::types::cosine_similarity;

/// Hyperedge type marking an explicit conflict between its members.
pub const CONFLICTS_EDGE_TYPE: &str = "conflicts";

/// A conflict recorded as a `conflicts` hyperedge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedConflict {
    /// First two members of the hyperedge, in member order.
    pub first: NodeId,
    pub second: NodeId,
    pub edge_id: EdgeId,
}

/// A node ranked by embedding similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarNode {
    /// Node id.
    pub node_id: NodeId,
    /// Cosine similarity to the query node.
    pub similarity: f32,
}

/// One hop of a breadth-first traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// Node the hop starts from.
    pub from: NodeId,
    /// Newly reached node.
    pub to: NodeId,
    /// Hyperedge connecting the two.
    pub edge_id: EdgeId,
    /// Hop count from the start node.
    pub depth: usize,
}

/// Breadth-first traversal tree rooted at a start node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningChain {
    /// Start node.
    pub start: NodeId,
    /// Hops in discovery order.
    pub steps: Vec<ReasoningStep>,
}

/// A path between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    /// Nodes from source to target inclusive.
    pub nodes: Vec<NodeId>,
    /// Hyperedges joining consecutive nodes.
    pub edges: Vec<EdgeId>,
}

/// Nodes within a hop radius and the hyperedges used to reach them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodResult {
    /// Reached nodes ordered by hop distance, excluding the start.
    pub nodes: Vec<NodeId>,
    /// Traversed hyperedges, first use first.
    pub edges: Vec<EdgeId>,
}

impl ReasoningChain {
    /// Whether the traversal reached nothing.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reached node ids in discovery order, excluding the start.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.steps.iter().map(|s| &s.to)
    }

    /// Deepest hop reached.
    pub fn depth(&self) -> usize {
        self.steps.iter().map(|s| s.depth).max().unwrap_or(0)
    }

    /// Reconstruct the traversal path from the start to `target`.
    pub fn path_to(&self, target: &str) -> Option<PathResult> {
        if target == self.start {
            return Some(PathResult {
                nodes: vec![self.start.clone()],
                edges: Vec::new(),
            });
        }
        let parents: HashMap<&str, &ReasoningStep> =
            self.steps.iter().map(|s| (s.to.as_str(), s)).collect();

        let mut nodes = vec![target.to_string()];
        let mut edges = Vec::new();
        let mut current = target;
        while current != self.start {
            let step = parents.get(current)?;
            edges.push(step.edge_id.clone());
            nodes.push(step.from.clone());
            current = &step.from;
        }
        nodes.reverse();
        edges.reverse();
        Some(PathResult { nodes, edges })
    }
}

impl Hypergraph {
    /// Extract the subgraph induced by `node_ids`.
    ///
    /// With `expand_neighbors`, the id set first grows by one hop. With
    /// `include_edges`, hyperedges fully contained in the final node set are
    /// kept; otherwise the result has no hyperedges. Unknown ids are skipped.
    pub fn query_subgraph<I, S>(
        &self,
        node_ids: I,
        include_edges: bool,
        expand_neighbors: bool,
    ) -> Hypergraph
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selected: HashSet<NodeId> = HashSet::new();
        for id in node_ids {
            let id = id.as_ref();
            if self.contains_node(id) {
                selected.insert(id.to_string());
            } else {
                warn!("Subgraph query ignoring unknown node '{id}'");
            }
        }

        if expand_neighbors {
            let frontier: Vec<NodeId> = selected.iter().cloned().collect();
            for id in &frontier {
                selected.extend(self.neighbors(id));
            }
        }

        let mut subgraph = Hypergraph::new();
        for node in self.nodes().filter(|n| selected.contains(&n.id)) {
            subgraph.push_node_unchecked(node.clone());
        }
        if include_edges {
            for edge in self
                .hyperedges()
                .filter(|e| e.is_within(|id| selected.contains(id)))
            {
                subgraph.push_edge_unchecked(edge.clone());
            }
        }

        debug!(
            "Subgraph query returned {} nodes, {} hyperedges",
            subgraph.node_count(),
            subgraph.hyperedge_count()
        );
        subgraph
    }

    /// Rank other nodes by cosine similarity to `node_id`.
    ///
    /// Keeps scores `>= threshold`, sorted descending with ties broken by
    /// ascending node id, truncated to `max_results`. Nodes without an
    /// embedding are skipped; the query node itself must have one.
    pub fn query_similar_nodes(
        &self,
        node_id: &str,
        threshold: f32,
        max_results: usize,
    ) -> HyperlexResult<Vec<SimilarNode>> {
        let node = self
            .get_node(node_id)
            .ok_or_else(|| HyperlexError::not_found(format!("node '{node_id}'")))?;
        let target = node.embedding.as_ref().ok_or_else(|| {
            HyperlexError::invalid_argument(format!("node '{node_id}' has no embedding"))
        })?;

        let mut ranked = Vec::new();
        for other in self.nodes().filter(|n| n.id != node_id) {
            let Some(embedding) = other.embedding.as_ref() else {
                continue;
            };
            let similarity = cosine_similarity(target, embedding)?;
            if similarity >= threshold {
                ranked.push(SimilarNode {
                    node_id: other.id.clone(),
                    similarity,
                });
            }
        }

        ranked.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        ranked.truncate(max_results);
        Ok(ranked)
    }

    /// Breadth-first traversal from `start_id` up to `max_depth` hops.
    ///
    /// Each newly reached node records the hop (source node, hyperedge,
    /// depth) that first reached it. An isolated start yields an empty chain.
    pub fn query_legal_reasoning_chain(
        &self,
        start_id: &str,
        max_depth: usize,
    ) -> HyperlexResult<ReasoningChain> {
        if !self.contains_node(start_id) {
            common_error::not_found_err!("node '{start_id}'");
        }

        let mut visited: HashSet<&str> = HashSet::from([start_id]);
        let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(start_id, 0)]);
        let mut steps = Vec::new();

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge_id in self.incident_edges(current) {
                let Some(edge) = self.get_hyperedge(edge_id) else {
                    continue;
                };
                let mut members: Vec<&NodeId> = edge.members().iter().collect();
                members.sort();
                for member in members {
                    if visited.insert(member.as_str()) {
                        steps.push(ReasoningStep {
                            from: current.to_string(),
                            to: member.clone(),
                            edge_id: edge_id.clone(),
                            depth: depth + 1,
                        });
                        queue.push_back((member.as_str(), depth + 1));
                    }
                }
            }
        }

        debug!(
            "Reasoning chain from '{start_id}' reached {} nodes",
            steps.len()
        );
        Ok(ReasoningChain {
            start: start_id.to_string(),
            steps,
        })
    }

    /// Nodes within `max_hops` of `node_id`, nearest first.
    pub fn query_neighbors(
        &self,
        node_id: &str,
        max_hops: usize,
    ) -> HyperlexResult<NeighborhoodResult> {
        let chain = self.query_legal_reasoning_chain(node_id, max_hops)?;
        let nodes = chain.nodes().cloned().collect();
        let mut edges: Vec<EdgeId> = Vec::new();
        for step in &chain.steps {
            if !edges.contains(&step.edge_id) {
                edges.push(step.edge_id.clone());
            }
        }
        Ok(NeighborhoodResult { nodes, edges })
    }

    /// Shortest hyperedge path between two nodes using at most `max_depth` hops.
    pub fn query_path(
        &self,
        source: &str,
        target: &str,
        max_depth: usize,
    ) -> HyperlexResult<Option<PathResult>> {
        if !self.contains_node(target) {
            common_error::not_found_err!("node '{target}'");
        }
        let chain = self.query_legal_reasoning_chain(source, max_depth)?;
        Ok(chain.path_to(target))
    }

    /// Conflicts stated explicitly by [`CONFLICTS_EDGE_TYPE`] hyperedges,
    /// ascending by edge id.
    pub fn find_conflicts(&self) -> Vec<RecordedConflict> {
        self.get_edges_by_type(CONFLICTS_EDGE_TYPE)
            .into_iter()
            .filter_map(|edge| match edge.members() {
                [first, second, ..] => Some(RecordedConflict {
                    first: first.clone(),
                    second: second.clone(),
                    edge_id: edge.id.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}
