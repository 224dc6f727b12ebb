//! Downstream analysis over refined embeddings: communities, link
//! predictions, conflicts and node importance, plus the end-to-end pipeline.

use std::collections::{BTreeMap, HashMap};

use log::info;
use serde::{Deserialize, Serialize};

use common_config::{AnalysisConfig, HyperlexConfig};
use common_error::HyperlexResult;
use hyperlex_core::types::{cosine_similarity, norm, Embedding};
use hyperlex_core::{GraphExport, GraphStatistics, HasAttributes, Hypergraph, Node, NodeId};

use crate::model::HyperGNN;

/// Slack applied to similarity thresholds so summation order in the parallel
/// forward pass cannot flip a borderline decision.
pub const SCORE_TOLERANCE: f64 = 1e-6;

/// Node types compared by [`detect_conflicts`].
pub const CONFLICT_NODE_TYPES: [&str; 2] = ["principle", "precedent"];

/// Node attribute naming the area of law a node belongs to.
pub const LEGAL_DOMAIN_ATTRIBUTE: &str = "legal_domain";

/// Leading nodes and dimensions echoed in [`AnalysisReport::sample_embeddings`].
const SAMPLE_SIZE: usize = 5;

/// A scored, not yet observed relation between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPrediction {
    /// Lexicographically smaller id of the pair.
    pub source: NodeId,
    pub target: NodeId,
    pub score: f32,
}

/// Two same-domain nodes whose embeddings point in opposite directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedConflict {
    pub first: NodeId,
    pub second: NodeId,
    /// Magnitude of the (negative) cosine similarity.
    pub score: f32,
}

/// Output of [`run_analysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub graph_statistics: GraphStatistics,
    /// Community index of every embedded node.
    pub communities: BTreeMap<NodeId, usize>,
    pub num_communities: usize,
    pub link_predictions: Vec<LinkPrediction>,
    pub node_importance: BTreeMap<NodeId, f64>,
    #[serde(default)]
    pub detected_conflicts: Vec<DetectedConflict>,
    /// First dimensions of the first nodes' refined embeddings.
    pub sample_embeddings: BTreeMap<NodeId, Embedding>,
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // keep the earlier node as root
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

/// Embedded nodes of `graph` in insertion order.
fn embedded<'a>(
    graph: &'a Hypergraph,
    embeddings: &'a HashMap<NodeId, Embedding>,
) -> Vec<(&'a NodeId, &'a Embedding)> {
    graph
        .node_ids()
        .iter()
        .filter_map(|id| embeddings.get(id).map(|e| (id, e)))
        .collect()
}

/// Connected components of the graph linking nodes whose embeddings have
/// cosine similarity `>= threshold`.
///
/// Communities are numbered from 0 in order of their first member in
/// `graph`'s insertion order. Nodes without an embedding are left out.
pub fn detect_communities(
    graph: &Hypergraph,
    embeddings: &HashMap<NodeId, Embedding>,
    threshold: f64,
) -> HyperlexResult<BTreeMap<NodeId, usize>> {
    let nodes = embedded(graph, embeddings);
    let mut components = DisjointSet::new(nodes.len());
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let similarity = f64::from(cosine_similarity(nodes[i].1, nodes[j].1)?);
            if similarity >= threshold - SCORE_TOLERANCE {
                components.union(i, j);
            }
        }
    }

    let mut numbering: HashMap<usize, usize> = HashMap::new();
    let mut communities = BTreeMap::new();
    for (i, (id, _)) in nodes.iter().enumerate() {
        let root = components.find(i);
        let next = numbering.len();
        let community = *numbering.entry(root).or_insert(next);
        communities.insert((*id).clone(), community);
    }
    Ok(communities)
}

/// Number of distinct communities in a [`detect_communities`] result.
pub fn count_communities(communities: &BTreeMap<NodeId, usize>) -> usize {
    communities.values().max().map_or(0, |max| max + 1)
}

/// Score pairs among the first `max_link_candidates` embedded nodes that do
/// not already share a hyperedge.
///
/// Pairs scoring `>= link_threshold` are returned best first, ties broken by
/// ascending `(source, target)`, truncated to `max_link_predictions`.
pub fn predict_links(
    graph: &Hypergraph,
    embeddings: &HashMap<NodeId, Embedding>,
    config: &AnalysisConfig,
) -> HyperlexResult<Vec<LinkPrediction>> {
    let candidates: Vec<(&NodeId, &Embedding)> = embedded(graph, embeddings)
        .into_iter()
        .take(config.max_link_candidates)
        .collect();

    let mut predictions = Vec::new();
    for (i, (a, ea)) in candidates.iter().enumerate() {
        let linked = graph.neighbors(a);
        for (b, eb) in &candidates[i + 1..] {
            if linked.contains(*b) {
                continue;
            }
            let score = cosine_similarity(ea, eb)?;
            if f64::from(score) >= config.link_threshold - SCORE_TOLERANCE {
                let (source, target) = if a <= b { (a, b) } else { (b, a) };
                predictions.push(LinkPrediction {
                    source: (*source).clone(),
                    target: (*target).clone(),
                    score,
                });
            }
        }
    }

    predictions.sort_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then_with(|| x.source.cmp(&y.source))
            .then_with(|| x.target.cmp(&y.target))
    });
    predictions.truncate(config.max_link_predictions);
    Ok(predictions)
}

/// Pairs of principles or precedents sharing a legal domain whose cosine
/// similarity is at most `-threshold`.
///
/// Principles come first, then precedents, each ascending by id; pairs keep
/// that order. Nodes without an embedding or a string `legal_domain` are
/// skipped. Results are strongest first, ties in candidate order.
pub fn detect_conflicts(
    graph: &Hypergraph,
    embeddings: &HashMap<NodeId, Embedding>,
    threshold: f64,
) -> HyperlexResult<Vec<DetectedConflict>> {
    let candidates: Vec<(&Node, &str, &Embedding)> = CONFLICT_NODE_TYPES
        .iter()
        .flat_map(|node_type| graph.get_nodes_by_type(node_type))
        .filter_map(|node| {
            let domain = node.text_attribute(LEGAL_DOMAIN_ATTRIBUTE)?;
            Some((node, domain, embeddings.get(&node.id)?))
        })
        .collect();

    let mut conflicts = Vec::new();
    for (i, (a, domain_a, ea)) in candidates.iter().enumerate() {
        for (b, domain_b, eb) in &candidates[i + 1..] {
            if domain_a != domain_b {
                continue;
            }
            let similarity = cosine_similarity(ea, eb)?;
            if f64::from(similarity) <= -threshold + SCORE_TOLERANCE {
                conflicts.push(DetectedConflict {
                    first: a.id.clone(),
                    second: b.id.clone(),
                    score: similarity.abs(),
                });
            }
        }
    }
    conflicts.sort_by(|x, y| y.score.total_cmp(&x.score));
    Ok(conflicts)
}

/// `0.5 * degree / |nodes| + 0.5 * |embedding| / 10` for every node.
pub fn node_importance(
    graph: &Hypergraph,
    embeddings: &HashMap<NodeId, Embedding>,
) -> BTreeMap<NodeId, f64> {
    let total = graph.node_count().max(1) as f64;
    graph
        .node_ids()
        .iter()
        .map(|id| {
            let degree = graph.degree(id) as f64;
            let magnitude = embeddings.get(id).map_or(0.0, |e| f64::from(norm(e)));
            (id.clone(), 0.5 * degree / total + 0.5 * magnitude / 10.0)
        })
        .collect()
}

/// Build a graph from `records`, refine it and analyse the result.
pub fn run_analysis(records: GraphExport, config: &HyperlexConfig) -> HyperlexResult<AnalysisReport> {
    config.validate()?;
    info!(
        "Starting HyperGNN analysis over {} entities and {} relations",
        records.nodes.len(),
        records.edges.len()
    );

    let mut graph = records.into_hypergraph()?;
    let mut model = HyperGNN::new(config.gnn.clone(), config.analysis.seed)?
        .with_aggregation(config.analysis.aggregation);
    model.initialize_embeddings(&mut graph)?;
    let embeddings = model.forward(&graph)?;

    let communities =
        detect_communities(&graph, &embeddings, config.analysis.community_threshold)?;
    let num_communities = count_communities(&communities);
    let link_predictions = predict_links(&graph, &embeddings, &config.analysis)?;
    let importance = node_importance(&graph, &embeddings);
    let detected_conflicts =
        detect_conflicts(&graph, &embeddings, config.analysis.conflict_threshold)?;

    let sample_embeddings = graph
        .node_ids()
        .iter()
        .take(SAMPLE_SIZE)
        .filter_map(|id| {
            let embedding = embeddings.get(id)?;
            Some((id.clone(), embedding.iter().take(SAMPLE_SIZE).copied().collect()))
        })
        .collect();

    info!(
        "HyperGNN analysis completed: {num_communities} communities, {} link predictions, {} conflicts",
        link_predictions.len(),
        detected_conflicts.len()
    );
    Ok(AnalysisReport {
        graph_statistics: graph.statistics(),
        communities,
        num_communities,
        link_predictions,
        node_importance: importance,
        detected_conflicts,
        sample_embeddings,
    })
}
