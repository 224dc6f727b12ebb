//! Single-level coarsening.
//!
//! Nodes are partitioned into `k` clusters by a k-means style refinement over
//! a score combining embedding similarity to each cluster centroid with
//! co-membership affinity: for every hyperedge a node belongs to, the cluster
//! gets `weight * share of the edge's other members already in it`. Each
//! cluster becomes one node of the coarse graph, and every original hyperedge
//! is projected onto the set of clusters it touches.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use common_config::CoarseningConfig;
use common_error::{HyperlexError, HyperlexResult};

use crate::hypergraph::{HasAttributes, Hyperedge, Hypergraph, Node, NodeId};
use crate::types::{cosine_similarity, mean, Embedding};

/// Node type of cluster nodes.
pub const CLUSTER_NODE_TYPE: &str = "cluster";
/// Edge type of projected hyperedges.
pub const COARSE_EDGE_TYPE: &str = "coarse";

/// Membership of one node: the other members of each incident hyperedge.
struct Incidence {
    weight: f64,
    others: Vec<usize>,
}

struct Partition<'a> {
    vectors: Vec<Embedding>,
    incidence: Vec<Vec<Incidence>>,
    config: &'a CoarseningConfig,
}

impl Partition<'_> {
    fn centroids(&self, assignment: &[usize], k: usize) -> HyperlexResult<Vec<Embedding>> {
        let mut members: Vec<Vec<&Embedding>> = vec![Vec::new(); k];
        for (node, &cluster) in assignment.iter().enumerate() {
            members[cluster].push(&self.vectors[node]);
        }
        members
            .iter()
            .map(|vectors| {
                if vectors.is_empty() {
                    Ok(Vec::new())
                } else {
                    mean(vectors)
                }
            })
            .collect()
    }

    fn score(
        &self,
        node: usize,
        cluster: usize,
        centroid: &[f32],
        assignment: &[usize],
    ) -> HyperlexResult<f64> {
        let similarity = if centroid.is_empty() {
            0.0
        } else {
            f64::from(cosine_similarity(&self.vectors[node], centroid)?)
        };
        let affinity: f64 = self.incidence[node]
            .iter()
            .map(|inc| {
                let shared = inc.others.iter().filter(|&&u| assignment[u] == cluster).count();
                inc.weight * shared as f64 / inc.others.len() as f64
            })
            .sum();
        Ok(similarity + self.config.affinity_weight * affinity)
    }

    fn reassign(
        &self,
        assignment: &[usize],
        centroids: &[Embedding],
    ) -> HyperlexResult<Vec<usize>> {
        (0..assignment.len())
            .map(|node| {
                let mut best = (0, f64::NEG_INFINITY);
                for (cluster, centroid) in centroids.iter().enumerate() {
                    let score = self.score(node, cluster, centroid, assignment)?;
                    if score > best.1 {
                        best = (cluster, score);
                    }
                }
                Ok(best.0)
            })
            .collect()
    }

    /// Move the weakest member of the largest cluster into each empty cluster.
    fn fill_empty(&self, assignment: &mut [usize], centroids: &[Embedding]) -> HyperlexResult<()> {
        let k = centroids.len();
        loop {
            let mut sizes = vec![0usize; k];
            for &cluster in assignment.iter() {
                sizes[cluster] += 1;
            }
            let Some(empty) = sizes.iter().position(|&size| size == 0) else {
                return Ok(());
            };
            let largest = (0..k)
                .max_by(|&a, &b| sizes[a].cmp(&sizes[b]).then_with(|| b.cmp(&a)))
                .unwrap_or(0);

            let mut weakest = None;
            for node in (0..assignment.len()).filter(|&n| assignment[n] == largest) {
                let score = self.score(node, largest, &centroids[largest], assignment)?;
                if weakest.map_or(true, |(_, s)| score < s) {
                    weakest = Some((node, score));
                }
            }
            match weakest {
                Some((node, _)) => assignment[node] = empty,
                None => return Ok(()),
            }
        }
    }
}

/// Partition `graph` into `min(num_clusters, |nodes|)` clusters.
///
/// Returns the coarse graph and a total map from original node id to cluster
/// id. `id_prefix` is prepended to every generated node and edge id.
pub(crate) fn coarsen_with_prefix(
    graph: &Hypergraph,
    num_clusters: usize,
    config: &CoarseningConfig,
    id_prefix: &str,
) -> HyperlexResult<(Hypergraph, HashMap<NodeId, NodeId>)> {
    if num_clusters == 0 {
        return Err(HyperlexError::invalid_argument(
            "num_clusters must be at least 1",
        ));
    }
    let n = graph.node_count();
    if n == 0 {
        return Ok((Hypergraph::new(), HashMap::new()));
    }
    let k = num_clusters.min(n);

    let dim = graph.embedding_dim()?.unwrap_or(0);
    let index: HashMap<&str, usize> = graph
        .node_ids()
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    let vectors: Vec<Embedding> = graph
        .nodes()
        .map(|node| node.embedding.clone().unwrap_or_else(|| vec![0.0; dim]))
        .collect();

    let mut incidence: Vec<Vec<Incidence>> = (0..n).map(|_| Vec::new()).collect();
    for edge in graph.hyperedges() {
        let members: Vec<usize> = edge.members().iter().map(|m| index[m.as_str()]).collect();
        for &node in &members {
            incidence[node].push(Incidence {
                weight: edge.weight,
                others: members.iter().copied().filter(|&u| u != node).collect(),
            });
        }
    }

    let partition = Partition {
        vectors,
        incidence,
        config,
    };

    // contiguous blocks in insertion order; every cluster starts non-empty
    let mut assignment: Vec<usize> = (0..n).map(|i| i * k / n).collect();
    let mut centroids = partition.centroids(&assignment, k)?;
    let mut converged = false;
    for iteration in 0..config.max_iterations {
        let mut next = partition.reassign(&assignment, &centroids)?;
        partition.fill_empty(&mut next, &centroids)?;
        if next == assignment {
            debug!("Coarsening converged after {iteration} iterations");
            converged = true;
            break;
        }
        assignment = next;
        centroids = partition.centroids(&assignment, k)?;
    }
    if !converged {
        warn!(
            "Coarsening stopped at iteration cap {} without converging",
            config.max_iterations
        );
    }

    // renumber clusters by first appearance
    let mut renumber: HashMap<usize, usize> = HashMap::new();
    for &cluster in &assignment {
        let next_id = renumber.len();
        renumber.entry(cluster).or_insert(next_id);
    }
    let assignment: Vec<usize> = assignment.iter().map(|c| renumber[c]).collect();
    let cluster_id = |c: usize| format!("{id_prefix}cluster_{c}");

    let mut coarse = Hypergraph::new();
    for cluster in 0..k {
        let members: Vec<&Embedding> = assignment
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == cluster)
            .map(|(node, _)| &partition.vectors[node])
            .collect();
        let mut node = Node::new(cluster_id(cluster), CLUSTER_NODE_TYPE);
        node.set_attribute("size", members.len());
        if dim > 0 {
            node = node.with_embedding(mean(&members)?);
        }
        coarse.add_node(node)?;
    }

    let mut projected: Vec<(Vec<usize>, f64, usize)> = Vec::new();
    let mut positions: HashMap<Vec<usize>, usize> = HashMap::new();
    for edge in graph.hyperedges() {
        let clusters: BTreeSet<usize> = edge
            .members()
            .iter()
            .map(|m| assignment[index[m.as_str()]])
            .collect();
        if clusters.len() < 2 {
            continue;
        }
        let key: Vec<usize> = clusters.into_iter().collect();
        match positions.get(&key) {
            Some(&pos) => {
                projected[pos].1 += edge.weight;
                projected[pos].2 += 1;
            }
            None => {
                positions.insert(key.clone(), projected.len());
                projected.push((key, edge.weight, 1));
            }
        }
    }

    let max_total = projected.iter().map(|p| p.1).fold(0.0_f64, f64::max);
    for (j, (clusters, total, count)) in projected.into_iter().enumerate() {
        let weight = if max_total > 0.0 { total / max_total } else { 0.0 };
        let mut edge = Hyperedge::new(
            format!("{id_prefix}coarse_edge_{j}"),
            COARSE_EDGE_TYPE,
            clusters.into_iter().map(cluster_id),
        )
        .with_weight(weight);
        edge.set_attribute("total_weight", total);
        edge.set_attribute("source_edges", count);
        coarse.add_hyperedge(edge)?;
    }

    let mapping = graph
        .node_ids()
        .iter()
        .zip(&assignment)
        .map(|(id, &c)| (id.clone(), cluster_id(c)))
        .collect();

    debug!(
        "Coarsened {} nodes into {} clusters with {} projected hyperedges",
        n,
        coarse.node_count(),
        coarse.hyperedge_count()
    );
    Ok((coarse, mapping))
}
