//! Multi-resolution views of a hypergraph.
//!
//! Level 0 is the input graph. Each further level coarsens the one below to
//! half its node count (at least one node), so node counts strictly decrease
//! until a single cluster remains. Every level keeps a total map from the
//! ORIGINAL node ids to the node that represents them at that level.

mod coarsen;

use std::collections::HashMap;

use log::info;
use serde::{Deserialize, Serialize};

use common_config::CoarseningConfig;
use common_error::{HyperlexError, HyperlexResult};

use crate::hypergraph::{Hypergraph, NodeId};

pub use coarsen::{CLUSTER_NODE_TYPE, COARSE_EDGE_TYPE};

/// Size summary of one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStatistics {
    pub level: usize,
    pub num_nodes: usize,
    pub num_hyperedges: usize,
    pub avg_node_degree: f64,
}

/// Size summary of a whole hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyStatistics {
    pub num_levels: usize,
    pub level_stats: Vec<LevelStatistics>,
}

/// A ladder of progressively coarser hypergraphs.
#[derive(Debug, Clone, Default)]
pub struct HierarchicalHypergraph {
    levels: Vec<Hypergraph>,
    cluster_maps: Vec<HashMap<NodeId, NodeId>>,
    config: CoarseningConfig,
}

impl HierarchicalHypergraph {
    /// Create an empty hierarchy using `config` for every coarsening step.
    pub fn new(config: CoarseningConfig) -> Self {
        Self {
            levels: Vec::new(),
            cluster_maps: Vec::new(),
            config,
        }
    }

    /// Cluster `graph` into `min(num_clusters, |nodes|)` groups.
    ///
    /// Returns the coarse graph (one `cluster_{i}` node per group, embedding
    /// the mean of its members) and the map from each input node id to its
    /// cluster id. Projected edges are merged per cluster set and their summed
    /// weights are rescaled so the heaviest is 1.0; the raw sum is kept in the
    /// `total_weight` attribute.
    pub fn coarsen_graph(
        &self,
        graph: &Hypergraph,
        num_clusters: usize,
    ) -> HyperlexResult<(Hypergraph, HashMap<NodeId, NodeId>)> {
        coarsen::coarsen_with_prefix(graph, num_clusters, &self.config, "")
    }

    /// Rebuild the ladder from `base` with up to `num_levels` levels.
    pub fn build_hierarchy(&mut self, base: &Hypergraph, num_levels: usize) -> HyperlexResult<()> {
        if num_levels == 0 {
            return Err(HyperlexError::invalid_argument(
                "num_levels must be at least 1",
            ));
        }

        let identity = base
            .node_ids()
            .iter()
            .map(|id| (id.clone(), id.clone()))
            .collect();
        let mut levels = vec![base.clone()];
        let mut cluster_maps: Vec<HashMap<NodeId, NodeId>> = vec![identity];

        for level in 1..num_levels {
            let previous = &levels[level - 1];
            if previous.node_count() <= 1 {
                break;
            }
            let target = (previous.node_count() / 2).max(1);
            let (coarse, mapping) = coarsen::coarsen_with_prefix(
                previous,
                target,
                &self.config,
                &format!("L{level}_"),
            )?;

            let composed = cluster_maps[level - 1]
                .iter()
                .map(|(original, below)| (original.clone(), mapping[below].clone()))
                .collect();
            levels.push(coarse);
            cluster_maps.push(composed);
        }

        info!(
            "Built hierarchy with {} levels: {:?} nodes",
            levels.len(),
            levels.iter().map(Hypergraph::node_count).collect::<Vec<_>>()
        );
        self.levels = levels;
        self.cluster_maps = cluster_maps;
        Ok(())
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Hypergraph] {
        &self.levels
    }

    pub fn level(&self, level: usize) -> Option<&Hypergraph> {
        self.levels.get(level)
    }

    /// Original node id to representative node id at `level`.
    pub fn cluster_map(&self, level: usize) -> Option<&HashMap<NodeId, NodeId>> {
        self.cluster_maps.get(level)
    }

    /// Original node ids represented by `cluster_id` at `level`, sorted.
    pub fn cluster_members(&self, level: usize, cluster_id: &str) -> Vec<NodeId> {
        let mut members: Vec<NodeId> = self
            .cluster_map(level)
            .into_iter()
            .flatten()
            .filter(|(_, cluster)| cluster.as_str() == cluster_id)
            .map(|(original, _)| original.clone())
            .collect();
        members.sort();
        members
    }

    pub fn get_statistics(&self) -> HierarchyStatistics {
        let level_stats = self
            .levels
            .iter()
            .enumerate()
            .map(|(level, graph)| {
                let stats = graph.statistics();
                LevelStatistics {
                    level,
                    num_nodes: stats.num_nodes,
                    num_hyperedges: stats.num_hyperedges,
                    avg_node_degree: stats.avg_node_degree,
                }
            })
            .collect();
        HierarchyStatistics {
            num_levels: self.levels.len(),
            level_stats,
        }
    }
}
