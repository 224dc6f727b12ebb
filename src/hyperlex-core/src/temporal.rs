//! Event-sourced hypergraph with point-in-time snapshots.
//!
//! Whether an edge is visible at time `t` is decided solely by its event log:
//! the latest event with `timestamp <= t` must be [`EventKind::Added`]. Each
//! `Added` event points at the revision of the definition it introduced, so
//! re-adding an id with different members never rewrites earlier snapshots.
//! The live view is [`TemporalHypergraph::current`], a snapshot at `+inf`.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use common_error::{HyperlexError, HyperlexResult};

use crate::hypergraph::{EdgeId, Hyperedge, Hypergraph, Node};

/// Kind of a temporal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Added,
    Removed,
}

/// One entry of an edge's event log.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporalEvent {
    pub timestamp: f64,
    pub kind: EventKind,
    /// Index into the edge's definition revisions in effect after this event.
    pub revision: usize,
    /// Global insertion sequence, used to order equal timestamps.
    pub seq: u64,
}

/// A merged timeline entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionEntry {
    pub timestamp: f64,
    pub edge_id: EdgeId,
    pub kind: EventKind,
    /// Edges active immediately after this event.
    pub num_edges: usize,
}

/// The merged event log across all edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalEvolution {
    pub total_events: usize,
    pub evolution: Vec<EvolutionEntry>,
}

/// A hypergraph whose edges carry an append-only add/remove history.
#[derive(Debug, Clone, Default)]
pub struct TemporalHypergraph {
    /// Nodes plus the latest definition of every edge ever added.
    base: Hypergraph,
    temporal_edges: HashMap<EdgeId, Vec<TemporalEvent>>,
    /// Every definition an edge id has had, oldest first.
    revisions: HashMap<EdgeId, Vec<Hyperedge>>,
    next_seq: u64,
}

fn check_timestamp(timestamp: f64) -> HyperlexResult<()> {
    common_error::ensure!(
        !timestamp.is_nan(),
        InvalidArgument: "timestamp must be a number"
    );
    Ok(())
}

impl TemporalHypergraph {
    /// Create an empty temporal hypergraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Nodes are not versioned and appear in every snapshot.
    pub fn add_node(&mut self, node: Node) -> HyperlexResult<()> {
        self.base.add_node(node)
    }

    /// Underlying storage: every node and the latest definition of each edge,
    /// including edges that are currently removed.
    pub fn base(&self) -> &Hypergraph {
        &self.base
    }

    /// Add `edge` at `timestamp`.
    ///
    /// An edge id that was removed earlier may be added again, possibly with
    /// a different definition; snapshots before the re-add keep showing the
    /// earlier one. Adding an id that is currently live fails with
    /// `DuplicateId`, and a timestamp earlier than the edge's latest event
    /// fails with `InvalidArgument`.
    pub fn add_temporal_hyperedge(&mut self, edge: Hyperedge, timestamp: f64) -> HyperlexResult<()> {
        check_timestamp(timestamp)?;

        let last = self
            .temporal_edges
            .get(&edge.id)
            .and_then(|log| log.last())
            .copied();
        match last {
            Some(last) if last.kind == EventKind::Added => {
                return Err(HyperlexError::duplicate_id(format!(
                    "hyperedge '{}' is already active",
                    edge.id
                )));
            }
            Some(last) if timestamp < last.timestamp => {
                return Err(HyperlexError::invalid_argument(format!(
                    "timestamp {timestamp} precedes latest event {} for hyperedge '{}'",
                    last.timestamp, edge.id
                )));
            }
            Some(_) => {
                self.base.check_hyperedge(&edge)?;
                self.base.replace_hyperedge_unchecked(edge.clone());
                debug!("Re-activated hyperedge '{}' at t={timestamp}", edge.id);
            }
            None => self.base.add_hyperedge(edge.clone())?,
        }

        let revisions = self.revisions.entry(edge.id.clone()).or_default();
        let revision = match revisions.last() {
            Some(latest) if *latest == edge => revisions.len() - 1,
            _ => {
                revisions.push(edge.clone());
                revisions.len() - 1
            }
        };
        self.record(edge.id, timestamp, EventKind::Added, revision);
        Ok(())
    }

    /// Mark `edge_id` as removed from `timestamp` onwards.
    ///
    /// The definition stays in storage; only the log changes.
    pub fn remove_temporal_hyperedge(&mut self, edge_id: &str, timestamp: f64) -> HyperlexResult<()> {
        check_timestamp(timestamp)?;

        let last = self
            .temporal_edges
            .get(edge_id)
            .and_then(|log| log.last())
            .copied()
            .ok_or_else(|| HyperlexError::not_found(format!("hyperedge '{edge_id}' was never added")))?;
        if last.kind == EventKind::Removed {
            common_error::not_found_err!("hyperedge '{edge_id}' is not active");
        }
        if timestamp < last.timestamp {
            return Err(HyperlexError::invalid_argument(format!(
                "timestamp {timestamp} precedes latest event {} for hyperedge '{edge_id}'",
                last.timestamp
            )));
        }

        self.record(edge_id.to_string(), timestamp, EventKind::Removed, last.revision);
        Ok(())
    }

    fn record(&mut self, edge_id: EdgeId, timestamp: f64, kind: EventKind, revision: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.temporal_edges.entry(edge_id).or_default().push(TemporalEvent {
            timestamp,
            kind,
            revision,
            seq,
        });
    }

    /// The definition of `edge_id` visible at time `t`, if it is active then.
    pub fn definition_at(&self, edge_id: &str, t: f64) -> Option<&Hyperedge> {
        let event = self
            .edge_history(edge_id)
            .iter()
            .rev()
            .find(|event| event.timestamp <= t)?;
        if event.kind != EventKind::Added {
            return None;
        }
        self.revisions.get(edge_id)?.get(event.revision)
    }

    /// Whether `edge_id` is visible at time `t`.
    pub fn is_active_at(&self, edge_id: &str, t: f64) -> bool {
        self.definition_at(edge_id, t).is_some()
    }

    /// Event log of one edge, oldest first. Empty for unknown ids.
    pub fn edge_history(&self, edge_id: &str) -> &[TemporalEvent] {
        self.temporal_edges
            .get(edge_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The graph as it was at time `t`: every node plus the edges active at `t`.
    pub fn snapshot_at_time(&self, t: f64) -> Hypergraph {
        let mut snapshot = Hypergraph::new();
        for node in self.base.nodes() {
            snapshot.push_node_unchecked(node.clone());
        }
        for edge_id in self.base.hyperedge_ids() {
            if let Some(definition) = self.definition_at(edge_id, t) {
                snapshot.push_edge_unchecked(definition.clone());
            }
        }
        snapshot
    }

    /// Live view: the latest state of every edge.
    pub fn current(&self) -> Hypergraph {
        self.snapshot_at_time(f64::INFINITY)
    }

    /// Earliest and latest event timestamps.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.temporal_edges
            .values()
            .flatten()
            .map(|event| event.timestamp)
            .fold(None, |range, ts| match range {
                None => Some((ts, ts)),
                Some((lo, hi)) => Some((lo.min(ts), hi.max(ts))),
            })
    }

    /// All events merged into one timeline ordered by timestamp, then insertion.
    pub fn get_temporal_evolution(&self) -> TemporalEvolution {
        let mut events: Vec<(&EdgeId, &TemporalEvent)> = self
            .temporal_edges
            .iter()
            .flat_map(|(id, log)| log.iter().map(move |event| (id, event)))
            .collect();
        events.sort_by(|(_, a), (_, b)| {
            a.timestamp
                .total_cmp(&b.timestamp)
                .then_with(|| a.seq.cmp(&b.seq))
        });

        let mut active = 0usize;
        let evolution: Vec<EvolutionEntry> = events
            .into_iter()
            .map(|(edge_id, event)| {
                match event.kind {
                    EventKind::Added => active += 1,
                    EventKind::Removed => active = active.saturating_sub(1),
                }
                EvolutionEntry {
                    timestamp: event.timestamp,
                    edge_id: edge_id.clone(),
                    kind: event.kind,
                    num_edges: active,
                }
            })
            .collect();

        TemporalEvolution {
            total_events: evolution.len(),
            evolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn four_nodes() -> TemporalHypergraph {
        let mut thg = TemporalHypergraph::new();
        for i in 0..4 {
            thg.add_node(Node::new(format!("n{i}"), "entity")).unwrap();
        }
        thg
    }

    fn edge(id: &str, members: [&str; 2]) -> Hyperedge {
        Hyperedge::new(id, "event", members)
    }

    #[test]
    fn test_snapshots_follow_event_log() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("e1", ["n0", "n1"]), 1.0).unwrap();
        thg.add_temporal_hyperedge(edge("e2", ["n2", "n3"]), 3.0).unwrap();

        assert_eq!(thg.snapshot_at_time(2.0).hyperedge_ids(), ["e1"]);
        assert_eq!(thg.snapshot_at_time(4.0).hyperedge_ids(), ["e1", "e2"]);

        thg.remove_temporal_hyperedge("e1", 5.0).unwrap();
        assert_eq!(thg.snapshot_at_time(6.0).hyperedge_ids(), ["e2"]);
        assert_eq!(thg.snapshot_at_time(4.0).hyperedge_ids(), ["e1", "e2"]);

        // removed edges stay in storage
        assert!(thg.base().contains_hyperedge("e1"));
        assert_eq!(thg.current().hyperedge_ids(), ["e2"]);
    }

    #[test]
    fn test_snapshot_boundaries() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 1.0).unwrap();
        thg.remove_temporal_hyperedge("e", 2.0).unwrap();

        assert!(!thg.is_active_at("e", 0.999));
        assert!(thg.is_active_at("e", 1.0));
        assert!(thg.is_active_at("e", 1.999));
        assert!(!thg.is_active_at("e", 2.0));
        assert_eq!(thg.snapshot_at_time(0.0).node_count(), 4);
    }

    #[test]
    fn test_add_rejects_earlier_timestamp_and_live_duplicate() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 5.0).unwrap();

        let err = thg
            .add_temporal_hyperedge(edge("e", ["n0", "n1"]), 6.0)
            .unwrap_err();
        assert!(matches!(err, HyperlexError::DuplicateId(_)));

        thg.remove_temporal_hyperedge("e", 7.0).unwrap();
        let err = thg
            .add_temporal_hyperedge(edge("e", ["n0", "n1"]), 6.5)
            .unwrap_err();
        assert!(matches!(err, HyperlexError::InvalidArgument(_)));
    }

    #[test]
    fn test_readding_removed_edge() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 1.0).unwrap();
        thg.remove_temporal_hyperedge("e", 2.0).unwrap();
        thg.add_temporal_hyperedge(edge("e", ["n2", "n3"]), 3.0).unwrap();

        assert!(thg.is_active_at("e", 1.5));
        assert!(!thg.is_active_at("e", 2.5));
        assert!(thg.is_active_at("e", 3.0));
        assert_eq!(thg.edge_history("e").len(), 3);
        assert_eq!(thg.current().get_hyperedge("e").unwrap().members(), ["n2", "n3"]);
    }

    #[test]
    fn test_readding_keeps_earlier_definition() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 1.0).unwrap();
        thg.add_temporal_hyperedge(edge("f", ["n1", "n2"]), 1.0).unwrap();
        thg.remove_temporal_hyperedge("e", 2.0).unwrap();
        let before = thg.snapshot_at_time(1.5);

        thg.add_temporal_hyperedge(edge("e", ["n2", "n3"]).with_weight(0.4), 3.0)
            .unwrap();

        assert_eq!(thg.snapshot_at_time(1.5), before);
        assert_eq!(
            thg.snapshot_at_time(1.5).get_hyperedge("e").unwrap().members(),
            ["n0", "n1"]
        );
        assert_eq!(thg.definition_at("e", 3.5).unwrap().weight, 0.4);
        assert!(thg.definition_at("e", 2.5).is_none());
        assert_eq!(thg.snapshot_at_time(2.5).degree("n3"), 0);
        assert_eq!(thg.snapshot_at_time(3.5).degree("n0"), 0);
        assert_eq!(thg.snapshot_at_time(3.5).hyperedge_ids(), ["e", "f"]);

        let revisions: Vec<usize> = thg.edge_history("e").iter().map(|e| e.revision).collect();
        assert_eq!(revisions, [0, 0, 1]);
    }

    #[test]
    fn test_identical_readd_reuses_revision() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 1.0).unwrap();
        thg.remove_temporal_hyperedge("e", 2.0).unwrap();
        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 3.0).unwrap();

        assert_eq!(thg.edge_history("e")[2].revision, 0);
    }

    #[test]
    fn test_invalid_readd_changes_nothing() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 1.0).unwrap();
        thg.add_temporal_hyperedge(edge("f", ["n2", "n3"]), 1.0).unwrap();
        thg.remove_temporal_hyperedge("e", 2.0).unwrap();

        let err = thg
            .add_temporal_hyperedge(edge("e", ["n0", "ghost"]), 3.0)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(thg.base().hyperedge_ids(), ["e", "f"]);
        assert_eq!(thg.edge_history("e").len(), 2);
        assert_eq!(thg.snapshot_at_time(1.5).get_hyperedge("e").unwrap().members(), ["n0", "n1"]);
    }

    #[test]
    fn test_remove_errors() {
        let mut thg = four_nodes();
        assert!(thg
            .remove_temporal_hyperedge("ghost", 1.0)
            .unwrap_err()
            .is_not_found());

        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 3.0).unwrap();
        assert!(matches!(
            thg.remove_temporal_hyperedge("e", 2.0),
            Err(HyperlexError::InvalidArgument(_))
        ));
        assert!(matches!(
            thg.remove_temporal_hyperedge("e", f64::NAN),
            Err(HyperlexError::InvalidArgument(_))
        ));

        thg.remove_temporal_hyperedge("e", 3.0).unwrap();
        assert!(thg
            .remove_temporal_hyperedge("e", 4.0)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_failed_add_leaves_log_untouched() {
        let mut thg = four_nodes();
        let err = thg
            .add_temporal_hyperedge(edge("e", ["n0", "ghost"]), 1.0)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(thg.edge_history("e").is_empty());
        assert_eq!(thg.get_temporal_evolution().total_events, 0);
    }

    #[test]
    fn test_evolution_is_sorted_with_stable_ties() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("late", ["n0", "n1"]), 4.0).unwrap();
        thg.add_temporal_hyperedge(edge("b", ["n1", "n2"]), 1.0).unwrap();
        thg.add_temporal_hyperedge(edge("a", ["n2", "n3"]), 1.0).unwrap();
        thg.remove_temporal_hyperedge("b", 2.0).unwrap();

        let evolution = thg.get_temporal_evolution();
        assert_eq!(evolution.total_events, 4);

        let order: Vec<(&str, EventKind, usize)> = evolution
            .evolution
            .iter()
            .map(|e| (e.edge_id.as_str(), e.kind, e.num_edges))
            .collect();
        assert_eq!(
            order,
            [
                ("b", EventKind::Added, 1),
                ("a", EventKind::Added, 2),
                ("b", EventKind::Removed, 1),
                ("late", EventKind::Added, 2),
            ]
        );
        assert_eq!(thg.time_range(), Some((1.0, 4.0)));
    }

    #[test]
    fn test_snapshot_is_pure() {
        let mut thg = four_nodes();
        thg.add_temporal_hyperedge(edge("e", ["n0", "n1"]), 1.0).unwrap();

        let before = thg.get_temporal_evolution();
        let first = thg.snapshot_at_time(1.5);
        let second = thg.snapshot_at_time(1.5);

        assert_eq!(first, second);
        assert_eq!(thg.get_temporal_evolution(), before);
    }
}
