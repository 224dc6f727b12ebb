//! Core data model for hyperlex.
//!
//! This crate provides the hypergraph model and its structural extensions:
//! - `Hypergraph`, `Node`, `Hyperedge` with adjacency and read-only queries
//! - `TemporalHypergraph` for event-sourced edges and point-in-time snapshots
//! - `HierarchicalHypergraph` for multi-resolution coarsening
//! - `Value` and embedding arithmetic in `types`

pub mod hierarchy;
pub mod hypergraph;
pub mod temporal;
pub mod testing;
pub mod types;

mod proptest_utils;

// Re-export commonly used types
pub use hierarchy::{HierarchicalHypergraph, HierarchyStatistics, LevelStatistics};
pub use hypergraph::{
    AttributeMap, EdgeId, EdgeRecord, GraphExport, GraphStatistics, HasAttributes, Hyperedge,
    Hypergraph, Label, Node, NodeId, NodeRecord, RecordedConflict,
};
pub use temporal::{EventKind, TemporalEvolution, TemporalHypergraph};
pub use types::{Embedding, Value};
