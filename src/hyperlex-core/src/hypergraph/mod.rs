//! Hypergraph data model.
//!
//! This module provides the core graph primitives:
//! - `Node` for entities carrying an embedding
//! - `Hyperedge` for weighted n-ary relations
//! - `Hypergraph` for the container with its adjacency index
//! - `GraphExport` for the serializable node/edge record format

mod attributes;
mod container;
mod export;
mod hyperedge;
mod identifiers;
mod node;
mod query;

pub use attributes::{AttributeMap, HasAttributes};
pub use container::{GraphStatistics, Hypergraph};
pub use export::{EdgeRecord, GraphExport, NodeRecord};
pub use hyperedge::Hyperedge;
pub use identifiers::{EdgeId, Label, NodeId};
pub use node::{Node, INIT_STD};
pub use query::{
    NeighborhoodResult, PathResult, ReasoningChain, ReasoningStep, RecordedConflict, SimilarNode,
    CONFLICTS_EDGE_TYPE,
};
