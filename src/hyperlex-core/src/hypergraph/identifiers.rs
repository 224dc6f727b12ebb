//! Type identifiers for graph elements.

/// Node identifier, unique within a graph.
pub type NodeId = String;

/// Hyperedge identifier, unique within a graph.
pub type EdgeId = String;

/// Type tag for nodes and hyperedges (`"statute"`, `"cites"`, ...).
pub type Label = String;
