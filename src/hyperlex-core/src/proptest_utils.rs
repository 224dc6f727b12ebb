//! Property-based tests for the core model.
//!
//! Strategies generate small random hypergraphs; the properties cover export
//! round trips, snapshot purity and the coarsening partition.
