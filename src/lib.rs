//! Hyperlex - hypergraph analytics for legal case data
//!
//! Hyperlex stores multi-party relations as hyperedges, versions them over
//! time, coarsens them into hierarchies and refines node embeddings with
//! attention-based message passing.

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export core crates
pub use common_config as config;
pub use common_error as error;
pub use hyperlex_core as core;
pub use hyperlex_gnn as gnn;

/// Hyperlex version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
