//! Hypergraph neural message passing for hyperlex.
//!
//! - [`AttentionHyperGNNLayer`]: attention aggregation and projection
//! - [`HyperGNN`]: the layer stack producing refined embeddings
//! - [`analysis`]: communities, link predictions, conflicts, node importance and the
//!   end-to-end [`run_analysis`] pipeline

pub mod analysis;
pub mod layer;
pub mod model;
pub mod sample;

pub use analysis::{
    count_communities, detect_communities, detect_conflicts, node_importance, predict_links,
    run_analysis, AnalysisReport, DetectedConflict, LinkPrediction, CONFLICT_NODE_TYPES,
    LEGAL_DOMAIN_ATTRIBUTE,
};
pub use layer::AttentionHyperGNNLayer;
pub use model::HyperGNN;
pub use sample::generate_sample_case_data;
