//! Integration tests for hyperlex-gnn
//!
//! Attention normalisation, full forward passes over fixture graphs and the
//! end-to-end analysis pipeline.

use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use common_config::{AggregationMode, GnnConfig, HyperlexConfig};
use hyperlex_core::testing::HypergraphFixture;
use hyperlex_core::types::random_normal;
use hyperlex_gnn::*;

fn layer(input_dim: usize, heads: usize) -> AttentionHyperGNNLayer {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    AttentionHyperGNNLayer::new(input_dim, 16, heads, &mut rng).unwrap()
}

#[test]
fn test_five_embeddings_attention() {
    let layer = layer(32, 4);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let embeddings: Vec<Vec<f32>> = (0..5).map(|_| random_normal(32, 1.0, &mut rng)).collect();

    let weights = layer.compute_attention_weights(&embeddings).unwrap();
    assert_eq!(weights.len(), 5);
    assert!(weights.iter().all(|&w| w >= 0.0));
    assert_abs_diff_eq!(weights.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_every_mode_runs_on_ring() {
    let graph = HypergraphFixture::ring(20, 15, 16, 3).into_hypergraph();
    let config = GnnConfig::default().with_input_dim(16).with_hidden_dim(8);

    for mode in [
        AggregationMode::Attention,
        AggregationMode::Mean,
        AggregationMode::Max,
        AggregationMode::Sum,
    ] {
        let model = HyperGNN::new(config.clone(), 1).unwrap().with_aggregation(mode);
        let embeddings = model.forward(&graph).unwrap();
        assert_eq!(embeddings.len(), 20, "mode {mode:?}");
        assert!(embeddings
            .values()
            .all(|e| e.len() == 8 && e.iter().all(|x| x.is_finite() && x.abs() <= 1.0)));
    }
}

#[test]
fn test_refined_graph_feeds_queries() {
    let mut model = HyperGNN::new(GnnConfig::default(), 11).unwrap();
    let mut graph = HypergraphFixture::legal_case().into_hypergraph();
    model.initialize_embeddings(&mut graph).unwrap();

    let refined = model.refine(&graph).unwrap();
    assert_eq!(refined.embedding_dim().unwrap(), Some(32));
    let similar = refined.query_similar_nodes("plaintiff", -1.0, 10).unwrap();
    assert_eq!(similar.len(), 5);
}

#[test]
fn test_run_analysis_on_sample_case() {
    let records = generate_sample_case_data(42);
    let report = run_analysis(records, &HyperlexConfig::default()).unwrap();

    assert_eq!(report.graph_statistics.num_nodes, 35);
    assert_eq!(report.graph_statistics.num_hyperedges, 30);
    assert_eq!(report.communities.len(), 35);
    assert_eq!(
        report.num_communities,
        report.communities.values().collect::<HashSet<_>>().len()
    );
    assert!(report.num_communities >= 1);
    assert!(report.link_predictions.len() <= 10);
    assert!(report
        .link_predictions
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
    assert_eq!(report.node_importance.len(), 35);
    // people and evidence only, so nothing to compare
    assert!(report.detected_conflicts.is_empty());
    assert_eq!(report.sample_embeddings.len(), 5);
    assert!(report.sample_embeddings.values().all(|e| e.len() == 5));

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"num_communities\""));
}

#[test]
fn test_run_analysis_is_reproducible() {
    let config = HyperlexConfig::default();
    let first = run_analysis(generate_sample_case_data(9), &config).unwrap();
    let second = run_analysis(generate_sample_case_data(9), &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_run_analysis_rejects_bad_config() {
    let mut config = HyperlexConfig::default();
    config.gnn.embedding_dim = 10;
    assert!(run_analysis(generate_sample_case_data(1), &config).is_err());
}

proptest! {
    /// Attention weights are a probability distribution for any set size.
    #[test]
    fn attention_weights_normalised(
        embeddings in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 12), 1..20),
        heads in 1usize..=12,
    ) {
        let weights = layer(12, heads).compute_attention_weights(&embeddings).unwrap();
        prop_assert_eq!(weights.len(), embeddings.len());
        prop_assert!(weights.iter().all(|&w| w >= 0.0));
        prop_assert!((weights.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    /// Attention aggregation is a convex combination of the members.
    #[test]
    fn attention_aggregate_within_bounds(
        embeddings in prop::collection::vec(prop::collection::vec(-5.0f32..5.0, 8), 1..10),
    ) {
        let out = layer(8, 2)
            .aggregate_to_hyperedge(&embeddings, AggregationMode::Attention)
            .unwrap();
        for (d, value) in out.iter().enumerate() {
            let lo = embeddings.iter().map(|e| e[d]).fold(f32::INFINITY, f32::min);
            let hi = embeddings.iter().map(|e| e[d]).fold(f32::NEG_INFINITY, f32::max);
            prop_assert!(*value >= lo - 1e-4 && *value <= hi + 1e-4);
        }
    }
}
