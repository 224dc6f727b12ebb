//! Stacked hypergraph neural network.

use std::collections::HashMap;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use common_config::{AggregationMode, GnnConfig};
use common_error::HyperlexResult;
use hyperlex_core::hypergraph::INIT_STD;
use hyperlex_core::types::{cosine_similarity, random_normal, Embedding};
use hyperlex_core::{Hypergraph, NodeId};

use crate::layer::AttentionHyperGNNLayer;

/// `num_layers` attention layers: `input_dim -> hidden_dim`, then
/// `hidden_dim -> hidden_dim`.
///
/// All randomness (layer weights and embedding initialisation) comes from one
/// `ChaCha8Rng` seeded at construction, so a model built with the same config
/// and seed produces the same embeddings.
#[derive(Debug, Clone)]
pub struct HyperGNN {
    config: GnnConfig,
    aggregation: AggregationMode,
    layers: Vec<AttentionHyperGNNLayer>,
    rng: ChaCha8Rng,
}

impl HyperGNN {
    /// Validate `config` and build the layer stack.
    pub fn new(config: GnnConfig, seed: u64) -> HyperlexResult<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut layers = Vec::with_capacity(config.num_layers);
        for i in 0..config.num_layers {
            let input_dim = if i == 0 {
                config.input_dim
            } else {
                config.hidden_dim
            };
            let heads = config.num_attention_heads.min(input_dim);
            layers.push(AttentionHyperGNNLayer::new(
                input_dim,
                config.hidden_dim,
                heads,
                &mut rng,
            )?);
        }

        info!(
            "Initialized HyperGNN with {} layers (input: {}, hidden: {}, heads: {})",
            config.num_layers, config.input_dim, config.hidden_dim, config.num_attention_heads
        );
        Ok(Self {
            config,
            aggregation: AggregationMode::default(),
            layers,
            rng,
        })
    }

    /// Use `mode` for both aggregation phases.
    pub fn with_aggregation(mut self, mode: AggregationMode) -> Self {
        self.aggregation = mode;
        self
    }

    pub fn config(&self) -> &GnnConfig {
        &self.config
    }

    pub fn aggregation(&self) -> AggregationMode {
        self.aggregation
    }

    pub fn layers(&self) -> &[AttentionHyperGNNLayer] {
        &self.layers
    }

    /// Dimension of the embeddings produced by [`HyperGNN::forward`].
    pub fn output_dim(&self) -> usize {
        self.config.hidden_dim
    }

    /// Give every node without an embedding an `embedding_dim` vector drawn
    /// from `N(0, 0.1²)`. Returns how many nodes were initialised.
    pub fn initialize_embeddings(&mut self, graph: &mut Hypergraph) -> HyperlexResult<usize> {
        let missing: Vec<NodeId> = graph
            .nodes()
            .filter(|node| node.embedding.is_none())
            .map(|node| node.id.clone())
            .collect();
        for node_id in &missing {
            let embedding = random_normal(self.config.embedding_dim, INIT_STD, &mut self.rng);
            graph.set_embedding(node_id, embedding)?;
        }
        debug!("Initialized {} node embeddings", missing.len());
        Ok(missing.len())
    }

    /// Run every layer over `graph` and return the final embeddings.
    ///
    /// The graph is not modified. Nodes without an embedding contribute
    /// nothing to the first layer and receive one from it.
    pub fn forward(&self, graph: &Hypergraph) -> HyperlexResult<HashMap<NodeId, Embedding>> {
        let mut embeddings: HashMap<NodeId, Embedding> = graph
            .nodes()
            .filter_map(|node| Some((node.id.clone(), node.embedding.clone()?)))
            .collect();

        for (i, layer) in self.layers.iter().enumerate() {
            embeddings = layer.forward(graph, &embeddings, self.aggregation)?;
            debug!("Completed layer {}/{}", i + 1, self.layers.len());
        }
        Ok(embeddings)
    }

    /// A copy of `graph` carrying the refined embeddings.
    pub fn refine(&self, graph: &Hypergraph) -> HyperlexResult<Hypergraph> {
        let embeddings = self.forward(graph)?;
        graph.with_embeddings(&embeddings)
    }

    /// Compatibility of two embeddings as their cosine similarity.
    pub fn predict_link(&self, a: &[f32], b: &[f32]) -> HyperlexResult<f32> {
        cosine_similarity(a, b)
    }
}
