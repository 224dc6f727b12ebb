//! One round of node -> hyperedge -> node message passing.
//!
//! Aggregation keeps the input dimensionality; the change from `input_dim` to
//! `output_dim` happens only in [`AttentionHyperGNNLayer::project`], applied
//! when a node's new embedding is produced.

use std::collections::HashMap;

use log::debug;
use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Normal;
use rayon::prelude::*;

use common_config::AggregationMode;
use common_error::{HyperlexError, HyperlexResult};
use hyperlex_core::types::{ensure_same_dim, mean, stack_rows, Embedding};
use hyperlex_core::{Hypergraph, NodeId};

/// Multi-head attention over member embeddings plus a `tanh` projection.
///
/// Each head owns a contiguous slice of the input dimensions. For member `x`
/// in a set with centroid `c`, a head scores `x·c / sqrt(d_head) + a·x` over
/// its slice, where `a` is a learned scoring vector. Per-head softmax weights
/// are averaged across heads. Scores are computed in `f64`.
#[derive(Debug, Clone)]
pub struct AttentionHyperGNNLayer {
    input_dim: usize,
    output_dim: usize,
    num_heads: usize,
    /// Scoring vector `a`.
    attention: Array1<f32>,
    /// `input_dim x output_dim` projection.
    weight: Array2<f32>,
    bias: Array1<f32>,
}

/// Max-shifted softmax.
///
/// NaN scores count as `-inf`. If the largest score is `+inf` the weight is
/// shared evenly by the infinite entries; if every score is `-inf` it is
/// shared by all of them.
fn softmax(scores: ArrayView1<f64>) -> Array1<f64> {
    let scores = scores.mapv(|s| if s.is_nan() { f64::NEG_INFINITY } else { s });
    let max = scores.fold(f64::NEG_INFINITY, |m, &s| m.max(s));
    let exps = if max == f64::INFINITY {
        scores.mapv(|s| if s == max { 1.0 } else { 0.0 })
    } else if max == f64::NEG_INFINITY {
        Array1::ones(scores.len())
    } else {
        scores.mapv(|s| (s - max).exp())
    };
    let total = exps.sum();
    exps / total
}

impl AttentionHyperGNNLayer {
    /// Create a layer with weights drawn from `N(0, 1/input_dim)`.
    pub fn new<R: Rng + ?Sized>(
        input_dim: usize,
        output_dim: usize,
        num_heads: usize,
        rng: &mut R,
    ) -> HyperlexResult<Self> {
        common_error::ensure!(
            input_dim > 0 && output_dim > 0,
            InvalidConfig: "layer dimensions must be positive, got {input_dim}x{output_dim}"
        );
        common_error::ensure!(
            (1..=input_dim).contains(&num_heads),
            InvalidConfig: "num_heads must be in 1..={input_dim}, got {num_heads}"
        );

        let std = (1.0 / input_dim as f32).sqrt();
        let normal = Normal::new(0.0f32, std)
            .map_err(|e| HyperlexError::invalid_config(format!("layer weight init: {e}")))?;
        Ok(Self {
            input_dim,
            output_dim,
            num_heads,
            attention: Array1::random_using(input_dim, normal, rng),
            weight: Array2::random_using((input_dim, output_dim), normal, rng),
            bias: Array1::zeros(output_dim),
        })
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    pub fn num_heads(&self) -> usize {
        self.num_heads
    }

    fn head_range(&self, head: usize) -> std::ops::Range<usize> {
        head * self.input_dim / self.num_heads..(head + 1) * self.input_dim / self.num_heads
    }

    fn check_input<V: AsRef<[f32]>>(&self, embeddings: &[V]) -> HyperlexResult<()> {
        if embeddings.is_empty() {
            return Err(HyperlexError::invalid_argument(
                "cannot aggregate an empty set of embeddings",
            ));
        }
        let dim = ensure_same_dim(embeddings)?;
        if dim != self.input_dim {
            return Err(HyperlexError::dimension_mismatch(self.input_dim, dim));
        }
        Ok(())
    }

    /// Attention weights over `embeddings`: non-negative and summing to 1.
    ///
    /// A single embedding gets weight 1.0; identical embeddings get uniform
    /// weights.
    pub fn compute_attention_weights<V: AsRef<[f32]>>(
        &self,
        embeddings: &[V],
    ) -> HyperlexResult<Vec<f32>> {
        self.check_input(embeddings)?;
        let members = stack_rows(embeddings)?.mapv(f64::from);
        let centroid = members
            .mean_axis(Axis(0))
            .ok_or_else(|| HyperlexError::invalid_argument("no embeddings supplied"))?;
        let attention = self.attention.mapv(f64::from);

        let mut weights = Array1::<f64>::zeros(embeddings.len());
        for head in 0..self.num_heads {
            let range = self.head_range(head);
            let scale = (range.len() as f64).sqrt();
            let x = members.slice(s![.., range.clone()]);
            let scores = x.dot(&centroid.slice(s![range.clone()])) / scale
                + x.dot(&attention.slice(s![range]));
            weights += &softmax(scores.view());
        }
        weights /= self.num_heads as f64;
        Ok(weights.iter().map(|&w| w as f32).collect())
    }

    /// Combine member embeddings into one hyperedge representation.
    pub fn aggregate_to_hyperedge<V: AsRef<[f32]>>(
        &self,
        embeddings: &[V],
        mode: AggregationMode,
    ) -> HyperlexResult<Embedding> {
        self.check_input(embeddings)?;
        match mode {
            AggregationMode::Attention => {
                let weights = self.compute_attention_weights(embeddings)?;
                weighted_sum(embeddings, &weights)
            }
            AggregationMode::Mean => mean(embeddings),
            AggregationMode::Max => elementwise_max(embeddings),
            AggregationMode::Sum => Ok(stack_rows(embeddings)?.sum_axis(Axis(0)).to_vec()),
        }
    }

    /// Combine the representations of a node's hyperedges.
    ///
    /// `weights[i]` is the weight of the hyperedge behind
    /// `representations[i]`. Mean, sum and attention scale by these weights;
    /// if they sum to zero the unweighted form is used. Max ignores them.
    pub fn aggregate_to_node<V: AsRef<[f32]>>(
        &self,
        representations: &[V],
        weights: &[f64],
        mode: AggregationMode,
    ) -> HyperlexResult<Embedding> {
        self.check_input(representations)?;
        if representations.len() != weights.len() {
            return Err(HyperlexError::invalid_argument(format!(
                "{} representations but {} weights",
                representations.len(),
                weights.len()
            )));
        }
        let edge_weights: Vec<f32> = weights.iter().map(|&w| w as f32).collect();
        let total: f32 = edge_weights.iter().sum();
        let n = representations.len() as f32;

        let coefficients: Vec<f32> = match mode {
            AggregationMode::Max => return elementwise_max(representations),
            AggregationMode::Mean if total > 0.0 => {
                edge_weights.iter().map(|w| w / total).collect()
            }
            AggregationMode::Mean => vec![1.0 / n; representations.len()],
            AggregationMode::Sum if total > 0.0 => edge_weights,
            AggregationMode::Sum => vec![1.0; representations.len()],
            AggregationMode::Attention => {
                let attention = self.compute_attention_weights(representations)?;
                let scaled: Vec<f32> = attention
                    .iter()
                    .zip(&edge_weights)
                    .map(|(a, w)| a * w)
                    .collect();
                let norm: f32 = scaled.iter().sum();
                if norm > 0.0 {
                    scaled.into_iter().map(|s| s / norm).collect()
                } else {
                    attention
                }
            }
        };
        weighted_sum(representations, &coefficients)
    }

    /// `tanh(x·W + b)`, mapping `input_dim` to `output_dim`.
    pub fn project(&self, x: &[f32]) -> HyperlexResult<Embedding> {
        if x.len() != self.input_dim {
            return Err(HyperlexError::dimension_mismatch(self.input_dim, x.len()));
        }
        let out = ArrayView1::from(x).dot(&self.weight) + &self.bias;
        Ok(out.mapv(f32::tanh).to_vec())
    }

    /// One full pass over `graph`.
    ///
    /// Phase one aggregates the members of every hyperedge that has at least
    /// one embedded member; phase two aggregates each node's hyperedge
    /// representations and projects the result. A node without hyperedge
    /// representations projects its own embedding, or becomes zeros if it has
    /// none. Both phases run in parallel across hyperedges and nodes.
    pub fn forward(
        &self,
        graph: &Hypergraph,
        embeddings: &HashMap<NodeId, Embedding>,
        mode: AggregationMode,
    ) -> HyperlexResult<HashMap<NodeId, Embedding>> {
        let edges: Vec<_> = graph.hyperedges().collect();
        let representations: HashMap<&str, (Embedding, f64)> = edges
            .par_iter()
            .filter_map(|edge| {
                let members: Vec<&Embedding> = edge
                    .members()
                    .iter()
                    .filter_map(|id| embeddings.get(id))
                    .collect();
                if members.is_empty() {
                    return None;
                }
                Some(
                    self.aggregate_to_hyperedge(&members, mode)
                        .map(|rep| (edge.id.as_str(), (rep, edge.weight))),
                )
            })
            .collect::<HyperlexResult<Vec<_>>>()?
            .into_iter()
            .collect();

        let node_ids = graph.node_ids();
        let updated: Vec<(NodeId, Embedding)> = node_ids
            .par_iter()
            .map(|node_id| -> HyperlexResult<(NodeId, Embedding)> {
                let (reps, weights): (Vec<&Embedding>, Vec<f64>) = graph
                    .incident_edges(node_id)
                    .filter_map(|edge_id| representations.get(edge_id.as_str()))
                    .map(|(rep, weight)| (rep, *weight))
                    .unzip();

                let embedding = if !reps.is_empty() {
                    let aggregated = self.aggregate_to_node(&reps, &weights, mode)?;
                    self.project(&aggregated)?
                } else if let Some(own) = embeddings.get(node_id) {
                    self.project(own)?
                } else {
                    vec![0.0; self.output_dim]
                };
                Ok((node_id.clone(), embedding))
            })
            .collect::<HyperlexResult<Vec<_>>>()?;

        debug!(
            "Layer {}->{} updated {} nodes from {} hyperedge representations",
            self.input_dim,
            self.output_dim,
            updated.len(),
            representations.len()
        );
        Ok(updated.into_iter().collect())
    }
}

/// `Σ coefficients[i] * vectors[i]`; the two slices have the same length.
fn weighted_sum<V: AsRef<[f32]>>(vectors: &[V], coefficients: &[f32]) -> HyperlexResult<Embedding> {
    let rows = stack_rows(vectors)?;
    Ok(ArrayView1::from(coefficients).dot(&rows).to_vec())
}

fn elementwise_max<V: AsRef<[f32]>>(vectors: &[V]) -> HyperlexResult<Embedding> {
    Ok(stack_rows(vectors)?
        .fold_axis(Axis(0), f32::NEG_INFINITY, |&m, &x| m.max(x))
        .to_vec())
}
