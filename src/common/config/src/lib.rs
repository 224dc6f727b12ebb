//! Configuration management for hyperlex.
//!
//! Every record derives `Deserialize` with `#[serde(default)]`, so callers may
//! supply any subset of keys; unknown keys are ignored rather than rejected.

use serde::{Deserialize, Serialize};

use common_error::{HyperlexError, HyperlexResult};

/// Largest accepted embedding or hidden dimension.
pub const MAX_DIM: usize = 4096;

/// Largest accepted number of message-passing layers.
pub const MAX_LAYERS: usize = 32;

/// Largest accepted number of attention heads.
pub const MAX_ATTENTION_HEADS: usize = 64;

/// Global hyperlex configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HyperlexConfig {
    /// Neural message-passing configuration.
    pub gnn: GnnConfig,
    /// Community detection and link prediction configuration.
    pub analysis: AnalysisConfig,
    /// Hierarchical coarsening configuration.
    pub coarsening: CoarseningConfig,
}

impl HyperlexConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> HyperlexResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> HyperlexResult<()> {
        self.gnn.validate()?;
        self.analysis.validate()?;
        self.coarsening.validate()
    }
}

/// HyperGNN dimensions and depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GnnConfig {
    /// Length of the embeddings fed to the first layer.
    pub input_dim: usize,
    /// Output length of every layer.
    pub hidden_dim: usize,
    /// Number of stacked layers.
    pub num_layers: usize,
    /// Number of attention heads.
    pub num_attention_heads: usize,
    /// Length used when initialising node embeddings.
    pub embedding_dim: usize,
}

impl Default for GnnConfig {
    fn default() -> Self {
        Self {
            input_dim: 64,
            hidden_dim: 32,
            num_layers: 2,
            num_attention_heads: 4,
            embedding_dim: 64,
        }
    }
}

impl GnnConfig {
    /// Check documented ranges.
    pub fn validate(&self) -> HyperlexResult<()> {
        check_range("input_dim", self.input_dim, 1, MAX_DIM)?;
        check_range("hidden_dim", self.hidden_dim, 1, MAX_DIM)?;
        check_range("embedding_dim", self.embedding_dim, 1, MAX_DIM)?;
        check_range("num_layers", self.num_layers, 1, MAX_LAYERS)?;
        check_range(
            "num_attention_heads",
            self.num_attention_heads,
            1,
            MAX_ATTENTION_HEADS,
        )?;
        if self.num_attention_heads > self.input_dim {
            return Err(HyperlexError::invalid_config(format!(
                "num_attention_heads ({}) exceeds input_dim ({})",
                self.num_attention_heads, self.input_dim
            )));
        }
        if self.embedding_dim != self.input_dim {
            return Err(HyperlexError::invalid_config(format!(
                "embedding_dim ({}) must equal input_dim ({})",
                self.embedding_dim, self.input_dim
            )));
        }
        Ok(())
    }

    /// Builder-style override of the layer count.
    #[must_use]
    pub fn with_num_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    /// Set both `input_dim` and `embedding_dim`.
    #[must_use]
    pub fn with_input_dim(mut self, dim: usize) -> Self {
        self.input_dim = dim;
        self.embedding_dim = dim;
        self
    }

    /// Builder-style override of the hidden dimension.
    #[must_use]
    pub fn with_hidden_dim(mut self, dim: usize) -> Self {
        self.hidden_dim = dim;
        self
    }
}

/// How a set of embeddings is combined into one vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    /// Softmax-weighted sum.
    #[default]
    Attention,
    /// Elementwise mean.
    Mean,
    /// Elementwise maximum.
    Max,
    /// Elementwise sum.
    Sum,
}

impl std::str::FromStr for AggregationMode {
    type Err = HyperlexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attention" => Ok(Self::Attention),
            "mean" => Ok(Self::Mean),
            "max" => Ok(Self::Max),
            "sum" => Ok(Self::Sum),
            other => Err(HyperlexError::invalid_argument(format!(
                "unknown aggregation mode '{other}'"
            ))),
        }
    }
}

/// Community detection and link prediction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Aggregation used in both message-passing phases.
    pub aggregation: AggregationMode,
    /// Cosine similarity at which two nodes join the same community.
    pub community_threshold: f64,
    /// Minimum cosine score for a reported link prediction.
    pub link_threshold: f64,
    /// Number of nodes (in insertion order) considered as link endpoints.
    pub max_link_candidates: usize,
    /// Maximum number of link predictions reported.
    pub max_link_predictions: usize,
    /// Same-domain principles or precedents conflict when their cosine
    /// similarity falls to `-conflict_threshold` or below.
    pub conflict_threshold: f64,
    /// Seed for embedding initialisation and layer weights.
    pub seed: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            aggregation: AggregationMode::Attention,
            community_threshold: 0.7,
            link_threshold: 0.7,
            max_link_candidates: 10,
            max_link_predictions: 10,
            conflict_threshold: 0.8,
            seed: 42,
        }
    }
}

impl AnalysisConfig {
    /// Check documented ranges.
    pub fn validate(&self) -> HyperlexResult<()> {
        check_similarity("community_threshold", self.community_threshold)?;
        check_similarity("link_threshold", self.link_threshold)?;
        if !(0.0..=1.0).contains(&self.conflict_threshold) {
            return Err(HyperlexError::invalid_config(format!(
                "conflict_threshold must be in [0, 1], got {}",
                self.conflict_threshold
            )));
        }
        Ok(())
    }
}

/// Bounds for the clustering loop used by hierarchical coarsening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoarseningConfig {
    /// Refinement rounds before the loop stops regardless of convergence.
    pub max_iterations: usize,
    /// Scale of the co-membership bonus added to embedding similarity.
    pub affinity_weight: f64,
}

impl Default for CoarseningConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            affinity_weight: 0.5,
        }
    }
}

impl CoarseningConfig {
    /// Check documented ranges.
    pub fn validate(&self) -> HyperlexResult<()> {
        check_range("max_iterations", self.max_iterations, 1, 10_000)?;
        if !self.affinity_weight.is_finite() || self.affinity_weight < 0.0 {
            return Err(HyperlexError::invalid_config(format!(
                "affinity_weight must be a non-negative number, got {}",
                self.affinity_weight
            )));
        }
        Ok(())
    }
}

fn check_range(name: &str, value: usize, min: usize, max: usize) -> HyperlexResult<()> {
    if value < min || value > max {
        return Err(HyperlexError::invalid_config(format!(
            "{name} must be in {min}..={max}, got {value}"
        )));
    }
    Ok(())
}

fn check_similarity(name: &str, value: f64) -> HyperlexResult<()> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(HyperlexError::invalid_config(format!(
            "{name} must be a cosine similarity in [-1, 1], got {value}"
        )));
    }
    Ok(())
}
