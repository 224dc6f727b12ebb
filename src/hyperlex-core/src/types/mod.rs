//! Attribute value and embedding types.

mod embedding;
mod value;

pub use embedding::{
    cosine_similarity, dot, ensure_same_dim, mean, norm, random_normal, stack_rows, Embedding,
};
pub use value::Value;
