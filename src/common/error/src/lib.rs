//! Error types and result aliases for hyperlex.
//!
//! Every engine operation reports failure through [`HyperlexError`]; none of
//! them abort the process.

mod error;

pub use error::{HyperlexError, HyperlexResult};
