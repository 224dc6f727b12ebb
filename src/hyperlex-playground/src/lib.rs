//! Hyperlex Playground - Experiments and Examples
//!
//! This crate provides an executable app for experimenting with hyperlex's
//! hypergraph analysis capabilities.
//!
//! # Available Binaries
//!
//! - **`hyperlex-demo`**: HyperGNN analysis, temporal snapshots and
//!   hierarchical coarsening over sample or user-supplied case data
//!
//! # Usage
//!
//! ```bash
//! cargo run --package hyperlex-playground --bin hyperlex-demo -- analyze
//! cargo run --package hyperlex-playground --bin hyperlex-demo -- temporal --at 2.5
//! cargo run --package hyperlex-playground --bin hyperlex-demo -- hierarchy --levels 4
//! ```

pub mod data;
pub mod utils;

pub use data::{create_case_timeline, load_case_file, load_config};
pub use utils::{print_divider, print_header, print_hierarchy, print_report, print_statistics};
