#![forbid(unsafe_code)]

mod error;
mod percolation;
mod stats;
mod union_find;

pub use error::{Error, Result};
pub use percolation::Percolation;
pub use stats::{run_trial, EstimatorConfig, PercolationStats};
pub use union_find::UnionFind;
