//! Graph Metrics - summary statistics of an ArchJSON relation graph
//!
//! - Relation-type breakdown and inferred-relation ratio over relations only
//! - Strongly connected components by Kosaraju over known-endpoint relations

mod calculator;
mod types;

pub use calculator::MetricsCalculator;
pub use types::{AggregationLevel, GraphMetrics};
