//! Aggregation - method / class / package views of one document
//!
//! `aggregate(document, level)` is a pure function: no hidden state, safe to
//! call repeatedly and concurrently. Every original entity maps to its
//! package node through [`Aggregator::package_key_for`].

mod aggregator;

pub use aggregator::Aggregator;
pub use crate::features::graph_metrics::AggregationLevel;
