//! Feature modules
//!
//! Larger features use a layered split:
//! - domain/         - plain data types
//! - infrastructure/ - detectors, tables, sessions
//! - application/    - the use case that wires them
//!
//! Smaller ones keep `types.rs` + `builder.rs`.

// Implicit interface implementations (heuristic + semantic oracle)
pub mod structural_matching;

// Package dependency graph and cycle detection
pub mod package_graph;

// Entry points and call chains
pub mod call_flow;

// Interfaces, implementations and field usage
pub mod capability_graph;

// Concurrent task spawn topology
pub mod spawn_topology;

// Counts, relation breakdown, SCCs
pub mod graph_metrics;

// Method / class / package views of an ArchJSON document
pub mod aggregation;

// Raw facts -> ArchJSON entities and relations
pub mod arch_mapping;
