//! Utility modules shared across features
//!
//! - `graph`: stable adjacency, cycle detection and SCC (explicit stacks)
//! - `type_names`: Go-style type string normalisation
//! - `type_index`: field type -> declared type id

pub mod graph;
pub mod type_index;
pub mod type_names;

// Re-exports for convenience
pub use graph::{find_cycles, kosaraju_scc, StableGraph};
pub use type_index::{DeclaredKind, TypeIndex};
pub use type_names::{normalize_field_type, type_qualifier};
