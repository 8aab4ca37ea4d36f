//! Shared module - Common types and utilities
//!
//! This module contains types that are shared across all features:
//! the ArchJSON and raw-fact models, the language/oracle ports, policy
//! constants, and the graph utilities every builder leans on.

pub mod constants;
pub mod models;
pub mod ports;
pub mod utils;

// Re-exports for convenience
pub use models::*;
