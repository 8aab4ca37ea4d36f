/*
 * ArchGraph Core - Architecture Atlas Engine
 *
 * Feature-First Architecture:
 * - shared/      : ArchJSON + raw-fact models, ports, graph utilities
 * - features/    : Vertical slices (matching → package → capability → flow → spawn → metrics)
 * - pipeline/    : AtlasEngine, builds the layers concurrently from one snapshot
 * - config/      : EngineConfig (YAML)
 *
 * Performance:
 * - Layers built independently with rayon::join
 * - Oracle queries on tokio beside the pure builders
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Builders take the full fact set
#![allow(clippy::type_complexity)] // Joined layer tuples
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (one per atlas layer, plus metrics and aggregation)
pub mod features;

/// Atlas assembly
pub mod pipeline;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{ConfigError, EngineConfig};
pub use errors::{EngineError, Result};
pub use features::aggregation::{AggregationLevel, Aggregator};
pub use pipeline::{ArchitectureAtlas, AtlasEngine};
pub use shared::models::{ArchJson, RawProject};
pub use shared::ports::{Language, SemanticOracle};
