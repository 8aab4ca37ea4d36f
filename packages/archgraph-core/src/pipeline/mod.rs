//! Atlas pipeline
//!
//! ```text
//!                 RawProject (immutable snapshot)
//!                             │
//!      ┌──────────────┬───────┴───────┬──────────────┐
//!      ▼              ▼               ▼              ▼
//!  matcher       package graph    call flow    spawn topology
//!      │
//!      ▼
//!  capability graph
//!      └──────────────┴───────┬───────┴──────────────┘
//!                             ▼
//!                   ArchitectureAtlas ──▶ ArchJSON extension
//! ```

mod atlas;
mod engine;

pub use atlas::{
    ArchitectureAtlas, AtlasLayers, AtlasMetadata, AtlasPerformance, LayerCompleteness,
    ATLAS_VERSION,
};
pub use engine::AtlasEngine;
