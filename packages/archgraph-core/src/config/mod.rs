//! Engine configuration
//!
//! Two ways in:
//!
//! ```rust,ignore
//! use archgraph_core::config::EngineConfig;
//!
//! // Code: start from defaults, override per section
//! let config = EngineConfig::default()
//!     .cycles(|c| c.warning_max_length(3))
//!     .flow(|f| f.protocols(["http", "grpc"]));
//!
//! // YAML: every field optional
//! let config = EngineConfig::from_yaml_file("archgraph.yaml")?;
//! ```
//!
//! Validation is range checks plus regex compilation of the noise patterns.

pub mod engine_config;
pub mod error;
pub mod validation;

// Re-exports
pub use engine_config::{
    AggregationConfig, CustomCallPattern, CustomFrameworkConfig, CycleConfig, EngineConfig,
    FlowConfig, ManualEntryPoint, NoiseConfig, OracleConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use validation::{Validatable, ValidatableCollection};
