//! Centralized policy constants
//!
//! Defaults that shape user-visible output. Every one of them can be
//! overridden through [`crate::config::EngineConfig`]; the values here are
//! what existing diagrams were produced with.

/// Package cycle severity
pub mod cycles {
    /// Cycles with at most this many packages are `warning`, longer ones `error`
    pub const WARNING_MAX_LENGTH: usize = 2;
}

/// Confidence scores attached to derived relations
pub mod confidence {
    /// Heuristic method-name subset match
    pub const HEURISTIC_MATCH: f64 = 1.0;

    /// Implementation resolved by the semantic oracle
    pub const ORACLE_MATCH: f64 = 0.99;

    /// Struct field referencing a known type
    pub const FIELD_USAGE: f64 = 0.9;

    /// Direct call edge in a traced call chain (dispatch is not resolved)
    pub const DIRECT_CALL: f64 = 0.7;
}

/// Semantic oracle timeouts
pub mod oracle {
    pub const INIT_TIMEOUT_MS: u64 = 30_000;
    pub const QUERY_TIMEOUT_MS: u64 = 30_000;
}

/// Package-level aggregation
pub mod aggregation {
    /// Directory segments kept in a package key
    pub const PACKAGE_DEPTH: usize = 1;

    /// Key used for files that sit directly in a source root
    pub const ROOT_PACKAGE: &str = "(root)";

    pub const SOURCE_ROOT: &str = "src";
}

/// Layer builders
pub mod parallel {
    /// Below this many structs × interfaces the heuristic matcher stays sequential
    pub const MATCH_PARALLEL_THRESHOLD: usize = 10_000;
}

/// Self-reported completeness of each atlas layer, 0.0 to 1.0
pub mod completeness {
    pub const PACKAGE: f64 = 1.0;
    pub const CAPABILITY: f64 = 0.85;
    /// Oracle-confirmed implementations
    pub const CAPABILITY_ORACLE: f64 = 0.95;
    pub const SPAWN_FULL_BODIES: f64 = 0.7;
    pub const SPAWN_PARTIAL_BODIES: f64 = 0.5;
    pub const FLOW: f64 = 0.6;
}
