//! Structural Matching - implicit interface implementations
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Application:  StructuralMatcher                     │
//! │    oracle tier ──(error/timeout)──▶ heuristic for all │
//! │    oracle tier ──(unresolved types)──▶ heuristic      │
//! ├──────────────────────────────────────────────────────┤
//! │  Infrastructure:                                     │
//! │    - HeuristicMatcher (method-name subset, rayon)    │
//! │    - OracleSession (lifecycle + tokio timeouts)      │
//! ├──────────────────────────────────────────────────────┤
//! │  Domain: InferredImplementation, MatchStrategy,      │
//! │          MatchOutcome, FallbackReason                │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::StructuralMatcher;
pub use domain::{FallbackReason, InferredImplementation, MatchOutcome, MatchStrategy, TypeRef};
pub use infrastructure::{HeuristicMatcher, OracleSession, SessionState};
