//! Call Flow - entry points and one-hop call chains
//!
//! ```text
//! RawProject ──▶ FrameworkDetector ──▶ DetectedFrameworks
//!                                          │
//!                                          ▼
//!            EntryPointDetector (call-shape patterns, main, manual)
//!                                          │
//!                                          ▼
//!            CallChainTracer (direct calls) ──▶ NoiseFilter
//!                                          │
//!                                          ▼
//!                          protocol filter ──▶ FlowGraph
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::FlowGraphBuilder;
pub use domain::{
    CallChain, CallEdge, CallEdgeType, DetectedFrameworks, EntryPoint, FlowGraph, HttpMethod,
};
pub use infrastructure::{
    CallChainTracer, CallPattern, EntryPointDetector, FrameworkDetector, NoiseFilter,
};
