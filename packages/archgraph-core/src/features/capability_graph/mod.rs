//! Capability Graph - who implements and who consumes each interface
//!
//! - `implements` edges come from structural matching, confidence carried through
//! - `uses` edges come from struct fields whose type resolves to a project type
//! - Struct nodes appear only when an edge references them

mod builder;
mod types;

pub use builder::CapabilityGraphBuilder;
pub use types::{
    CapabilityEdge, CapabilityEdgeKind, CapabilityGraph, CapabilityNode, CapabilityNodeKind,
    ConcreteUsageRisk, UsageContext,
};
