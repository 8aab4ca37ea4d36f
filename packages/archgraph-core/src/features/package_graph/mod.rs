//! Package Graph - package-level import dependencies and cycles
//!
//! - Nodes carry a classification tag (cmd, internal, tests, vendor, ...)
//! - Edge strength counts distinct import statements
//! - Cycles come from an explicit-stack DFS; severity is a configurable policy

mod builder;
mod types;

pub use builder::DependencyGraphBuilder;
pub use types::{
    CycleSeverity, PackageCycle, PackageDependency, PackageGraph, PackageKind, PackageNode,
    PackageStats,
};
