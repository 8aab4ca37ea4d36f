//! Package graph types

use serde::{Deserialize, Serialize};

/// Classification tag of a package node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Internal,
    Vendor,
    Cmd,
    Tests,
    Examples,
    Testutil,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageStats {
    pub structs: usize,
    pub interfaces: usize,
    pub functions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageNode {
    /// `<module>/<fullName>`, or the package name when it has no path
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PackageKind,
    pub file_count: usize,
    pub stats: PackageStats,
}

/// Import edge between two project packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDependency {
    pub from: String,
    pub to: String,
    /// Distinct import statements from `from` to `to`
    pub strength: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleSeverity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageCycle {
    /// Package ids in cycle order
    pub packages: Vec<String>,
    pub severity: CycleSeverity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageGraph {
    pub nodes: Vec<PackageNode>,
    pub edges: Vec<PackageDependency>,
    pub cycles: Vec<PackageCycle>,
}

impl PackageGraph {
    pub fn node(&self, id: &str) -> Option<&PackageNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, from: &str, to: &str) -> Option<&PackageDependency> {
        self.edges.iter().find(|e| e.from == from && e.to == to)
    }
}
