//! Capability graph types

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityNodeKind {
    Interface,
    Struct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityNode {
    /// `<package-path>.<Name>`
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CapabilityNodeKind,
    pub package: String,
    pub exported: bool,
    pub method_count: usize,
    pub field_count: usize,
    /// Distinct nodes with an edge into this one
    pub fan_in: usize,
    /// Distinct nodes this one has an edge to
    pub fan_out: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityEdgeKind {
    Implements,
    Uses,
}

/// Where a `uses` edge was observed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageContext {
    pub field_type: bool,
    /// `file:line`
    pub usage_locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityEdge {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CapabilityEdgeKind,
    pub source: String,
    pub target: String,
    pub confidence: f64,
    /// A field typed by a concrete struct instead of an interface
    #[serde(default)]
    pub concrete_usage: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<UsageContext>,
}

/// Struct field that depends on a concrete type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteUsageRisk {
    /// Owning struct id
    pub owner: String,
    /// Field type as written
    pub field_type: String,
    /// Resolved struct id
    pub concrete_type: String,
    /// `file:line`
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityGraph {
    pub nodes: Vec<CapabilityNode>,
    pub edges: Vec<CapabilityEdge>,
    pub concrete_usage_risks: Vec<ConcreteUsageRisk>,
}

impl CapabilityGraph {
    pub fn node(&self, id: &str) -> Option<&CapabilityNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edges_of(&self, kind: CapabilityEdgeKind) -> impl Iterator<Item = &CapabilityEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }
}
