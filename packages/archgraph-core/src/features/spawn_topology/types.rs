//! Spawn topology types

use serde::{Deserialize, Serialize};

use crate::shared::models::CodeLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskNodeKind {
    Main,
    Spawned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnType {
    NamedFunc,
    AnonymousFunc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: String,
    /// Spawned callee, `<anonymous>` for a literal
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TaskNodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_type: Option<SpawnType>,
    pub package: String,
    pub location: CodeLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpawnEdgeKind {
    /// `go func() { ... }()`
    GoFunc,
    /// `go worker(jobs)`
    GoStmt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnEdge {
    /// Enclosing function or method id, or `main`
    pub from: String,
    pub to: String,
    pub spawn_type: SpawnEdgeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelDirection {
    Send,
    Receive,
    Bidirectional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: String,
    pub direction: ChannelDirection,
    pub location: CodeLocation,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnTopology {
    pub nodes: Vec<TaskNode>,
    pub edges: Vec<SpawnEdge>,
    pub channels: Vec<ChannelInfo>,
}

impl SpawnTopology {
    pub fn spawned(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.iter().filter(|n| n.kind == TaskNodeKind::Spawned)
    }
}
