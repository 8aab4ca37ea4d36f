//! Spawn Topology - which functions start concurrent tasks, and the channels they make
//!
//! Spawns and channel operations come from the raw function bodies of both
//! functions and methods. Worker-pool / pipeline classification is not attempted.

mod builder;
mod types;

pub use builder::SpawnTopologyBuilder;
pub use types::{
    ChannelDirection, ChannelInfo, SpawnEdge, SpawnEdgeKind, SpawnTopology, SpawnType, TaskNode,
    TaskNodeKind,
};
