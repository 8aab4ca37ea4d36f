//! Spawn topology builder

use tracing::info;

use super::types::{
    ChannelDirection, ChannelInfo, SpawnEdge, SpawnEdgeKind, SpawnTopology, SpawnType, TaskNode,
    TaskNodeKind,
};
use crate::shared::models::{
    ChannelOperation, CodeLocation, RawFunctionBody, RawPackage, RawProject, RawSpawn,
};

/// Callee name the extractors use for a function literal
const ANONYMOUS: &str = "<anonymous>";
const MAIN_ID: &str = "main";

#[derive(Debug, Clone, Default)]
pub struct SpawnTopologyBuilder;

impl SpawnTopologyBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, project: &RawProject) -> SpawnTopology {
        let mut topology = SpawnTopology::default();

        for pkg in &project.packages {
            let package = pkg.path();
            for func in &pkg.functions {
                let is_main = pkg.name == "main" && func.name == "main";
                if is_main {
                    topology.nodes.push(TaskNode {
                        id: MAIN_ID.to_string(),
                        name: "main.main".to_string(),
                        kind: TaskNodeKind::Main,
                        spawn_type: None,
                        package: package.to_string(),
                        location: CodeLocation::from(&func.location),
                    });
                }
                if let Some(body) = &func.body {
                    let from = if is_main {
                        MAIN_ID.to_string()
                    } else {
                        format!("{}.{}", package, func.name)
                    };
                    Self::scan(pkg, &func.name, from, body, &mut topology);
                }
            }

            for st in &pkg.structs {
                for method in &st.methods {
                    if let Some(body) = &method.body {
                        let parent = format!("{}.{}", st.name, method.name);
                        let from = format!("{}.{}", package, parent);
                        Self::scan(pkg, &parent, from, body, &mut topology);
                    }
                }
            }
        }

        info!(
            "spawn topology: {} nodes, {} edges, {} channels",
            topology.nodes.len(),
            topology.edges.len(),
            topology.channels.len()
        );
        topology
    }

    fn scan(
        pkg: &RawPackage,
        parent: &str,
        from: String,
        body: &RawFunctionBody,
        topology: &mut SpawnTopology,
    ) {
        let package = pkg.path();
        for spawn in &body.spawns {
            let id = format!("{}.{}.spawn-{}", package, parent, spawn.location.start_line);
            let anonymous = is_anonymous(spawn);
            topology.nodes.push(TaskNode {
                id: id.clone(),
                name: spawn.call.function_name.clone(),
                kind: TaskNodeKind::Spawned,
                spawn_type: Some(if anonymous {
                    SpawnType::AnonymousFunc
                } else {
                    SpawnType::NamedFunc
                }),
                package: package.to_string(),
                location: CodeLocation::from(&spawn.location),
            });
            topology.edges.push(SpawnEdge {
                from: from.clone(),
                to: id,
                spawn_type: if anonymous {
                    SpawnEdgeKind::GoFunc
                } else {
                    SpawnEdgeKind::GoStmt
                },
            });
        }

        for op in body
            .channel_ops
            .iter()
            .filter(|op| op.operation == ChannelOperation::Make)
        {
            topology.channels.push(ChannelInfo {
                id: format!("chan-{}-{}", package, op.location.start_line),
                name: op.channel_name.clone(),
                channel_type: "chan".to_string(),
                direction: ChannelDirection::Bidirectional,
                location: CodeLocation::from(&op.location),
            });
        }
    }
}

fn is_anonymous(spawn: &RawSpawn) -> bool {
    spawn.call.function_name == ANONYMOUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{RawCall, RawChannelOp, RawFunc, RawLocation, RawType};
    use pretty_assertions::assert_eq;

    fn spawn(callee: &str, line: u32) -> RawSpawn {
        let location = RawLocation::new("cmd/app/main.go", line, line);
        RawSpawn {
            call: RawCall {
                function_name: callee.to_string(),
                package_name: None,
                receiver_type: None,
                args: vec![],
                location: location.clone(),
            },
            location,
        }
    }

    fn func(name: &str, body: RawFunctionBody) -> RawFunc {
        RawFunc {
            name: name.to_string(),
            receiver_type: None,
            parameters: vec![],
            return_types: vec![],
            exported: false,
            location: RawLocation::new("cmd/app/main.go", 3, 40),
            body: Some(body),
        }
    }

    fn project() -> RawProject {
        let mut app = RawPackage::new("main", "cmd/app");
        app.functions.push(func(
            "main",
            RawFunctionBody {
                spawns: vec![spawn("worker", 8), spawn(ANONYMOUS, 12)],
                channel_ops: vec![
                    RawChannelOp {
                        channel_name: "jobs".to_string(),
                        operation: ChannelOperation::Make,
                        location: RawLocation::new("cmd/app/main.go", 5, 5),
                    },
                    RawChannelOp {
                        channel_name: "jobs".to_string(),
                        operation: ChannelOperation::Send,
                        location: RawLocation::new("cmd/app/main.go", 14, 14),
                    },
                ],
                ..RawFunctionBody::default()
            },
        ));

        let mut server = RawPackage::new("server", "pkg/server");
        server.structs.push(RawType {
            name: "Server".to_string(),
            package_name: "server".to_string(),
            fields: vec![],
            methods: vec![func(
                "Start",
                RawFunctionBody {
                    spawns: vec![spawn("s.handleConn", 30)],
                    ..RawFunctionBody::default()
                },
            )],
            exported: true,
            location: RawLocation::new("pkg/server/server.go", 1, 50),
        });

        RawProject::default().with_package(app).with_package(server)
    }

    #[test]
    fn test_nodes_and_edges() {
        let topology = SpawnTopologyBuilder::new().build(&project());

        let ids: Vec<_> = topology.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "main",
                "cmd/app.main.spawn-8",
                "cmd/app.main.spawn-12",
                "pkg/server.Server.Start.spawn-30",
            ]
        );
        assert_eq!(topology.nodes[2].spawn_type, Some(SpawnType::AnonymousFunc));

        assert_eq!(
            topology.edges,
            vec![
                SpawnEdge {
                    from: "main".to_string(),
                    to: "cmd/app.main.spawn-8".to_string(),
                    spawn_type: SpawnEdgeKind::GoStmt,
                },
                SpawnEdge {
                    from: "main".to_string(),
                    to: "cmd/app.main.spawn-12".to_string(),
                    spawn_type: SpawnEdgeKind::GoFunc,
                },
                SpawnEdge {
                    from: "pkg/server.Server.Start".to_string(),
                    to: "pkg/server.Server.Start.spawn-30".to_string(),
                    spawn_type: SpawnEdgeKind::GoStmt,
                },
            ]
        );
    }

    #[test]
    fn test_only_make_ops_become_channels() {
        let topology = SpawnTopologyBuilder::new().build(&project());
        assert_eq!(topology.channels.len(), 1);
        assert_eq!(topology.channels[0].id, "chan-cmd/app-5");
        assert_eq!(topology.channels[0].name, "jobs");
    }

    #[test]
    fn test_empty_project() {
        assert_eq!(
            SpawnTopologyBuilder::new().build(&RawProject::default()),
            SpawnTopology::default()
        );
    }
}
