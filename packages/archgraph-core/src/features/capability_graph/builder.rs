//! Capability graph builder

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use super::types::{
    CapabilityEdge, CapabilityEdgeKind, CapabilityGraph, CapabilityNode, CapabilityNodeKind,
    ConcreteUsageRisk, UsageContext,
};
use crate::features::structural_matching::InferredImplementation;
use crate::shared::constants;
use crate::shared::models::{RawField, RawProject, RawType};
use crate::shared::utils::TypeIndex;

/// Builds a [`CapabilityGraph`] from raw types and matcher output
#[derive(Debug, Clone)]
pub struct CapabilityGraphBuilder {
    uses_confidence: f64,
}

impl Default for CapabilityGraphBuilder {
    fn default() -> Self {
        Self {
            uses_confidence: constants::confidence::FIELD_USAGE,
        }
    }
}

impl CapabilityGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(
        &self,
        project: &RawProject,
        implementations: &[InferredImplementation],
    ) -> CapabilityGraph {
        let catalog = TypeCatalog::new(project);

        let mut edges: Vec<CapabilityEdge> = Vec::new();
        let mut seen: FxHashSet<(CapabilityEdgeKind, String, String)> = FxHashSet::default();
        let mut push = |edge: CapabilityEdge, edges: &mut Vec<CapabilityEdge>| {
            if seen.insert((edge.kind, edge.source.clone(), edge.target.clone())) {
                edges.push(edge);
            }
        };

        for imp in implementations {
            let source = imp.struct_id();
            let target = imp.interface_id();
            push(
                CapabilityEdge {
                    id: format!("impl-{}-{}", source, target),
                    kind: CapabilityEdgeKind::Implements,
                    source,
                    target,
                    confidence: imp.confidence(),
                    concrete_usage: false,
                    context: None,
                },
                &mut edges,
            );
        }

        let mut risks: Vec<ConcreteUsageRisk> = Vec::new();
        for pkg in &project.packages {
            for st in &pkg.structs {
                let owner = format!("{}.{}", pkg.path(), st.name);
                for field in &st.fields {
                    let Some(target) = catalog.resolve(pkg.path(), &field.type_name) else {
                        continue;
                    };
                    let location = field_location(field, st);
                    let concrete = catalog.is_struct(target);
                    let edge = CapabilityEdge {
                        id: format!("uses-{}-{}", owner, field.type_name),
                        kind: CapabilityEdgeKind::Uses,
                        source: owner.clone(),
                        target: target.to_string(),
                        confidence: self.uses_confidence,
                        concrete_usage: concrete,
                        context: Some(UsageContext {
                            field_type: true,
                            usage_locations: vec![location.clone()],
                        }),
                    };
                    let before = edges.len();
                    push(edge, &mut edges);
                    if concrete && edges.len() > before {
                        risks.push(ConcreteUsageRisk {
                            owner: owner.clone(),
                            field_type: field.type_name.clone(),
                            concrete_type: target.to_string(),
                            location,
                        });
                    }
                }
            }
        }

        let nodes = catalog.into_nodes(&edges);

        info!(
            "capability graph: {} nodes, {} edges, {} concrete usages",
            nodes.len(),
            edges.len(),
            risks.len()
        );

        CapabilityGraph {
            nodes,
            edges,
            concrete_usage_risks: risks,
        }
    }
}

fn field_location(field: &RawField, owner: &RawType) -> String {
    let location = field.location.as_ref().unwrap_or(&owner.location);
    format!("{}:{}", location.file, location.start_line)
}

/// Every declared type as a candidate node, plus the shared type lookup
struct TypeCatalog {
    nodes: Vec<CapabilityNode>,
    index: TypeIndex,
}

impl TypeCatalog {
    fn new(project: &RawProject) -> Self {
        let mut nodes = Vec::new();
        for pkg in &project.packages {
            let kinds = [
                (CapabilityNodeKind::Interface, &pkg.interfaces),
                (CapabilityNodeKind::Struct, &pkg.structs),
            ];
            for (kind, types) in kinds {
                nodes.extend(types.iter().map(|ty| CapabilityNode {
                    id: format!("{}.{}", pkg.path(), ty.name),
                    name: ty.name.clone(),
                    kind,
                    package: pkg.path().to_string(),
                    exported: ty.exported,
                    method_count: ty.methods.len(),
                    field_count: ty.fields.len(),
                    fan_in: 0,
                    fan_out: 0,
                }));
            }
        }
        Self {
            nodes,
            index: TypeIndex::build(project),
        }
    }

    fn resolve(&self, package_path: &str, field_type: &str) -> Option<&str> {
        let resolved = self.index.resolve(package_path, field_type);
        if resolved.is_none() {
            debug!("capability graph: external field type {}", field_type);
        }
        resolved
    }

    fn is_struct(&self, id: &str) -> bool {
        self.index.is_struct(id)
    }

    /// Interfaces always, structs only when an edge references them
    fn into_nodes(self, edges: &[CapabilityEdge]) -> Vec<CapabilityNode> {
        let mut incoming: FxHashMap<&str, FxHashSet<&str>> = FxHashMap::default();
        let mut outgoing: FxHashMap<&str, FxHashSet<&str>> = FxHashMap::default();
        for edge in edges {
            outgoing
                .entry(edge.source.as_str())
                .or_default()
                .insert(edge.target.as_str());
            incoming
                .entry(edge.target.as_str())
                .or_default()
                .insert(edge.source.as_str());
        }

        self.nodes
            .into_iter()
            .filter(|n| {
                n.kind == CapabilityNodeKind::Interface
                    || incoming.contains_key(n.id.as_str())
                    || outgoing.contains_key(n.id.as_str())
            })
            .map(|mut n| {
                n.fan_in = incoming.get(n.id.as_str()).map_or(0, |s| s.len());
                n.fan_out = outgoing.get(n.id.as_str()).map_or(0, |s| s.len());
                n
            })
            .collect()
    }
}
