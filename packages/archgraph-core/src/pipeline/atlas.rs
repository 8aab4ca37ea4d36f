//! Architecture atlas: the four layers plus generation metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::features::call_flow::{DetectedFrameworks, FlowGraph};
use crate::features::capability_graph::CapabilityGraph;
use crate::features::package_graph::PackageGraph;
use crate::features::spawn_topology::SpawnTopology;
use crate::shared::constants::completeness;
use crate::shared::models::RawProject;

pub const ATLAS_VERSION: &str = "1.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasLayers {
    pub package: PackageGraph,
    pub capability: CapabilityGraph,
    pub spawn: SpawnTopology,
    pub flow: FlowGraph,
}

/// Best-effort coverage estimate per layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerCompleteness {
    pub package: f64,
    pub capability: f64,
    pub spawn: f64,
    pub flow: f64,
}

impl LayerCompleteness {
    /// Spawn coverage depends on how many functions came with a body
    pub fn estimate(project: &RawProject, oracle_used: bool) -> Self {
        let (total, with_body) = project
            .packages
            .iter()
            .flat_map(|pkg| {
                pkg.functions
                    .iter()
                    .chain(pkg.structs.iter().flat_map(|s| s.methods.iter()))
            })
            .fold((0usize, 0usize), |(total, bodies), func| {
                (total + 1, bodies + usize::from(func.body.is_some()))
            });

        Self {
            package: completeness::PACKAGE,
            capability: if oracle_used {
                completeness::CAPABILITY_ORACLE
            } else {
                completeness::CAPABILITY
            },
            spawn: if total > 0 && with_body == total {
                completeness::SPAWN_FULL_BODIES
            } else {
                completeness::SPAWN_PARTIAL_BODIES
            },
            flow: completeness::FLOW,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasPerformance {
    pub package_count: usize,
    pub total_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtlasMetadata {
    pub generated_at: DateTime<Utc>,
    pub detected_frameworks: DetectedFrameworks,
    /// `None` when entry points were not filtered by protocol
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    pub oracle_used: bool,
    /// Oracle fallback reasons and other non-fatal problems
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub completeness: LayerCompleteness,
    pub performance: AtlasPerformance,
}

/// Everything the engine derives from one raw-fact snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureAtlas {
    pub version: String,
    pub layers: AtlasLayers,
    pub metadata: AtlasMetadata,
}

impl ArchitectureAtlas {
    pub fn to_json_pretty(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> crate::errors::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
