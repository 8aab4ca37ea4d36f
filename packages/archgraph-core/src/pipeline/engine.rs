//! AtlasEngine: builds every layer from one immutable snapshot
//!
//! Layers never read each other's output. The only ordering constraint is
//! matcher → capability graph; package, flow and spawn layers run beside it.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use super::atlas::{
    ArchitectureAtlas, AtlasLayers, AtlasMetadata, AtlasPerformance, LayerCompleteness,
    ATLAS_VERSION,
};
use crate::config::{ConfigResult, EngineConfig, Validatable};
use crate::errors::Result;
use crate::features::aggregation::Aggregator;
use crate::features::arch_mapping::ArchJsonMapper;
use crate::features::call_flow::{DetectedFrameworks, FlowGraph, FlowGraphBuilder};
use crate::features::capability_graph::CapabilityGraphBuilder;
use crate::features::graph_metrics::{AggregationLevel, MetricsCalculator};
use crate::features::package_graph::{DependencyGraphBuilder, PackageGraph};
use crate::features::spawn_topology::{SpawnTopology, SpawnTopologyBuilder};
use crate::features::structural_matching::{MatchOutcome, StructuralMatcher};
use crate::shared::models::{ArchExtensions, ArchJson, DecodeReport, RawProject};
use crate::shared::ports::SemanticOracle;

/// Layers that do not depend on matcher output
type IndependentLayers = (PackageGraph, (DetectedFrameworks, FlowGraph), SpawnTopology);

#[derive(Debug, Clone)]
pub struct AtlasEngine {
    config: EngineConfig,
    matcher: StructuralMatcher,
    packages: DependencyGraphBuilder,
    capabilities: CapabilityGraphBuilder,
    flow: FlowGraphBuilder,
    spawns: SpawnTopologyBuilder,
    aggregator: Aggregator,
}

impl AtlasEngine {
    /// Validates the configuration and compiles the noise patterns
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            matcher: StructuralMatcher::new(config.oracle.clone()),
            packages: DependencyGraphBuilder::new(config.cycles.clone()),
            capabilities: CapabilityGraphBuilder::new(),
            flow: FlowGraphBuilder::new(config.flow.clone())?,
            spawns: SpawnTopologyBuilder::new(),
            aggregator: Aggregator::new(config.aggregation.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Heuristic matching only; all layers built in parallel
    pub fn build_atlas(&self, project: &RawProject) -> ArchitectureAtlas {
        self.build_atlas_with_outcome(project).0
    }

    fn build_atlas_with_outcome(&self, project: &RawProject) -> (ArchitectureAtlas, MatchOutcome) {
        let start = Instant::now();
        let ((outcome, capability), independent) = join(
            || {
                let outcome = self.matcher.match_heuristic(project);
                let capability = self.capabilities.build(project, &outcome.implementations);
                (outcome, capability)
            },
            || self.independent_layers(project),
        );
        let (package, (frameworks, flow), spawn) = independent;

        let layers = AtlasLayers {
            package,
            capability,
            spawn,
            flow,
        };
        let atlas = self.assemble(project, layers, frameworks, &outcome, start);
        (atlas, outcome)
    }

    /// Oracle-backed matching beside the pure builders.
    ///
    /// The pure layers run on a blocking task while the oracle is queried
    /// on this one; the capability layer waits for both. Oracle failures
    /// never fail the build, they show up in `metadata.warnings`.
    pub async fn build_atlas_with_oracle(
        &self,
        project: Arc<RawProject>,
        oracle: Option<Box<dyn SemanticOracle>>,
    ) -> ArchitectureAtlas {
        self.build_atlas_with_oracle_outcome(project, oracle).await.0
    }

    async fn build_atlas_with_oracle_outcome(
        &self,
        project: Arc<RawProject>,
        oracle: Option<Box<dyn SemanticOracle>>,
    ) -> (ArchitectureAtlas, MatchOutcome) {
        let start = Instant::now();

        let engine = self.clone();
        let snapshot = Arc::clone(&project);
        let pure = tokio::task::spawn_blocking(move || engine.independent_layers(&snapshot));

        let (outcome, pure) = tokio::join!(self.matcher.match_with_oracle(&project, oracle), pure);
        let (package, (frameworks, flow), spawn) = match pure {
            Ok(layers) => layers,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                // cancelled by runtime shutdown; build inline instead
                warn!("atlas: blocking layer task did not complete: {}", e);
                self.independent_layers(&project)
            }
        };

        let capability = self.capabilities.build(&project, &outcome.implementations);
        let layers = AtlasLayers {
            package,
            capability,
            spawn,
            flow,
        };
        let atlas = self.assemble(&project, layers, frameworks, &outcome, start);
        (atlas, outcome)
    }

    fn independent_layers(&self, project: &RawProject) -> IndependentLayers {
        let (package, (flow, spawn)) = join(
            || self.packages.build(project),
            || {
                join(
                    || self.flow.detect_and_build(project),
                    || self.spawns.build(project),
                )
            },
        );
        (package, flow, spawn)
    }

    fn assemble(
        &self,
        project: &RawProject,
        layers: AtlasLayers,
        frameworks: DetectedFrameworks,
        outcome: &MatchOutcome,
        start: Instant,
    ) -> ArchitectureAtlas {
        let mut warnings = Vec::new();
        if let Some(reason) = &outcome.fallback {
            warn!("atlas: heuristic fallback: {}", reason);
            warnings.push(reason.to_string());
        }

        let total_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "atlas: {} packages, {} implementations, {} entry points, {} spawns in {}ms",
            layers.package.nodes.len(),
            outcome.implementations.len(),
            layers.flow.entry_points.len(),
            layers.spawn.edges.len(),
            total_ms
        );

        ArchitectureAtlas {
            version: ATLAS_VERSION.to_string(),
            layers,
            metadata: AtlasMetadata {
                generated_at: chrono::Utc::now(),
                detected_frameworks: frameworks,
                protocols: self
                    .config
                    .flow
                    .protocols
                    .clone()
                    .filter(|p| !p.is_empty()),
                oracle_used: outcome.oracle_used,
                warnings,
                completeness: LayerCompleteness::estimate(project, outcome.oracle_used),
                performance: AtlasPerformance {
                    package_count: project.packages.len(),
                    total_ms,
                },
            },
        }
    }

    /// Method-level ArchJSON document with the atlas attached
    pub fn analyze(&self, project: &RawProject) -> Result<ArchJson> {
        let (atlas, outcome) = self.build_atlas_with_outcome(project);
        Self::document(project, atlas, &outcome)
    }

    pub async fn analyze_with_oracle(
        &self,
        project: Arc<RawProject>,
        oracle: Option<Box<dyn SemanticOracle>>,
    ) -> Result<ArchJson> {
        let (atlas, outcome) = self
            .build_atlas_with_oracle_outcome(Arc::clone(&project), oracle)
            .await;
        Self::document(&project, atlas, &outcome)
    }

    /// Lenient decode then [`Self::analyze`]; skipped records are returned
    /// alongside the document
    pub fn analyze_json(&self, json: &str) -> Result<(ArchJson, DecodeReport)> {
        let report = RawProject::from_json_lenient(json)?;
        if !report.skipped.is_empty() {
            warn!("atlas: {} malformed raw records skipped", report.skipped.len());
        }
        let doc = self.analyze(&report.project)?;
        Ok((doc, report))
    }

    fn document(
        project: &RawProject,
        atlas: ArchitectureAtlas,
        outcome: &MatchOutcome,
    ) -> Result<ArchJson> {
        let mut doc = ArchJsonMapper::map(project, &outcome.implementations)?;
        doc.metrics = Some(MetricsCalculator::compute(
            &doc.entities,
            &doc.relations,
            AggregationLevel::Method,
        ));
        doc.extensions = Some(ArchExtensions { atlas: Some(atlas) });
        Ok(doc)
    }

    /// Aggregate with the configured package depth and source roots
    pub fn aggregate(&self, doc: &ArchJson, level: AggregationLevel) -> ArchJson {
        self.aggregator.aggregate(doc, level)
    }
}

fn join<A, B, RA, RB>(a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    #[cfg(feature = "parallel")]
    {
        rayon::join(a, b)
    }
    #[cfg(not(feature = "parallel"))]
    {
        (a(), b())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::shared::models::{
        RawCall, RawFunc, RawFunctionBody, RawImport, RawLocation, RawPackage, RawSpawn, RawType,
    };
    use pretty_assertions::assert_eq;

    fn func(name: &str, body: Option<RawFunctionBody>) -> RawFunc {
        RawFunc {
            name: name.to_string(),
            receiver_type: None,
            parameters: vec![],
            return_types: vec![],
            exported: true,
            location: RawLocation::new("cmd/app/main.go", 5, 20),
            body,
        }
    }

    fn ty(name: &str, methods: &[&str]) -> RawType {
        RawType {
            name: name.to_string(),
            package_name: "store".to_string(),
            fields: vec![],
            methods: methods.iter().map(|m| func(m, None)).collect(),
            exported: true,
            location: RawLocation::new("internal/store/store.go", 1, 10),
        }
    }

    fn project() -> RawProject {
        let mut store = RawPackage::new("store", "internal/store");
        store.source_files = vec!["internal/store/store.go".to_string()];
        store.interfaces.push(ty("Store", &["Get"]));
        store.structs.push(ty("MemStore", &["Get", "Set"]));

        let mut main = RawPackage::new("main", "cmd/app");
        main.source_files = vec!["cmd/app/main.go".to_string()];
        main.imports.push(RawImport {
            path: "example.com/shop/internal/store".to_string(),
            alias: None,
            location: None,
        });
        main.functions.push(func(
            "main",
            Some(RawFunctionBody {
                calls: vec![RawCall {
                    function_name: "Get".to_string(),
                    package_name: None,
                    receiver_type: None,
                    args: vec![],
                    location: RawLocation::new("cmd/app/main.go", 8, 8),
                }],
                spawns: vec![RawSpawn {
                    call: RawCall {
                        function_name: "worker".to_string(),
                        package_name: None,
                        receiver_type: None,
                        args: vec![],
                        location: RawLocation::new("cmd/app/main.go", 9, 9),
                    },
                    location: RawLocation::new("cmd/app/main.go", 9, 9),
                }],
                channel_ops: vec![],
            }),
        ));

        RawProject::new(Default::default(), "example.com/shop")
            .with_package(store)
            .with_package(main)
    }

    #[test]
    fn test_build_atlas_fills_every_layer() {
        let engine = AtlasEngine::new(EngineConfig::default()).unwrap();
        let atlas = engine.build_atlas(&project());

        assert_eq!(atlas.layers.package.nodes.len(), 2);
        assert_eq!(atlas.layers.package.edges.len(), 1);
        assert_eq!(atlas.layers.capability.edges.len(), 1);
        assert_eq!(atlas.layers.spawn.edges.len(), 1);
        assert!(atlas.layers.flow.entry_points.iter().any(|e| e.protocol == "cli"));
        assert!(atlas.metadata.detected_frameworks.contains("main"));
        assert!(!atlas.metadata.oracle_used);
        assert!(atlas.metadata.warnings.is_empty());
        assert_eq!(atlas.metadata.performance.package_count, 2);
    }

    #[test]
    fn test_analyze_attaches_atlas_and_metrics() {
        let engine = AtlasEngine::new(EngineConfig::default()).unwrap();
        let doc = engine.analyze(&project()).unwrap();

        assert_eq!(doc.entities.len(), 2);
        let metrics = doc.metrics.as_ref().unwrap();
        assert_eq!(metrics.level, AggregationLevel::Method);
        assert_eq!(metrics.inferred_relation_ratio, 1.0);
        let atlas = doc.extensions.as_ref().and_then(|e| e.atlas.as_ref()).unwrap();
        assert_eq!(atlas.version, ATLAS_VERSION);
    }

    #[test]
    fn test_protocol_filter_reported() {
        let config = EngineConfig::default().flow(|f| f.protocols(["http"]));
        let engine = AtlasEngine::new(config).unwrap();
        let atlas = engine.build_atlas(&project());
        assert!(atlas.layers.flow.entry_points.is_empty());
        assert_eq!(atlas.metadata.protocols, Some(vec!["http".to_string()]));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig::default().flow(|f| f.call_edge_confidence(1.5));
        assert!(matches!(AtlasEngine::new(config), Err(ConfigError::Range { .. })));
    }

    #[test]
    fn test_analyze_json_reports_skipped() {
        let engine = AtlasEngine::new(EngineConfig::default()).unwrap();
        let json = r#"{"language":"go","packages":[{"name":"a","structs":[{"bad":1}]}]}"#;
        let (doc, report) = engine.analyze_json(json).unwrap();
        assert!(doc.entities.is_empty());
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_atlas_serializes() {
        let engine = AtlasEngine::new(EngineConfig::default()).unwrap();
        let atlas = engine.build_atlas(&project());
        let json = atlas.to_json_pretty().unwrap();
        assert!(json.contains("\"detectedFrameworks\""));
        let back: ArchitectureAtlas = serde_json::from_str(&json).unwrap();
        assert_eq!(back.layers, atlas.layers);
        assert!(atlas.to_yaml().unwrap().contains("generatedAt"));
    }

    #[tokio::test]
    async fn test_oracle_absent_matches_heuristic() {
        let engine = AtlasEngine::new(EngineConfig::default()).unwrap();
        let project = Arc::new(project());
        let atlas = engine.build_atlas_with_oracle(Arc::clone(&project), None).await;
        let sync = engine.build_atlas(&project);
        assert_eq!(atlas.layers, sync.layers);
        assert!(!atlas.metadata.oracle_used);
    }
}
