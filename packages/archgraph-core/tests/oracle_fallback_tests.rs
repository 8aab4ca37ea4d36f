//! Oracle-backed atlas builds
//!
//! The oracle can only improve the capability layer; any failure leaves
//! the atlas identical to a heuristic build plus a warning.

mod common;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use archgraph_core::features::capability_graph::CapabilityEdgeKind;
use archgraph_core::shared::models::InferenceSource;
use archgraph_core::shared::ports::{OracleError, OracleImplementation};
use archgraph_core::{AtlasEngine, EngineConfig, SemanticOracle};
use async_trait::async_trait;
use common::shop_project;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct FakeOracle {
    answers: HashMap<&'static str, Vec<&'static str>>,
    init_error: Option<OracleError>,
    hang_queries: bool,
}

#[async_trait]
impl SemanticOracle for FakeOracle {
    async fn initialize(&mut self, _root: &Path) -> Result<(), OracleError> {
        match self.init_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn get_implementations(
        &mut self,
        interface_name: &str,
        _file: &str,
        _line: u32,
    ) -> Result<Vec<OracleImplementation>, OracleError> {
        if self.hang_queries {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(self
            .answers
            .get(interface_name)
            .map(|structs| {
                structs
                    .iter()
                    .map(|s| OracleImplementation {
                        struct_name: s.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn dispose(&mut self) {}
}

fn engine() -> AtlasEngine {
    AtlasEngine::new(EngineConfig::default().oracle(|o| o.query_timeout_ms(50))).unwrap()
}

fn implements(atlas: &archgraph_core::ArchitectureAtlas) -> Vec<(String, f64)> {
    atlas
        .layers
        .capability
        .edges_of(CapabilityEdgeKind::Implements)
        .map(|e| (e.source.clone(), e.confidence))
        .collect()
}

#[tokio::test]
async fn test_oracle_answers_replace_heuristic() {
    let oracle = FakeOracle {
        answers: HashMap::from([("Store", vec!["SQLStore"]), ("Runner", vec!["UserService"])]),
        ..FakeOracle::default()
    };
    let atlas = engine()
        .build_atlas_with_oracle(Arc::new(shop_project()), Some(Box::new(oracle)))
        .await;

    assert!(atlas.metadata.oracle_used);
    assert!(atlas.metadata.warnings.is_empty());
    assert_eq!(atlas.metadata.completeness.capability, 0.95);
    assert_eq!(
        implements(&atlas),
        vec![
            ("pkg/store.SQLStore".to_string(), 0.99),
            ("pkg/service.UserService".to_string(), 0.99),
        ]
    );
}

#[tokio::test]
async fn test_unresolved_structs_use_heuristic() {
    let oracle = FakeOracle {
        answers: HashMap::from([("Store", vec!["SQLStore"])]),
        ..FakeOracle::default()
    };
    let doc = engine()
        .analyze_with_oracle(Arc::new(shop_project()), Some(Box::new(oracle)))
        .await
        .unwrap();

    let sources: Vec<_> = doc
        .relations
        .iter()
        .filter(|r| r.inference_source != InferenceSource::Explicit)
        .map(|r| (r.source.as_str(), r.inference_source))
        .collect();
    assert_eq!(
        sources,
        vec![
            ("pkg/store.SQLStore", InferenceSource::Oracle),
            ("pkg/service.UserService", InferenceSource::Inferred),
        ]
    );
}

#[tokio::test]
async fn test_init_failure_falls_back() {
    let oracle = FakeOracle {
        init_error: Some(OracleError::Unavailable("gopls not on PATH".to_string())),
        ..FakeOracle::default()
    };
    let engine = engine();
    let project = Arc::new(shop_project());
    let atlas = engine
        .build_atlas_with_oracle(Arc::clone(&project), Some(Box::new(oracle)))
        .await;
    let heuristic = engine.build_atlas(&project);

    assert!(!atlas.metadata.oracle_used);
    assert_eq!(atlas.metadata.warnings.len(), 1);
    assert!(atlas.metadata.warnings[0].contains("gopls not on PATH"));
    assert_eq!(atlas.layers, heuristic.layers);
}

#[tokio::test]
async fn test_query_timeout_falls_back() {
    let oracle = FakeOracle {
        answers: HashMap::from([("Store", vec!["SQLStore"])]),
        hang_queries: true,
        ..FakeOracle::default()
    };
    let atlas = engine()
        .build_atlas_with_oracle(Arc::new(shop_project()), Some(Box::new(oracle)))
        .await;

    assert!(!atlas.metadata.oracle_used);
    assert!(atlas.metadata.warnings[0].contains("timed out"));
    assert_eq!(
        implements(&atlas),
        vec![
            ("pkg/store.SQLStore".to_string(), 1.0),
            ("pkg/service.UserService".to_string(), 1.0),
        ]
    );
}
