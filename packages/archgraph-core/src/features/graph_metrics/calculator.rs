//! Metrics calculator

use std::collections::BTreeMap;

use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use super::types::{AggregationLevel, GraphMetrics};
use crate::shared::models::{Entity, InferenceSource, Relation};
use crate::shared::utils::kosaraju_scc;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn compute(entities: &[Entity], relations: &[Relation], level: AggregationLevel) -> GraphMetrics {
        let mut breakdown: BTreeMap<String, usize> = BTreeMap::new();
        for relation in relations {
            *breakdown
                .entry(relation.relation_type.as_str().to_string())
                .or_insert(0) += 1;
        }

        GraphMetrics {
            level,
            entity_count: entities.len(),
            relation_count: relations.len(),
            relation_type_breakdown: breakdown,
            strongly_connected_components: Self::scc_count(entities, relations),
            inferred_relation_ratio: Self::inferred_ratio(relations),
        }
    }

    /// Non-explicit share, rounded to two decimals; 0 for no relations
    pub fn inferred_ratio(relations: &[Relation]) -> f64 {
        if relations.is_empty() {
            return 0.0;
        }
        let inferred = relations
            .iter()
            .filter(|r| r.inference_source != InferenceSource::Explicit)
            .count();
        let ratio = inferred as f64 / relations.len() as f64;
        (ratio * 100.0).round() / 100.0
    }

    /// Entities are the nodes; relations with an unknown endpoint are left out
    pub fn scc_count(entities: &[Entity], relations: &[Relation]) -> usize {
        let mut graph: DiGraph<(), ()> = DiGraph::with_capacity(entities.len(), relations.len());
        let mut index: FxHashMap<&str, NodeIndex> = FxHashMap::default();
        for entity in entities {
            if !index.contains_key(entity.id.as_str()) {
                index.insert(entity.id.as_str(), graph.add_node(()));
            }
        }
        for relation in relations {
            if let (Some(&from), Some(&to)) = (
                index.get(relation.source.as_str()),
                index.get(relation.target.as_str()),
            ) {
                graph.add_edge(from, to, ());
            }
        }
        kosaraju_scc(&graph).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{EntityKind, RelationType, SourceLocation};
    use pretty_assertions::assert_eq;

    fn entity(id: &str) -> Entity {
        Entity::new(id, id, EntityKind::Class, SourceLocation::new("a.ts", 1, 2))
    }

    fn rel(source: &str, target: &str, t: RelationType) -> Relation {
        Relation::explicit(format!("{}-{}", source, target), t, source, target)
    }

    #[test]
    fn test_no_edges_every_node_is_a_component() {
        let entities: Vec<_> = (0..5).map(|i| entity(&format!("E{}", i))).collect();
        assert_eq!(MetricsCalculator::scc_count(&entities, &[]), 5);
    }

    #[test]
    fn test_one_big_cycle() {
        let entities: Vec<_> = (0..4).map(|i| entity(&format!("E{}", i))).collect();
        let relations: Vec<_> = (0..4)
            .map(|i| rel(&format!("E{}", i), &format!("E{}", (i + 1) % 4), RelationType::Dependency))
            .collect();
        assert_eq!(MetricsCalculator::scc_count(&entities, &relations), 1);
    }

    #[test]
    fn test_dangling_endpoints_do_not_inflate() {
        let entities = vec![entity("A"), entity("B")];
        let relations = vec![
            rel("A", "B", RelationType::Dependency),
            rel("B", "A", RelationType::Dependency),
            rel("A", "External", RelationType::Dependency),
        ];
        assert_eq!(MetricsCalculator::scc_count(&entities, &relations), 1);
    }

    #[test]
    fn test_zero_entities() {
        let metrics = MetricsCalculator::compute(&[], &[], AggregationLevel::Method);
        assert_eq!(metrics.strongly_connected_components, 0);
        assert_eq!(metrics.inferred_relation_ratio, 0.0);
        assert!(metrics.relation_type_breakdown.is_empty());
    }

    #[test]
    fn test_inferred_ratio_boundaries() {
        let explicit = vec![rel("A", "B", RelationType::Composition)];
        assert_eq!(MetricsCalculator::inferred_ratio(&explicit), 0.0);

        let inferred = vec![rel("A", "B", RelationType::Implementation)
            .with_inference(InferenceSource::Inferred, 1.0)];
        assert_eq!(MetricsCalculator::inferred_ratio(&inferred), 1.0);

        let mixed = vec![
            rel("A", "B", RelationType::Composition),
            rel("A", "C", RelationType::Composition),
            rel("B", "C", RelationType::Implementation).with_inference(InferenceSource::Oracle, 0.99),
        ];
        assert_eq!(MetricsCalculator::inferred_ratio(&mixed), 0.33);
    }

    #[test]
    fn test_breakdown_only_present_types() {
        let relations = vec![
            rel("A", "B", RelationType::Composition),
            rel("A", "C", RelationType::Composition),
            rel("B", "C", RelationType::Dependency),
        ];
        let metrics = MetricsCalculator::compute(
            &[entity("A"), entity("B"), entity("C")],
            &relations,
            AggregationLevel::Class,
        );
        assert_eq!(
            metrics.relation_type_breakdown,
            BTreeMap::from([("composition".to_string(), 2), ("dependency".to_string(), 1)])
        );
        assert_eq!(metrics.relation_count, 3);
        assert_eq!(metrics.strongly_connected_components, 3);
    }
}
