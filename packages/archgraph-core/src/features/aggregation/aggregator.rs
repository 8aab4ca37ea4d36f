//! Three-level aggregation of an ArchJSON document
//!
//! - `method`: identity
//! - `class`: every entity, public members only
//! - `package`: entities folded by declaring package (source directory when
//!   the id has none), relations folded per (source package, target package, type)
//!
//! Entity count never grows from method to class to package.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::config::AggregationConfig;
use crate::features::graph_metrics::{AggregationLevel, MetricsCalculator};
use crate::shared::constants::aggregation::ROOT_PACKAGE;
use crate::shared::models::{
    ArchJson, Entity, EntityKind, InferenceSource, Relation, RelationType, SourceLocation,
    Visibility,
};

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregationConfig,
}

impl Aggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Pure: the input is never modified, metrics are recomputed for `level`
    pub fn aggregate(&self, doc: &ArchJson, level: AggregationLevel) -> ArchJson {
        let mut out = match level {
            AggregationLevel::Method => doc.clone(),
            AggregationLevel::Class => Self::class_level(doc),
            AggregationLevel::Package => self.package_level(doc),
        };
        out.metrics = Some(MetricsCalculator::compute(&out.entities, &out.relations, level));
        out
    }

    fn class_level(doc: &ArchJson) -> ArchJson {
        let mut out = doc.clone();
        for entity in &mut out.entities {
            entity.members.retain(|m| m.visibility == Visibility::Public);
        }
        out
    }

    fn package_level(&self, doc: &ArchJson) -> ArchJson {
        // package key -> location of its first entity, sorted by key
        let mut packages: BTreeMap<String, SourceLocation> = BTreeMap::new();
        let mut owner: FxHashMap<&str, String> = FxHashMap::default();
        for entity in &doc.entities {
            let key = self.package_key_for(entity);
            packages
                .entry(key.clone())
                .or_insert_with(|| entity.source_location.clone());
            owner.entry(entity.id.as_str()).or_insert(key);
        }

        let mut relations: Vec<Relation> = Vec::new();
        let mut index: FxHashMap<(String, String, RelationType), usize> = FxHashMap::default();
        for relation in &doc.relations {
            let (Some(from), Some(to)) = (
                owner.get(relation.source.as_str()),
                owner.get(relation.target.as_str()),
            ) else {
                continue;
            };
            if from == to {
                continue;
            }
            let key = (from.clone(), to.clone(), relation.relation_type);
            match index.get(&key) {
                Some(&idx) => {
                    let folded = &mut relations[idx];
                    folded.strength = Some(folded.strength.unwrap_or(1) + 1);
                    folded.confidence = folded.confidence.max(relation.confidence);
                    if relation.inference_source == InferenceSource::Explicit {
                        folded.inference_source = InferenceSource::Explicit;
                    }
                }
                None => {
                    index.insert(key, relations.len());
                    relations.push(Relation {
                        id: format!("pkg-{}-{}-{}", from, to, relation.relation_type.as_str()),
                        relation_type: relation.relation_type,
                        source: from.clone(),
                        target: to.clone(),
                        confidence: relation.confidence,
                        inference_source: relation.inference_source,
                        strength: Some(1),
                    });
                }
            }
        }

        let entities: Vec<Entity> = packages
            .into_iter()
            .map(|(key, location)| Entity::new(key.clone(), key, EntityKind::Package, location))
            .collect();

        debug!(
            "aggregation: {} entities folded into {} packages",
            doc.entities.len(),
            entities.len()
        );

        let mut out = doc.clone();
        out.entities = entities;
        out.relations = relations;
        out
    }

    /// Package node an entity folds into.
    ///
    /// The declaring package path carried in the id (`pkg/store.SQLStore`
    /// folds into `pkg/store`). Ids without a package path fall back to the
    /// file directory rule of [`Self::package_key`].
    pub fn package_key_for(&self, entity: &Entity) -> String {
        match Self::declaring_package(&entity.id) {
            Some(package) => package.to_string(),
            None => self.package_key(&entity.source_location.file),
        }
    }

    /// Prefix before the last `.` of an entity id, if any
    fn declaring_package(id: &str) -> Option<&str> {
        id.rsplit_once('.')
            .map(|(package, _)| package)
            .filter(|package| !package.is_empty())
    }

    /// Directory of `file` after the source root marker that ends last, cut
    /// to `package_depth` segments. Files directly in a source root (or with
    /// no directory) fold into `(root)`.
    pub fn package_key(&self, file: &str) -> String {
        let normalized = file.replace('\\', "/");
        let rest = match self.source_root_end(&normalized) {
            Some(end) => &normalized[end..],
            None => normalized.as_str(),
        };

        let dir = match rest.rfind('/') {
            Some(pos) => &rest[..pos],
            None => "",
        };
        let segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return ROOT_PACKAGE.to_string();
        }
        let take = self
            .config
            .package_depth
            .map_or(segments.len(), |depth| depth.min(segments.len()));
        segments[..take].join("/")
    }

    /// Byte offset just past the latest-ending source root marker
    fn source_root_end(&self, path: &str) -> Option<usize> {
        self.config
            .source_roots
            .iter()
            .filter_map(|root| {
                let marker = format!("/{}/", root);
                match path.rfind(&marker) {
                    Some(pos) => Some(pos + marker.len()),
                    None => path
                        .starts_with(&format!("{}/", root))
                        .then(|| root.len() + 1),
                }
            })
            .max()
    }

    /// Original entity ids folded into a package node
    pub fn constituents<'a>(&self, doc: &'a ArchJson, package: &str) -> Vec<&'a str> {
        doc.entities
            .iter()
            .filter(|e| self.package_key_for(e) == package)
            .map(|e| e.id.as_str())
            .collect()
    }
}
