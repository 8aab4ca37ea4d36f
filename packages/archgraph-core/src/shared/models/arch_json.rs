//! ArchJSON document model
//!
//! Language-neutral architecture model: entities, their members, and typed
//! relations between entities. Every structure here is plain data (no back
//! pointers) so a whole document can cross a process boundary as JSON.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::raw::RawLocation;
use crate::errors::{EngineError, Result};
use crate::features::graph_metrics::GraphMetrics;
use crate::pipeline::ArchitectureAtlas;
use crate::shared::ports::Language;

/// Current ArchJSON schema version
pub const ARCH_JSON_VERSION: &str = "2.0";

/// Kind of a declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Struct,
    Interface,
    Enum,
    Function,
    /// Folded node produced by package-level aggregation
    Package,
}

/// Visibility modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
}

impl Visibility {
    /// Go-style visibility: exported identifiers are public
    pub fn from_exported(exported: bool) -> Self {
        if exported {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

/// Kind of an entity member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Property,
    Field,
    Method,
    Constructor,
}

/// Source code location of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

/// Single-line location used by the atlas layers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CodeLocation {
    pub file: String,
    pub line: u32,
}

impl CodeLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&RawLocation> for CodeLocation {
    fn from(location: &RawLocation) -> Self {
        Self::new(location.file.clone(), location.start_line)
    }
}

/// Method/function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Member of an entity (method, field/property, constructor)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: MemberKind,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
}

impl Member {
    pub fn new(name: impl Into<String>, kind: MemberKind, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility,
            return_type: None,
            parameters: None,
            field_type: None,
            is_static: false,
            is_async: false,
            is_abstract: false,
        }
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn with_field_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }
}

/// Declared type in source code
///
/// # Invariants
///
/// `id` is unique within one document. Producers namespace it on the
/// declaring package or file (`<package-path>.<Name>`), never on the bare name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub visibility: Visibility,
    #[serde(default)]
    pub members: Vec<Member>,
    pub source_location: SourceLocation,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: EntityKind,
        source_location: SourceLocation,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            members: Vec::new(),
            source_location,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    /// Method names in declaration order
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Method)
            .map(|m| m.name.as_str())
    }
}

/// Relation type between entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Inheritance,
    Implementation,
    Composition,
    Aggregation,
    Dependency,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Inheritance => "inheritance",
            RelationType::Implementation => "implementation",
            RelationType::Composition => "composition",
            RelationType::Aggregation => "aggregation",
            RelationType::Dependency => "dependency",
        }
    }
}

/// Where a relation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceSource {
    /// Derived from explicit syntax (`extends`, `implements`, field types)
    #[default]
    Explicit,
    /// Derived from heuristic matching
    Inferred,
    /// Resolved by an external semantic oracle (language server)
    Oracle,
}

/// Directed, typed edge between two entity ids
///
/// `target` may name an entity outside the document (external or
/// unresolved symbol). The same (source, target) pair may appear once per
/// relation type, never twice for the same type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub source: String,
    pub target: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub inference_source: InferenceSource,
    /// Number of fine-grained relations folded into this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<u32>,
}

fn default_confidence() -> f64 {
    1.0
}

impl Relation {
    /// Relation derived from explicit syntax (confidence 1.0)
    pub fn explicit(
        id: impl Into<String>,
        relation_type: RelationType,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            relation_type,
            source: source.into(),
            target: target.into(),
            confidence: 1.0,
            inference_source: InferenceSource::Explicit,
            strength: None,
        }
    }

    pub fn with_inference(mut self, source: InferenceSource, confidence: f64) -> Self {
        self.inference_source = source;
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Deduplication key: (source, target, type)
    pub fn key(&self) -> (&str, &str, RelationType) {
        (&self.source, &self.target, self.relation_type)
    }
}

/// Optional language-specific payloads attached to a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchExtensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atlas: Option<ArchitectureAtlas>,
}

/// The ArchJSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchJson {
    pub version: String,
    pub language: Language,
    pub timestamp: String,
    #[serde(default)]
    pub source_files: Vec<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relations: Vec<Relation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<GraphMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ArchExtensions>,
}

impl ArchJson {
    pub fn new(language: Language) -> Self {
        Self {
            version: ARCH_JSON_VERSION.to_string(),
            language,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source_files: Vec::new(),
            entities: Vec::new(),
            relations: Vec::new(),
            metrics: None,
            extensions: None,
        }
    }

    pub fn with_entities(mut self, entities: Vec<Entity>) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_relations(mut self, relations: Vec<Relation>) -> Self {
        self.relations = relations;
        self
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Check the unique-id invariant
    ///
    /// A collision is an upstream contract violation and is reported as
    /// [`EngineError::DuplicateEntityId`].
    pub fn ensure_unique_ids(&self) -> Result<()> {
        let mut seen: FxHashMap<&str, &str> = FxHashMap::default();
        for entity in &self.entities {
            if let Some(first_file) = seen.insert(&entity.id, &entity.source_location.file) {
                return Err(EngineError::DuplicateEntityId {
                    id: entity.id.clone(),
                    first_file: first_file.to_string(),
                    second_file: entity.source_location.file.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
