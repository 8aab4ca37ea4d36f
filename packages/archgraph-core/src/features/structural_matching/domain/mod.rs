//! Structural matching domain
//!
//! An [`InferredImplementation`] always carries the strategy that produced
//! it; confidence and inference source are derived from that strategy and
//! cannot be set independently.

use serde::{Deserialize, Serialize};

use crate::shared::models::{InferenceSource, RawProject, RawType};
use crate::shared::ports::OracleError;
use crate::shared::constants;

/// A declared type together with the path of its package
#[derive(Debug, Clone, Copy)]
pub struct TypeRef<'a> {
    /// Module-relative package path (`RawPackage::path`)
    pub package: &'a str,
    pub ty: &'a RawType,
}

impl<'a> TypeRef<'a> {
    /// `<package-path>.<Name>`
    pub fn id(&self) -> String {
        format!("{}.{}", self.package, self.ty.name)
    }

    /// Concrete types and interfaces of a project, in input order
    pub fn collect(project: &'a RawProject) -> (Vec<TypeRef<'a>>, Vec<TypeRef<'a>>) {
        let mut structs = Vec::new();
        let mut interfaces = Vec::new();
        for pkg in &project.packages {
            let package = pkg.path();
            structs.extend(pkg.structs.iter().map(|ty| TypeRef { package, ty }));
            interfaces.extend(pkg.interfaces.iter().map(|ty| TypeRef { package, ty }));
        }
        (structs, interfaces)
    }
}

/// Which strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Method-name subset test
    Heuristic,
    /// External semantic oracle
    Oracle,
}

impl MatchStrategy {
    pub fn inference_source(&self) -> InferenceSource {
        match self {
            MatchStrategy::Heuristic => InferenceSource::Inferred,
            MatchStrategy::Oracle => InferenceSource::Oracle,
        }
    }
}

/// Inferred "concrete type implements interface" edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredImplementation {
    pub struct_name: String,
    /// Package path of the concrete type
    pub struct_package: String,
    pub interface_name: String,
    pub interface_package: String,
    /// Interface methods found on the concrete type
    pub matched_methods: Vec<String>,
    strategy: MatchStrategy,
    confidence: f64,
}

impl InferredImplementation {
    fn new(concrete: &TypeRef<'_>, interface: &TypeRef<'_>, strategy: MatchStrategy, confidence: f64) -> Self {
        Self {
            struct_name: concrete.ty.name.clone(),
            struct_package: concrete.package.to_string(),
            interface_name: interface.ty.name.clone(),
            interface_package: interface.package.to_string(),
            matched_methods: interface.ty.method_names().map(str::to_string).collect(),
            strategy,
            confidence,
        }
    }

    /// Match found by the method-name subset test
    pub fn heuristic(concrete: &TypeRef<'_>, interface: &TypeRef<'_>) -> Self {
        Self::new(
            concrete,
            interface,
            MatchStrategy::Heuristic,
            constants::confidence::HEURISTIC_MATCH,
        )
    }

    /// Match resolved by the semantic oracle
    pub fn oracle(concrete: &TypeRef<'_>, interface: &TypeRef<'_>, confidence: f64) -> Self {
        Self::new(
            concrete,
            interface,
            MatchStrategy::Oracle,
            confidence.clamp(0.0, 1.0),
        )
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn inference_source(&self) -> InferenceSource {
        self.strategy.inference_source()
    }

    pub fn struct_id(&self) -> String {
        format!("{}.{}", self.struct_package, self.struct_name)
    }

    pub fn interface_id(&self) -> String {
        format!("{}.{}", self.interface_package, self.interface_name)
    }
}

/// Why the oracle results were discarded
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    InitFailed(OracleError),
    QueryFailed { interface: String, error: OracleError },
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::InitFailed(error) => {
                write!(f, "semantic oracle failed to initialize: {}", error)
            }
            FallbackReason::QueryFailed { interface, error } => {
                write!(f, "semantic oracle failed on {}: {}", interface, error)
            }
        }
    }
}

/// Result of one matching run
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub implementations: Vec<InferredImplementation>,
    /// True when at least one result came from the oracle
    pub oracle_used: bool,
    /// Set when an oracle was supplied but its results were discarded
    pub fallback: Option<FallbackReason>,
}

impl MatchOutcome {
    pub fn count_by(&self, strategy: MatchStrategy) -> usize {
        self.implementations
            .iter()
            .filter(|i| i.strategy() == strategy)
            .count()
    }
}
