//! Graph metrics types

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Abstraction level of a document view, finest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationLevel {
    Method,
    Class,
    Package,
}

impl AggregationLevel {
    pub const ALL: [AggregationLevel; 3] = [
        AggregationLevel::Method,
        AggregationLevel::Class,
        AggregationLevel::Package,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationLevel::Method => "method",
            AggregationLevel::Class => "class",
            AggregationLevel::Package => "package",
        }
    }
}

impl fmt::Display for AggregationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "method" => Ok(AggregationLevel::Method),
            "class" => Ok(AggregationLevel::Class),
            "package" => Ok(AggregationLevel::Package),
            other => Err(format!("unknown aggregation level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetrics {
    pub level: AggregationLevel,
    pub entity_count: usize,
    pub relation_count: usize,
    /// Relations per type; only types that occur
    pub relation_type_breakdown: BTreeMap<String, usize>,
    pub strongly_connected_components: usize,
    /// Share of non-explicit relations, two decimals
    pub inferred_relation_ratio: f64,
}
