//! Call flow domain: entry points, call chains, detected frameworks

use serde::{Deserialize, Serialize};

use crate::shared::models::CodeLocation;

/// HTTP verb bound by a route registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Any,
}

impl HttpMethod {
    pub fn as_lower(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Any => "any",
        }
    }
}

/// Where external requests enter the program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub id: String,
    /// `http-get`, `http-post`, ..., `http-handler`, or the protocol itself
    #[serde(rename = "type")]
    pub entry_type: String,
    /// `http`, `grpc`, `cli`, `message`, `scheduler` or a custom protocol
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Framework key that matched, e.g. `gin`, `net/http`, `manual`
    pub framework: String,
    pub path: String,
    /// Handler symbol; empty for an inline anonymous function
    pub handler: String,
    #[serde(default)]
    pub middleware: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub location: CodeLocation,
}

impl EntryPoint {
    pub fn type_tag(protocol: &str, method: Option<HttpMethod>) -> String {
        match (protocol, method) {
            ("http", Some(method)) => format!("http-{}", method.as_lower()),
            ("http", None) => "http-handler".to_string(),
            (other, _) => other.to_string(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.handler.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallEdgeType {
    Direct,
    Interface,
    Indirect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub edge_type: CallEdgeType,
    pub confidence: f64,
}

/// One-hop calls out of an entry point's handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallChain {
    pub id: String,
    /// Originating entry point id
    pub entry_point: String,
    pub calls: Vec<CallEdge>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    pub entry_points: Vec<EntryPoint>,
    pub call_chains: Vec<CallChain>,
}

impl FlowGraph {
    pub fn chain_for(&self, entry_id: &str) -> Option<&CallChain> {
        self.call_chains.iter().find(|c| c.entry_point == entry_id)
    }
}

/// Framework keys active for a project, in detection order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectedFrameworks(Vec<String>);

impl DetectedFrameworks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key; returns false when it was already present
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.0.push(key);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for DetectedFrameworks {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut detected = Self::new();
        for key in iter {
            detected.insert(key);
        }
        detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(EntryPoint::type_tag("http", Some(HttpMethod::Get)), "http-get");
        assert_eq!(EntryPoint::type_tag("http", None), "http-handler");
        assert_eq!(EntryPoint::type_tag("grpc", None), "grpc");
    }

    #[test]
    fn test_detected_frameworks_keep_first_order() {
        let detected: DetectedFrameworks = ["net/http", "gin", "net/http"].into_iter().collect();
        assert_eq!(detected.iter().collect::<Vec<_>>(), vec!["net/http", "gin"]);
    }
}
