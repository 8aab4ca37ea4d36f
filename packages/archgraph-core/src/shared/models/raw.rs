//! Raw fact model
//!
//! Per-package records produced by the language-specific extractors
//! (tree-sitter bridges, compiler-API extractors). The engine consumes these
//! verbatim; it never parses source itself.
//!
//! Optional attributes are `Option`/defaulted fields. The lenient decoder
//! isolates malformed records: one bad package, type or function is skipped
//! and reported, the rest of the project still decodes.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::errors::{EngineError, Result};
use crate::shared::ports::Language;

/// Location of a raw record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLocation {
    pub file: String,
    pub start_line: u32,
    #[serde(default)]
    pub end_line: u32,
}

impl RawLocation {
    pub fn new(file: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file: file.into(),
            start_line,
            end_line,
        }
    }
}

/// Import statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImport {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RawLocation>,
}

/// Struct field / class property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RawLocation>,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Call expression found in a function body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCall {
    pub function_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_type: Option<String>,
    /// Raw argument source text, e.g. `["\"/users\"", "handler"]`
    #[serde(default)]
    pub args: Vec<String>,
    pub location: RawLocation,
}

impl RawCall {
    /// Qualified callee name (`pkg.Func` or bare `Func`)
    pub fn qualified_name(&self) -> String {
        match &self.package_name {
            Some(pkg) if !pkg.is_empty() => format!("{}.{}", pkg, self.function_name),
            _ => self.function_name.clone(),
        }
    }
}

/// Spawned concurrent task (`go f()`, `spawn(...)`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSpawn {
    pub call: RawCall,
    pub location: RawLocation,
}

/// Channel operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOperation {
    Send,
    Receive,
    Close,
    Make,
}

/// Channel operation found in a function body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChannelOp {
    pub channel_name: String,
    pub operation: ChannelOperation,
    pub location: RawLocation,
}

/// Behaviour facts extracted from a function body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFunctionBody {
    #[serde(default)]
    pub calls: Vec<RawCall>,
    #[serde(default)]
    pub spawns: Vec<RawSpawn>,
    #[serde(default)]
    pub channel_ops: Vec<RawChannelOp>,
}

/// Function or method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFunc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_type: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RawParam>,
    #[serde(default)]
    pub return_types: Vec<String>,
    #[serde(default)]
    pub exported: bool,
    pub location: RawLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RawFunctionBody>,
}

/// Declared struct, class or interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawType {
    pub name: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub fields: Vec<RawField>,
    #[serde(default)]
    pub methods: Vec<RawFunc>,
    #[serde(default)]
    pub exported: bool,
    pub location: RawLocation,
}

impl RawType {
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }
}

/// One package (Go package, TS module directory, Java package, Python package)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPackage {
    #[serde(default)]
    pub id: String,
    /// Short package name, e.g. `hub`
    pub name: String,
    /// Module-relative path, e.g. `pkg/hub`
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub source_files: Vec<String>,
    #[serde(default)]
    pub imports: Vec<RawImport>,
    #[serde(default)]
    pub structs: Vec<RawType>,
    #[serde(default)]
    pub interfaces: Vec<RawType>,
    #[serde(default)]
    pub functions: Vec<RawFunc>,
}

impl RawPackage {
    pub fn new(name: impl Into<String>, full_name: impl Into<String>) -> Self {
        let name = name.into();
        let full_name = full_name.into();
        Self {
            id: full_name.clone(),
            name,
            full_name,
            source_files: Vec::new(),
            imports: Vec::new(),
            structs: Vec::new(),
            interfaces: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Module-relative path used to namespace the package's types
    pub fn path(&self) -> &str {
        if self.full_name.is_empty() {
            &self.name
        } else {
            &self.full_name
        }
    }

    /// Every function and method that has an extracted body.
    ///
    /// Yields `(owner, func)` where owner is `Some(struct)` for methods.
    pub fn bodies(&self) -> impl Iterator<Item = (Option<&RawType>, &RawFunc, &RawFunctionBody)> {
        let functions = self
            .functions
            .iter()
            .filter_map(|f| f.body.as_ref().map(|b| (None, f, b)));
        let methods = self.structs.iter().flat_map(|s| {
            s.methods
                .iter()
                .filter_map(move |m| m.body.as_ref().map(|b| (Some(s), m, b)))
        });
        functions.chain(methods)
    }
}

/// Module requirement (go.mod `require`, package.json dependency, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRequire {
    pub path: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub indirect: bool,
}

/// Raw facts for one whole project: the immutable snapshot every builder reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    #[serde(default)]
    pub language: Language,
    /// Module path, e.g. `github.com/acme/shop`
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub module_root: String,
    #[serde(default)]
    pub requires: Vec<ModuleRequire>,
    #[serde(default)]
    pub packages: Vec<RawPackage>,
}

impl RawProject {
    pub fn new(language: Language, module_name: impl Into<String>) -> Self {
        Self {
            language,
            module_name: module_name.into(),
            ..Self::default()
        }
    }

    pub fn with_package(mut self, package: RawPackage) -> Self {
        self.packages.push(package);
        self
    }

    /// Decode a project, skipping malformed records instead of failing.
    ///
    /// Only a top level that is not a JSON object is an error.
    pub fn from_json_lenient(json: &str) -> Result<DecodeReport> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value_lenient(value)
    }

    pub fn from_value_lenient(value: Value) -> Result<DecodeReport> {
        let Value::Object(mut top) = value else {
            return Err(EngineError::malformed("project root must be a JSON object"));
        };

        let mut skipped = Vec::new();
        let packages = match top.remove("packages") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                skipped.push(SkippedRecord::new("packages", "expected an array"));
                Vec::new()
            }
            None => Vec::new(),
        };

        let mut project: RawProject = match serde_json::from_value(Value::Object(top)) {
            Ok(project) => project,
            Err(e) => {
                skipped.push(SkippedRecord::new("project", e.to_string()));
                RawProject::default()
            }
        };

        for (idx, item) in packages.into_iter().enumerate() {
            let path = format!("packages[{}]", idx);
            if let Some(pkg) = decode_package(item, &path, &mut skipped) {
                project.packages.push(pkg);
            }
        }

        for record in &skipped {
            warn!("raw decode: skipped {} ({})", record.path, record.reason);
        }

        Ok(DecodeReport { project, skipped })
    }
}

/// Raw record that the lenient decoder dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// JSON path of the record, e.g. `packages[2].structs[0]`
    pub path: String,
    pub reason: String,
}

impl SkippedRecord {
    fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result of lenient decoding
#[derive(Debug, Clone)]
pub struct DecodeReport {
    pub project: RawProject,
    pub skipped: Vec<SkippedRecord>,
}

/// Package with its collections still undecoded
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageShell {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    full_name: String,
    #[serde(default)]
    source_files: Vec<String>,
    #[serde(default)]
    imports: Vec<Value>,
    #[serde(default)]
    structs: Vec<Value>,
    #[serde(default)]
    interfaces: Vec<Value>,
    #[serde(default)]
    functions: Vec<Value>,
}

fn decode_package(item: Value, path: &str, skipped: &mut Vec<SkippedRecord>) -> Option<RawPackage> {
    let shell: PackageShell = match serde_json::from_value(item) {
        Ok(shell) => shell,
        Err(e) => {
            skipped.push(SkippedRecord::new(path, e.to_string()));
            return None;
        }
    };

    Some(RawPackage {
        id: shell.id,
        name: shell.name,
        full_name: shell.full_name,
        source_files: shell.source_files,
        imports: decode_items(shell.imports, &format!("{}.imports", path), skipped),
        structs: decode_items(shell.structs, &format!("{}.structs", path), skipped),
        interfaces: decode_items(shell.interfaces, &format!("{}.interfaces", path), skipped),
        functions: decode_items(shell.functions, &format!("{}.functions", path), skipped),
    })
}

fn decode_items<T: DeserializeOwned>(
    items: Vec<Value>,
    path: &str,
    skipped: &mut Vec<SkippedRecord>,
) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                skipped.push(SkippedRecord::new(format!("{}[{}]", path, idx), e.to_string()));
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lenient_decode_skips_bad_type_only() {
        let input = json!({
            "moduleName": "github.com/acme/shop",
            "packages": [{
                "name": "store",
                "fullName": "pkg/store",
                "structs": [
                    {"name": "Repo", "location": {"file": "pkg/store/repo.go", "startLine": 3}},
                    {"location": {"file": "pkg/store/bad.go", "startLine": 1}}
                ]
            }]
        });

        let report = RawProject::from_value_lenient(input).unwrap();
        assert_eq!(report.project.packages.len(), 1);
        assert_eq!(report.project.packages[0].structs.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, "packages[0].structs[1]");
    }

    #[test]
    fn test_lenient_decode_skips_bad_package() {
        let input = json!({
            "packages": [
                {"fullName": "pkg/nameless"},
                {"name": "api", "fullName": "pkg/api"}
            ]
        });

        let report = RawProject::from_value_lenient(input).unwrap();
        assert_eq!(report.project.packages.len(), 1);
        assert_eq!(report.project.packages[0].name, "api");
        assert_eq!(report.skipped[0].path, "packages[0]");
    }

    #[test]
    fn test_lenient_decode_rejects_non_object_root() {
        assert!(RawProject::from_json_lenient("[1, 2]").is_err());
    }

    #[test]
    fn test_empty_project_decodes() {
        let report = RawProject::from_json_lenient("{}").unwrap();
        assert!(report.project.packages.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_qualified_call_name() {
        let mut call = RawCall {
            function_name: "Sprintf".to_string(),
            package_name: Some("fmt".to_string()),
            receiver_type: None,
            args: vec![],
            location: RawLocation::new("main.go", 1, 1),
        };
        assert_eq!(call.qualified_name(), "fmt.Sprintf");
        call.package_name = None;
        assert_eq!(call.qualified_name(), "Sprintf");
    }

    #[test]
    fn test_package_path_falls_back_to_name() {
        let pkg = RawPackage::new("main", "");
        assert_eq!(pkg.path(), "main");
    }
}
