//! Engine configuration
//!
//! One YAML document with a section per concern:
//!
//! ```yaml
//! cycles:
//!   warning_max_length: 2
//! flow:
//!   call_edge_confidence: 0.7
//!   protocols: [http]
//!   custom_frameworks:
//!     - name: internal-rpc
//!       protocol: rpc
//!       patterns:
//!         - method: Register
//! oracle:
//!   query_timeout_ms: 30000
//! aggregation:
//!   package_depth: 1
//! ```
//!
//! Every field is optional; missing fields take the defaults from
//! [`crate::shared::constants`].

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::validation::{Validatable, ValidatableCollection};
use crate::shared::constants;

// ============================================================================
// Cycles
// ============================================================================

/// Package cycle severity policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Cycles of at most this length are `warning`, longer are `error`
    pub warning_max_length: usize,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            warning_max_length: constants::cycles::WARNING_MAX_LENGTH,
        }
    }
}

impl CycleConfig {
    /// Builder: Set warning_max_length
    pub fn warning_max_length(mut self, v: usize) -> Self {
        self.warning_max_length = v;
        self
    }
}

impl Validatable for CycleConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.warning_max_length > 10_000 {
            return Err(ConfigError::range_with_hint(
                "cycles.warning_max_length",
                self.warning_max_length,
                0,
                10_000,
                "Use 0 to report every cycle as an error",
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "cycles"
    }
}

// ============================================================================
// Flow
// ============================================================================

/// Call-expression shape that registers an entry point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomCallPattern {
    /// Exact callee name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Callee name suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method_suffix: Option<String>,
    /// Substring of the receiver type, when the receiver is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_arg_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_arg_index: Option<usize>,
}

impl CustomCallPattern {
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            method: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn method_suffix(suffix: impl Into<String>) -> Self {
        Self {
            method_suffix: Some(suffix.into()),
            ..Self::default()
        }
    }
}

/// User-declared framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFrameworkConfig {
    pub name: String,
    pub protocol: String,
    pub patterns: Vec<CustomCallPattern>,
}

impl Validatable for CustomFrameworkConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "custom framework name must not be empty".to_string(),
            ));
        }
        for pattern in &self.patterns {
            if pattern.method.is_none() && pattern.method_suffix.is_none() {
                return Err(ConfigError::Validation(format!(
                    "custom framework '{}': every pattern needs `method` or `method_suffix`",
                    self.name
                )));
            }
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "flow.custom_frameworks"
    }
}

/// Entry point declared by hand, e.g. `pkg/worker.(*Runner).Run`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEntryPoint {
    pub function: String,
    pub protocol: String,
}

/// Call-chain noise policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Builtin functions and primitive conversions
    pub builtins: Vec<String>,
    /// Package qualifiers whose calls are dropped (`fmt` drops `fmt.Sprintf`)
    pub stdlib_prefixes: Vec<String>,
    /// Callee prefixes of conventional infrastructure objects
    pub infrastructure_prefixes: Vec<String>,
    /// Regexes for framework accessor calls
    pub accessor_patterns: Vec<String>,
}

const DEFAULT_BUILTINS: &[&str] = &[
    "make", "len", "append", "cap", "new", "delete", "copy", "close", "panic", "recover", "print",
    "println", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32",
    "uint64", "string", "bool", "float32", "float64", "byte", "rune", "error",
];

const DEFAULT_STDLIB_PREFIXES: &[&str] = &[
    "fmt", "json", "strconv", "time", "errors", "strings", "sort", "sync", "io", "bytes", "math",
    "os", "log", "context", "net", "http", "reflect", "unicode", "filepath", "path", "regexp",
    "bufio", "runtime",
];

const DEFAULT_INFRASTRUCTURE_PREFIXES: &[&str] = &["w.", "ctx.", "err."];

const DEFAULT_ACCESSOR_PATTERNS: &[&str] = &[r"^r\.(URL|Context|Body|Header|PathValue|Method|Form)"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            builtins: owned(DEFAULT_BUILTINS),
            stdlib_prefixes: owned(DEFAULT_STDLIB_PREFIXES),
            infrastructure_prefixes: owned(DEFAULT_INFRASTRUCTURE_PREFIXES),
            accessor_patterns: owned(DEFAULT_ACCESSOR_PATTERNS),
        }
    }
}

impl NoiseConfig {
    /// No filtering at all
    pub fn disabled() -> Self {
        Self {
            builtins: Vec::new(),
            stdlib_prefixes: Vec::new(),
            infrastructure_prefixes: Vec::new(),
            accessor_patterns: Vec::new(),
        }
    }

    /// Compile `accessor_patterns`
    pub fn compile_patterns(&self) -> ConfigResult<Vec<Regex>> {
        self.accessor_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    field: "flow.noise.accessor_patterns".to_string(),
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}

impl Validatable for NoiseConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.compile_patterns().map(|_| ())
    }

    fn config_name(&self) -> &'static str {
        "flow.noise"
    }
}

/// Entry-point detection and call tracing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Confidence of every traced direct-call edge
    pub call_edge_confidence: f64,
    /// Keep only entry points with these protocols (`None` = all)
    pub protocols: Option<Vec<String>>,
    /// Framework keys enabled in addition to the detected ones
    pub frameworks: Vec<String>,
    pub custom_frameworks: Vec<CustomFrameworkConfig>,
    pub entry_points: Vec<ManualEntryPoint>,
    pub noise: NoiseConfig,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            call_edge_confidence: constants::confidence::DIRECT_CALL,
            protocols: None,
            frameworks: Vec::new(),
            custom_frameworks: Vec::new(),
            entry_points: Vec::new(),
            noise: NoiseConfig::default(),
        }
    }
}

impl FlowConfig {
    /// Builder: Set call_edge_confidence
    pub fn call_edge_confidence(mut self, v: f64) -> Self {
        self.call_edge_confidence = v;
        self
    }

    /// Builder: Restrict entry points to these protocols
    pub fn protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols = Some(protocols.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: Force-enable a framework key
    pub fn framework(mut self, key: impl Into<String>) -> Self {
        self.frameworks.push(key.into());
        self
    }

    /// Builder: Add a custom framework
    pub fn custom_framework(mut self, framework: CustomFrameworkConfig) -> Self {
        self.custom_frameworks.push(framework);
        self
    }

    /// Builder: Add a manual entry point
    pub fn entry_point(mut self, function: impl Into<String>, protocol: impl Into<String>) -> Self {
        self.entry_points.push(ManualEntryPoint {
            function: function.into(),
            protocol: protocol.into(),
        });
        self
    }

    /// Builder: Replace the noise policy
    pub fn noise(mut self, noise: NoiseConfig) -> Self {
        self.noise = noise;
        self
    }
}

impl Validatable for FlowConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigError::check_unit_interval("flow.call_edge_confidence", self.call_edge_confidence)?;
        self.custom_frameworks.validate_all()?;
        for entry in &self.entry_points {
            if entry.function.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "manual entry point needs a function name".to_string(),
                ));
            }
        }
        self.noise.validate()
    }

    fn config_name(&self) -> &'static str {
        "flow"
    }
}

// ============================================================================
// Oracle
// ============================================================================

/// Semantic oracle timeouts and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub init_timeout_ms: u64,
    /// Per-query timeout
    pub query_timeout_ms: u64,
    /// Overall deadline for all queries of one run (`None` = no deadline)
    pub deadline_ms: Option<u64>,
    pub confidence: f64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: constants::oracle::INIT_TIMEOUT_MS,
            query_timeout_ms: constants::oracle::QUERY_TIMEOUT_MS,
            deadline_ms: None,
            confidence: constants::confidence::ORACLE_MATCH,
        }
    }
}

impl OracleConfig {
    /// Builder: Set init_timeout_ms
    pub fn init_timeout_ms(mut self, v: u64) -> Self {
        self.init_timeout_ms = v;
        self
    }

    /// Builder: Set query_timeout_ms
    pub fn query_timeout_ms(mut self, v: u64) -> Self {
        self.query_timeout_ms = v;
        self
    }

    /// Builder: Set deadline_ms
    pub fn deadline_ms(mut self, v: Option<u64>) -> Self {
        self.deadline_ms = v;
        self
    }
}

impl Validatable for OracleConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("oracle.init_timeout_ms", self.init_timeout_ms),
            ("oracle.query_timeout_ms", self.query_timeout_ms),
        ] {
            if value == 0 || value > 600_000 {
                return Err(ConfigError::range_with_hint(
                    field,
                    value,
                    1,
                    600_000,
                    "Oracle timeouts are in milliseconds, at most 10 minutes",
                ));
            }
        }
        if self.deadline_ms == Some(0) {
            return Err(ConfigError::Validation(
                "oracle.deadline_ms must be positive; use null for no deadline".to_string(),
            ));
        }
        ConfigError::check_unit_interval("oracle.confidence", self.confidence)
    }

    fn config_name(&self) -> &'static str {
        "oracle"
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// Package-level folding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Directory segments kept when a package key falls back to the file
    /// directory (`None` = the whole directory)
    pub package_depth: Option<usize>,
    /// Source-root directory names stripped in that fallback
    pub source_roots: Vec<String>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            package_depth: Some(constants::aggregation::PACKAGE_DEPTH),
            source_roots: vec![constants::aggregation::SOURCE_ROOT.to_string()],
        }
    }
}

impl AggregationConfig {
    /// Builder: Set package_depth
    pub fn package_depth(mut self, v: Option<usize>) -> Self {
        self.package_depth = v;
        self
    }

    /// Builder: Set source_roots
    pub fn source_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_roots = roots.into_iter().map(Into::into).collect();
        self
    }
}

impl Validatable for AggregationConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(depth) = self.package_depth {
            if depth == 0 || depth > 64 {
                return Err(ConfigError::range_with_hint(
                    "aggregation.package_depth",
                    depth,
                    1,
                    64,
                    "Use null to keep the whole directory",
                ));
            }
        }
        if self.source_roots.iter().any(|r| r.is_empty() || r.contains('/')) {
            return Err(ConfigError::Validation(
                "aggregation.source_roots entries must be single directory names".to_string(),
            ));
        }
        Ok(())
    }

    fn config_name(&self) -> &'static str {
        "aggregation"
    }
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub cycles: CycleConfig,
    pub flow: FlowConfig,
    pub oracle: OracleConfig,
    pub aggregation: AggregationConfig,
}

impl EngineConfig {
    /// Override the cycle section
    pub fn cycles(mut self, f: impl FnOnce(CycleConfig) -> CycleConfig) -> Self {
        self.cycles = f(self.cycles);
        self
    }

    /// Override the flow section
    pub fn flow(mut self, f: impl FnOnce(FlowConfig) -> FlowConfig) -> Self {
        self.flow = f(self.flow);
        self
    }

    /// Override the oracle section
    pub fn oracle(mut self, f: impl FnOnce(OracleConfig) -> OracleConfig) -> Self {
        self.oracle = f(self.oracle);
        self
    }

    /// Override the aggregation section
    pub fn aggregation(mut self, f: impl FnOnce(AggregationConfig) -> AggregationConfig) -> Self {
        self.aggregation = f(self.aggregation);
        self
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load, parse and validate a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Validatable for EngineConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.cycles.validate()?;
        self.flow.validate()?;
        self.oracle.validate()?;
        self.aggregation.validate()
    }

    fn config_name(&self) -> &'static str {
        "engine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.cycles.warning_max_length, 2);
        assert_eq!(config.flow.call_edge_confidence, 0.7);
        assert_eq!(config.oracle.confidence, 0.99);
        assert_eq!(config.aggregation.package_depth, Some(1));
        assert!(config.flow.noise.builtins.contains(&"append".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_closure_overrides() {
        let config = EngineConfig::default()
            .cycles(|c| c.warning_max_length(3))
            .flow(|f| f.call_edge_confidence(0.5).protocols(["http"]))
            .aggregation(|a| a.package_depth(None));

        assert_eq!(config.cycles.warning_max_length, 3);
        assert_eq!(config.flow.call_edge_confidence, 0.5);
        assert_eq!(config.flow.protocols, Some(vec!["http".to_string()]));
        assert_eq!(config.aggregation.package_depth, None);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml_str(
            r#"
cycles:
  warning_max_length: 3
aggregation:
  package_depth: null
"#,
        )
        .unwrap();

        assert_eq!(config.cycles.warning_max_length, 3);
        assert_eq!(config.aggregation.package_depth, None);
        assert_eq!(config.flow, FlowConfig::default());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig::default()
            .flow(|f| f.entry_point("pkg/worker.Run", "cli").framework("gin"));
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("warning_max_length: 2"));
        assert_eq!(EngineConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_yaml_file_loading() {
        let yaml = r#"
flow:
  call_edge_confidence: 0.6
  custom_frameworks:
    - name: internal-rpc
      protocol: rpc
      patterns:
        - method: Register
          handler_arg_index: 2
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = EngineConfig::from_yaml_file(temp_file.path()).unwrap();
        assert_eq!(config.flow.call_edge_confidence, 0.6);
        let custom = &config.flow.custom_frameworks[0];
        assert_eq!(custom.name, "internal-rpc");
        assert_eq!(custom.patterns[0].handler_arg_index, Some(2));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::from_yaml_file("/nonexistent/archgraph.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_unknown_top_level_field_rejected() {
        let err = EngineConfig::from_yaml_str("cycle:\n  warning_max_length: 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_confidence_out_of_range() {
        let config = EngineConfig::default().flow(|f| f.call_edge_confidence(1.5));
        assert!(matches!(config.validate(), Err(ConfigError::Range { .. })));
    }

    #[test]
    fn test_invalid_accessor_pattern() {
        let yaml = r#"
flow:
  noise:
    accessor_patterns: ["^r\\.(URL"]
"#;
        let err = EngineConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_custom_pattern_needs_method() {
        let config = EngineConfig::default().flow(|f| {
            f.custom_framework(CustomFrameworkConfig {
                name: "x".to_string(),
                protocol: "http".to_string(),
                patterns: vec![CustomCallPattern::default()],
            })
        });
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_package_depth_rejected() {
        let config = EngineConfig::default().aggregation(|a| a.package_depth(Some(0)));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_oracle_timeout_range() {
        let config = EngineConfig::default().oracle(|o| o.query_timeout_ms(0));
        assert!(config.validate().is_err());
        let config = EngineConfig::default().oracle(|o| o.deadline_ms(Some(0)));
        assert!(config.validate().is_err());
    }
}
