//! FlowGraphBuilder use case

use tracing::info;

use crate::config::{ConfigResult, FlowConfig};
use crate::features::call_flow::domain::{DetectedFrameworks, FlowGraph};
use crate::features::call_flow::infrastructure::{
    CallChainTracer, EntryPointDetector, FrameworkDetector, NoiseFilter,
};
use crate::shared::models::RawProject;

/// Builds the entry point / call chain layer
#[derive(Debug, Clone)]
pub struct FlowGraphBuilder {
    config: FlowConfig,
    tracer: CallChainTracer,
}

impl Default for FlowGraphBuilder {
    fn default() -> Self {
        Self {
            config: FlowConfig::default(),
            tracer: CallChainTracer::default(),
        }
    }
}

impl FlowGraphBuilder {
    /// Fails only when a noise accessor pattern does not compile
    pub fn new(config: FlowConfig) -> ConfigResult<Self> {
        let noise = NoiseFilter::from_config(&config.noise)?;
        let tracer = CallChainTracer::new(noise, config.call_edge_confidence);
        Ok(Self { config, tracer })
    }

    /// Detected frameworks plus the force-enabled ones
    pub fn frameworks(&self, project: &RawProject) -> DetectedFrameworks {
        let mut detected = FrameworkDetector::new().detect(project);
        for key in &self.config.frameworks {
            detected.insert(key.clone());
        }
        detected
    }

    pub fn build(&self, project: &RawProject, detected: &DetectedFrameworks) -> FlowGraph {
        let detector = EntryPointDetector::new(
            detected,
            &self.config.custom_frameworks,
            &self.config.entry_points,
        );
        let mut entry_points = detector.detect(project);

        if let Some(allowed) = self.config.protocols.as_ref().filter(|p| !p.is_empty()) {
            entry_points.retain(|e| allowed.contains(&e.protocol));
        }

        // chains are traced only for surviving entries, so the filter covers both
        let call_chains = self.tracer.trace_all(project, &entry_points);

        info!(
            "flow graph: {} entry points, {} chains, {} edges",
            entry_points.len(),
            call_chains.len(),
            call_chains.iter().map(|c| c.calls.len()).sum::<usize>()
        );

        FlowGraph {
            entry_points,
            call_chains,
        }
    }

    /// Detect frameworks, then build
    pub fn detect_and_build(&self, project: &RawProject) -> (DetectedFrameworks, FlowGraph) {
        let detected = self.frameworks(project);
        let graph = self.build(project, &detected);
        (detected, graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, NoiseConfig};
    use crate::shared::models::{RawCall, RawFunc, RawFunctionBody, RawLocation, RawPackage};
    use pretty_assertions::assert_eq;

    fn call(pkg: Option<&str>, name: &str, args: &[&str], line: u32) -> RawCall {
        RawCall {
            function_name: name.to_string(),
            package_name: pkg.map(str::to_string),
            receiver_type: None,
            args: args.iter().map(|a| a.to_string()).collect(),
            location: RawLocation::new("cmd/server/main.go", line, line),
        }
    }

    fn func(name: &str, calls: Vec<RawCall>) -> RawFunc {
        RawFunc {
            name: name.to_string(),
            receiver_type: None,
            parameters: vec![],
            return_types: vec![],
            exported: false,
            location: RawLocation::new("cmd/server/main.go", 1, 50),
            body: Some(RawFunctionBody {
                calls,
                ..RawFunctionBody::default()
            }),
        }
    }

    fn server() -> RawProject {
        let mut pkg = RawPackage::new("main", "cmd/server");
        pkg.functions.push(func(
            "main",
            vec![call(Some("http"), "HandleFunc", &["\"/users\"", "listUsers"], 10)],
        ));
        pkg.functions.push(func(
            "listUsers",
            vec![
                call(Some("json"), "Marshal", &[], 20),
                call(Some("users"), "All", &[], 21),
            ],
        ));
        RawProject::default().with_package(pkg)
    }

    #[test]
    fn test_end_to_end() {
        let (detected, graph) = FlowGraphBuilder::default().detect_and_build(&server());

        assert!(detected.contains("main"));
        // route + main()
        assert_eq!(graph.entry_points.len(), 2);
        let chain = graph.chain_for("entry-cmd/server-10").unwrap();
        assert_eq!(chain.calls.len(), 1);
        assert_eq!(chain.calls[0].to, "users.All");
    }

    #[test]
    fn test_protocol_filter_covers_chains() {
        let builder = FlowGraphBuilder::new(FlowConfig::default().protocols(["cli"])).unwrap();
        let (_, graph) = builder.detect_and_build(&server());

        assert_eq!(graph.entry_points.len(), 1);
        assert_eq!(graph.entry_points[0].protocol, "cli");
        assert_eq!(graph.call_chains.len(), 1);
        assert_eq!(graph.call_chains[0].entry_point, graph.entry_points[0].id);
    }

    #[test]
    fn test_empty_protocol_list_keeps_all() {
        let builder =
            FlowGraphBuilder::new(FlowConfig::default().protocols(Vec::<String>::new())).unwrap();
        let (_, graph) = builder.detect_and_build(&server());
        assert_eq!(graph.entry_points.len(), 2);
    }

    #[test]
    fn test_forced_framework() {
        let builder = FlowGraphBuilder::new(FlowConfig::default().framework("chi")).unwrap();
        assert!(builder.frameworks(&RawProject::default()).contains("chi"));
    }

    #[test]
    fn test_invalid_noise_pattern() {
        let config = FlowConfig::default().noise(NoiseConfig {
            accessor_patterns: vec!["(".to_string()],
            ..NoiseConfig::default()
        });
        assert!(matches!(
            FlowGraphBuilder::new(config),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_empty_project() {
        let graph = FlowGraphBuilder::default().build(&RawProject::default(), &DetectedFrameworks::new());
        assert_eq!(graph, FlowGraph::default());
    }
}
