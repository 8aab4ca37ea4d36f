//! Package dependency graph builder
//!
//! One node per raw package, one edge per (importer, imported) pair of
//! project packages, cycles found by explicit-stack DFS over the edges in
//! first-occurrence order.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use super::types::{
    CycleSeverity, PackageCycle, PackageDependency, PackageGraph, PackageKind, PackageNode,
    PackageStats,
};
use crate::config::CycleConfig;
use crate::shared::models::{RawImport, RawPackage, RawProject};
use crate::shared::ports::{LanguagePlugin, PluginRegistry};
use crate::shared::utils::StableGraph;

/// Path segments that mark shared test helpers
const TESTUTIL_SEGMENTS: &[&str] = &["testutil", "testutils", "testhelper", "testhelpers", "testing"];

/// Builds a [`PackageGraph`] from raw packages
#[derive(Debug, Clone, Default)]
pub struct DependencyGraphBuilder {
    cycles: CycleConfig,
}

impl DependencyGraphBuilder {
    pub fn new(cycles: CycleConfig) -> Self {
        Self { cycles }
    }

    /// Node id of a package within its module
    pub fn package_id(module_name: &str, pkg: &RawPackage) -> String {
        match (module_name.is_empty(), pkg.full_name.is_empty()) {
            (_, true) => pkg.name.clone(),
            (true, false) => pkg.full_name.clone(),
            (false, false) => format!("{}/{}", module_name, pkg.full_name),
        }
    }

    /// Classification precedence: tests > examples > testutil > cmd > vendor > internal
    pub fn classify(pkg: &RawPackage) -> PackageKind {
        let path = pkg.path();
        if path.starts_with("tests/") || path == "tests" {
            PackageKind::Tests
        } else if path.starts_with("examples/") || path == "examples" {
            PackageKind::Examples
        } else if path.split('/').any(|seg| TESTUTIL_SEGMENTS.contains(&seg)) {
            PackageKind::Testutil
        } else if pkg.name == "main" {
            PackageKind::Cmd
        } else if path.split('/').any(|seg| seg == "vendor") {
            PackageKind::Vendor
        } else {
            PackageKind::Internal
        }
    }

    pub fn severity(&self, cycle_len: usize) -> CycleSeverity {
        if cycle_len <= self.cycles.warning_max_length {
            CycleSeverity::Warning
        } else {
            CycleSeverity::Error
        }
    }

    pub fn build(&self, project: &RawProject) -> PackageGraph {
        let plugin = PluginRegistry::builtin().for_language(project.language);

        let mut nodes: Vec<PackageNode> = Vec::with_capacity(project.packages.len());
        // (node id, package) for every package that produced a node
        let mut owners: Vec<(String, &RawPackage)> = Vec::with_capacity(project.packages.len());
        let mut seen_ids: FxHashSet<String> = FxHashSet::default();

        for pkg in &project.packages {
            let id = Self::package_id(&project.module_name, pkg);
            if !seen_ids.insert(id.clone()) {
                warn!("package graph: duplicate package id {}, keeping the first", id);
                continue;
            }
            nodes.push(PackageNode {
                id: id.clone(),
                name: pkg.path().to_string(),
                kind: Self::classify(pkg),
                file_count: pkg.source_files.len(),
                stats: PackageStats {
                    structs: pkg.structs.len(),
                    interfaces: pkg.interfaces.len(),
                    functions: pkg.functions.len(),
                },
            });
            owners.push((id, pkg));
        }
        // Import-path spellings that resolve to a node: node id, then module-relative path
        let mut known: FxHashMap<&str, usize> = FxHashMap::default();
        for (idx, (id, _)) in owners.iter().enumerate() {
            known.insert(id.as_str(), idx);
        }
        for (idx, (_, pkg)) in owners.iter().enumerate() {
            known.entry(pkg.path()).or_insert(idx);
        }

        let edges = self.build_edges(plugin, &owners, &known);
        let cycles = self.detect_cycles(&nodes, &edges);

        info!(
            "package graph: {} nodes, {} edges, {} cycles",
            nodes.len(),
            edges.len(),
            cycles.len()
        );

        PackageGraph {
            nodes,
            edges,
            cycles,
        }
    }

    fn build_edges(
        &self,
        plugin: &dyn LanguagePlugin,
        owners: &[(String, &RawPackage)],
        known: &FxHashMap<&str, usize>,
    ) -> Vec<PackageDependency> {
        let mut edges: Vec<PackageDependency> = Vec::new();
        let mut edge_index: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        let mut statements: FxHashSet<(usize, usize, StatementKey<'_>)> = FxHashSet::default();

        for (from, (_, pkg)) in owners.iter().enumerate() {
            for import in &pkg.imports {
                // stdlib wins over a project package spelled the same way
                if plugin.is_standard_library(&import.path) {
                    continue;
                }
                let Some(&to) = known.get(import.path.as_str()) else {
                    debug!("package graph: external import {}", import.path);
                    continue;
                };
                if from == to {
                    continue;
                }
                if !statements.insert((from, to, StatementKey::of(import))) {
                    continue;
                }
                match edge_index.get(&(from, to)) {
                    Some(&idx) => edges[idx].strength += 1,
                    None => {
                        edge_index.insert((from, to), edges.len());
                        edges.push(PackageDependency {
                            from: owners[from].0.clone(),
                            to: owners[to].0.clone(),
                            strength: 1,
                        });
                    }
                }
            }
        }

        edges
    }

    fn detect_cycles(&self, nodes: &[PackageNode], edges: &[PackageDependency]) -> Vec<PackageCycle> {
        let mut graph = StableGraph::from_nodes(nodes.iter().map(|n| n.id.as_str()));
        for edge in edges {
            graph.add_edge(&edge.from, &edge.to);
        }

        graph
            .cycles()
            .into_iter()
            .map(|packages| PackageCycle {
                severity: self.severity(packages.len()),
                packages,
            })
            .collect()
    }
}

/// Identity of one import statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StatementKey<'a> {
    path: &'a str,
    alias: Option<&'a str>,
    file: Option<&'a str>,
    line: Option<u32>,
}

impl<'a> StatementKey<'a> {
    fn of(import: &'a RawImport) -> Self {
        Self {
            path: &import.path,
            alias: import.alias.as_deref(),
            file: import.location.as_ref().map(|l| l.file.as_str()),
            line: import.location.as_ref().map(|l| l.start_line),
        }
    }
}
