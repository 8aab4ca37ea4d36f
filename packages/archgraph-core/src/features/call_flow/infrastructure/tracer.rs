//! One-hop call chain tracing
//!
//! A handler symbol is matched by its trailing identifier (`h.ListUsers`
//! finds `ListUsers`), so receiver-qualified names resolve. Only the direct
//! calls of the matched bodies are collected; callees are never followed.

use rustc_hash::{FxHashMap, FxHashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::noise::NoiseFilter;
use crate::features::call_flow::domain::{CallChain, CallEdge, CallEdgeType, EntryPoint};
use crate::shared::models::{RawFunctionBody, RawProject};

/// Function and method bodies indexed by bare name, in input order
#[derive(Debug, Default)]
pub struct BodyIndex<'a> {
    by_name: FxHashMap<&'a str, Vec<&'a RawFunctionBody>>,
}

impl<'a> BodyIndex<'a> {
    /// Per package: every function with a body, then the first method of each
    /// struct carrying that name.
    pub fn build(project: &'a RawProject) -> Self {
        let mut by_name: FxHashMap<&'a str, Vec<&'a RawFunctionBody>> = FxHashMap::default();
        for pkg in &project.packages {
            for func in &pkg.functions {
                if let Some(body) = &func.body {
                    by_name.entry(func.name.as_str()).or_default().push(body);
                }
            }
            for st in &pkg.structs {
                let mut seen: FxHashSet<&str> = FxHashSet::default();
                for method in &st.methods {
                    if !seen.insert(method.name.as_str()) {
                        continue;
                    }
                    if let Some(body) = &method.body {
                        by_name.entry(method.name.as_str()).or_default().push(body);
                    }
                }
            }
        }
        Self { by_name }
    }

    pub fn bodies(&self, name: &str) -> &[&'a RawFunctionBody] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone)]
pub struct CallChainTracer {
    noise: NoiseFilter,
    confidence: f64,
}

impl CallChainTracer {
    pub fn new(noise: NoiseFilter, confidence: f64) -> Self {
        Self { noise, confidence }
    }

    pub fn trace_all(&self, project: &RawProject, entries: &[EntryPoint]) -> Vec<CallChain> {
        let index = BodyIndex::build(project);

        #[cfg(feature = "parallel")]
        let chains = entries.par_iter().map(|e| self.chain(&index, e)).collect();
        #[cfg(not(feature = "parallel"))]
        let chains = entries.iter().map(|e| self.chain(&index, e)).collect();

        chains
    }

    pub fn chain(&self, index: &BodyIndex<'_>, entry: &EntryPoint) -> CallChain {
        CallChain {
            id: format!("chain-{}", entry.id),
            entry_point: entry.id.clone(),
            calls: self.trace(index, entry),
        }
    }

    /// Direct calls of the handler, deduplicated by (from, to), noise removed
    pub fn trace(&self, index: &BodyIndex<'_>, entry: &EntryPoint) -> Vec<CallEdge> {
        if entry.is_anonymous() {
            return Vec::new();
        }
        let name = entry
            .handler
            .rsplit('.')
            .next()
            .unwrap_or(entry.handler.as_str());

        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut edges = Vec::new();
        for body in index.bodies(name) {
            for call in &body.calls {
                let to = call.qualified_name();
                if !seen.insert(to.clone()) {
                    continue;
                }
                if self.noise.is_noise(&to) {
                    continue;
                }
                edges.push(CallEdge {
                    from: entry.handler.clone(),
                    to,
                    edge_type: CallEdgeType::Direct,
                    confidence: self.confidence,
                });
            }
        }
        edges
    }
}

impl Default for CallChainTracer {
    fn default() -> Self {
        Self::new(
            NoiseFilter::default(),
            crate::shared::constants::confidence::DIRECT_CALL,
        )
    }
}
