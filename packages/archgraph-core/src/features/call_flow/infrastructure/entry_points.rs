//! Entry point detection
//!
//! Pure call-shape matching: every call in every function and method body is
//! tested against the active registration patterns; the first matching
//! pattern wins.

use rustc_hash::FxHashMap;
use tracing::debug;

use super::frameworks::{active_patterns, ActivePattern};
use crate::config::{CustomFrameworkConfig, ManualEntryPoint};
use crate::features::call_flow::domain::{DetectedFrameworks, EntryPoint};
use crate::shared::models::{CodeLocation, RawCall, RawPackage, RawProject};

/// Argument prefixes of an inline function literal
const INLINE_FUNCTION_MARKERS: &[&str] = &["func(", "func ", "function"];

#[derive(Debug, Clone)]
pub struct EntryPointDetector {
    patterns: Vec<ActivePattern>,
    inject_main: bool,
    manual: Vec<ManualEntryPoint>,
}

impl EntryPointDetector {
    pub fn new(
        detected: &DetectedFrameworks,
        custom: &[CustomFrameworkConfig],
        manual: &[ManualEntryPoint],
    ) -> Self {
        Self {
            patterns: active_patterns(detected, custom),
            inject_main: detected.contains("main"),
            manual: manual.to_vec(),
        }
    }

    pub fn detect(&self, project: &RawProject) -> Vec<EntryPoint> {
        let mut entries: Vec<EntryPoint> = Vec::new();
        let mut ids = IdAllocator::default();

        for pkg in &project.packages {
            for (_, _, body) in pkg.bodies() {
                for call in &body.calls {
                    if let Some(entry) = self.match_call(call, pkg, &mut ids) {
                        entries.push(entry);
                    }
                }
            }

            if self.inject_main && pkg.name == "main" {
                for func in pkg.functions.iter().filter(|f| f.name == "main") {
                    entries.push(EntryPoint {
                        id: ids.allocate(format!("entry-{}-main", pkg.full_name)),
                        entry_type: EntryPoint::type_tag("cli", None),
                        protocol: "cli".to_string(),
                        method: None,
                        framework: "main".to_string(),
                        path: String::new(),
                        handler: "main.main".to_string(),
                        middleware: Vec::new(),
                        package: Some(pkg.full_name.clone()),
                        location: CodeLocation::from(&func.location),
                    });
                }
            }
        }

        for manual in &self.manual {
            let slug: String = manual
                .function
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect();
            entries.push(EntryPoint {
                id: ids.allocate(format!("entry-manual-{}", slug)),
                entry_type: EntryPoint::type_tag(&manual.protocol, None),
                protocol: manual.protocol.clone(),
                method: None,
                framework: "manual".to_string(),
                path: String::new(),
                handler: manual.function.clone(),
                middleware: Vec::new(),
                package: None,
                location: CodeLocation::new("manual", 0),
            });
        }

        debug!("entry points: {} detected", entries.len());
        entries
    }

    fn match_call(&self, call: &RawCall, pkg: &RawPackage, ids: &mut IdAllocator) -> Option<EntryPoint> {
        let active = self.patterns.iter().find(|a| a.pattern.matches(call))?;
        let pattern = &active.pattern;

        let path = call
            .args
            .get(pattern.path_arg)
            .map(|arg| trim_quotes(arg).to_string())
            .unwrap_or_default();
        let handler = call
            .args
            .get(pattern.handler_arg)
            .map(|arg| arg.trim())
            .filter(|arg| !is_inline_function(arg))
            .unwrap_or_default()
            .to_string();

        Some(EntryPoint {
            id: ids.allocate(format!("entry-{}-{}", pkg.full_name, call.location.start_line)),
            entry_type: EntryPoint::type_tag(&pattern.protocol, pattern.http_method),
            protocol: pattern.protocol.clone(),
            method: pattern.http_method,
            framework: active.framework.clone(),
            path,
            handler,
            middleware: Vec::new(),
            package: Some(pkg.full_name.clone()),
            location: CodeLocation::from(&call.location),
        })
    }
}

fn trim_quotes(arg: &str) -> &str {
    arg.trim().trim_matches(|c| c == '"' || c == '`' || c == '\'')
}

fn is_inline_function(arg: &str) -> bool {
    INLINE_FUNCTION_MARKERS.iter().any(|m| arg.starts_with(m))
        || arg.contains("=>")
        || arg.starts_with("lambda")
}

/// Hands out unique entry ids; repeats get `-2`, `-3`, ...
#[derive(Debug, Default)]
struct IdAllocator {
    seen: FxHashMap<String, usize>,
}

impl IdAllocator {
    fn allocate(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}-{}", base, count)
        }
    }
}
