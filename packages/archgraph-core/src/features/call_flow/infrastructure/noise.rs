//! Call-chain noise filter
//!
//! Drops utility calls (builtins, stdlib, request/response plumbing) so a
//! traced chain shows the business-logic shape of a handler.

use lazy_static::lazy_static;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::config::{ConfigResult, NoiseConfig};

lazy_static! {
    static ref DEFAULT_FILTER: NoiseFilter = NoiseFilter::from_config(&NoiseConfig::default())
        .expect("default accessor patterns are valid regexes");
}

#[derive(Debug, Clone)]
pub struct NoiseFilter {
    builtins: FxHashSet<String>,
    stdlib_prefixes: FxHashSet<String>,
    infrastructure_prefixes: Vec<String>,
    accessors: Vec<Regex>,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        DEFAULT_FILTER.clone()
    }
}

impl NoiseFilter {
    pub fn from_config(config: &NoiseConfig) -> ConfigResult<Self> {
        Ok(Self {
            builtins: config.builtins.iter().cloned().collect(),
            stdlib_prefixes: config.stdlib_prefixes.iter().cloned().collect(),
            infrastructure_prefixes: config.infrastructure_prefixes.clone(),
            accessors: config.compile_patterns()?,
        })
    }

    /// True when a call target is noise
    pub fn is_noise(&self, target: &str) -> bool {
        if self.builtins.contains(target) {
            return true;
        }
        if let Some((qualifier, _)) = target.split_once('.') {
            if !qualifier.is_empty() && self.stdlib_prefixes.contains(qualifier) {
                return true;
            }
        }
        if self
            .infrastructure_prefixes
            .iter()
            .any(|p| target.starts_with(p.as_str()))
        {
            return true;
        }
        self.accessors.iter().any(|re| re.is_match(target))
    }
}
