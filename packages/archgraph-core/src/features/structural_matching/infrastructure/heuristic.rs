//! Method-name subset matcher
//!
//! A concrete type C implements interface I iff I has at least one method
//! and every method name of I is a method name of C. Signatures are not
//! compared.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::features::structural_matching::domain::TypeRef;
use crate::shared::constants;

/// Heuristic structural matcher
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicMatcher;

impl HeuristicMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Does `concrete` structurally implement `interface`?
    pub fn implements(&self, concrete: &TypeRef<'_>, interface: &TypeRef<'_>) -> bool {
        let methods: FxHashSet<&str> = concrete.ty.method_names().collect();
        Self::covers(&methods, interface)
    }

    fn covers(methods: &FxHashSet<&str>, interface: &TypeRef<'_>) -> bool {
        !interface.ty.methods.is_empty()
            && interface.ty.method_names().all(|name| methods.contains(name))
    }

    /// All matching (concrete index, interface index) pairs.
    ///
    /// Pairs are ordered by concrete index, then interface index, regardless
    /// of whether the work ran in parallel.
    pub fn match_indices(
        &self,
        concretes: &[TypeRef<'_>],
        interfaces: &[TypeRef<'_>],
    ) -> Vec<(usize, usize)> {
        let match_one = |(ci, concrete): (usize, &TypeRef<'_>)| -> Vec<(usize, usize)> {
            let methods: FxHashSet<&str> = concrete.ty.method_names().collect();
            interfaces
                .iter()
                .enumerate()
                .filter(|(_, iface)| Self::covers(&methods, iface))
                .map(|(ii, _)| (ci, ii))
                .collect()
        };

        #[cfg(feature = "parallel")]
        {
            if concretes.len() * interfaces.len() >= constants::parallel::MATCH_PARALLEL_THRESHOLD {
                return concretes
                    .par_iter()
                    .enumerate()
                    .flat_map_iter(match_one)
                    .collect();
            }
        }

        concretes.iter().enumerate().flat_map(match_one).collect()
    }
}
