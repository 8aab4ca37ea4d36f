//! StructuralMatcher use case
//!
//! Two tiers:
//! 1. Oracle (optional): one query per interface; concrete types it reports
//!    get an oracle-tagged match.
//! 2. Heuristic: every concrete type the oracle did not resolve.
//!
//! Any oracle error or timeout discards everything the oracle produced in
//! this run and the heuristic covers the whole type set instead.

use std::path::Path;
use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use crate::config::OracleConfig;
use crate::features::structural_matching::domain::{
    FallbackReason, InferredImplementation, MatchOutcome, TypeRef,
};
use crate::features::structural_matching::infrastructure::{HeuristicMatcher, OracleSession};
use crate::shared::models::RawProject;
use crate::shared::ports::{OracleError, SemanticOracle};

/// Infers implements-edges between concrete types and interfaces
#[derive(Debug, Clone, Default)]
pub struct StructuralMatcher {
    config: OracleConfig,
    heuristic: HeuristicMatcher,
}

impl StructuralMatcher {
    pub fn new(config: OracleConfig) -> Self {
        Self {
            config,
            heuristic: HeuristicMatcher::new(),
        }
    }

    /// Heuristic matching over the whole project
    pub fn match_heuristic(&self, project: &RawProject) -> MatchOutcome {
        let (structs, interfaces) = TypeRef::collect(project);
        MatchOutcome {
            implementations: self.heuristic_over(&structs, &interfaces),
            oracle_used: false,
            fallback: None,
        }
    }

    fn heuristic_over(
        &self,
        structs: &[TypeRef<'_>],
        interfaces: &[TypeRef<'_>],
    ) -> Vec<InferredImplementation> {
        self.heuristic
            .match_indices(structs, interfaces)
            .into_iter()
            .map(|(si, ii)| InferredImplementation::heuristic(&structs[si], &interfaces[ii]))
            .collect()
    }

    /// Oracle-backed matching with heuristic fallback.
    ///
    /// Never fails: oracle problems come back as [`MatchOutcome::fallback`].
    pub async fn match_with_oracle(
        &self,
        project: &RawProject,
        oracle: Option<Box<dyn SemanticOracle>>,
    ) -> MatchOutcome {
        let Some(oracle) = oracle else {
            return self.match_heuristic(project);
        };

        let (structs, interfaces) = TypeRef::collect(project);
        let mut session = OracleSession::new(oracle, &self.config);
        let deadline = self.config.deadline_ms.map(Duration::from_millis);

        if let Err(error) = session
            .initialize(Path::new(&project.module_root), deadline)
            .await
        {
            return self.fall_back(&structs, &interfaces, FallbackReason::InitFailed(error));
        }

        let resolved = self.query_oracle(&mut session, &structs, &interfaces).await;
        session.dispose().await;

        let oracle_pairs = match resolved {
            Ok(pairs) => pairs,
            Err((interface, error)) => {
                return self.fall_back(
                    &structs,
                    &interfaces,
                    FallbackReason::QueryFailed { interface, error },
                );
            }
        };

        // Concrete types the oracle never reported go through the heuristic
        let resolved_structs: FxHashSet<usize> = oracle_pairs.iter().map(|&(si, _)| si).collect();
        let unresolved: Vec<usize> = (0..structs.len())
            .filter(|si| !resolved_structs.contains(si))
            .collect();
        let unresolved_refs: Vec<TypeRef<'_>> = unresolved.iter().map(|&si| structs[si]).collect();

        let mut pairs: Vec<(usize, usize, InferredImplementation)> = oracle_pairs
            .into_iter()
            .map(|(si, ii)| {
                let implementation = InferredImplementation::oracle(
                    &structs[si],
                    &interfaces[ii],
                    self.config.confidence,
                );
                (si, ii, implementation)
            })
            .collect();
        let oracle_count = pairs.len();

        pairs.extend(
            self.heuristic
                .match_indices(&unresolved_refs, &interfaces)
                .into_iter()
                .map(|(ui, ii)| {
                    let si = unresolved[ui];
                    (si, ii, InferredImplementation::heuristic(&structs[si], &interfaces[ii]))
                }),
        );
        pairs.sort_by_key(|&(si, ii, _)| (si, ii));

        info!(
            "structural matching: {} oracle + {} heuristic implementations",
            oracle_count,
            pairs.len() - oracle_count
        );

        MatchOutcome {
            implementations: pairs.into_iter().map(|(_, _, i)| i).collect(),
            oracle_used: oracle_count > 0,
            fallback: None,
        }
    }

    /// Query every non-empty interface in input order.
    ///
    /// Returns (struct index, interface index) pairs, or the failing
    /// interface id with its error.
    async fn query_oracle(
        &self,
        session: &mut OracleSession,
        structs: &[TypeRef<'_>],
        interfaces: &[TypeRef<'_>],
    ) -> Result<Vec<(usize, usize)>, (String, OracleError)> {
        // First declaration wins when two packages declare the same name
        let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();
        for (si, s) in structs.iter().enumerate() {
            by_name.entry(s.ty.name.as_str()).or_insert(si);
        }

        let mut seen = FxHashSet::default();
        let mut pairs = Vec::new();

        for (ii, iface) in interfaces.iter().enumerate() {
            if iface.ty.methods.is_empty() {
                continue;
            }
            let location = &iface.ty.location;
            let found = session
                .implementations(&iface.ty.name, &location.file, location.start_line)
                .await
                .map_err(|error| (iface.id(), error))?;

            for implementation in found {
                match by_name.get(implementation.struct_name.as_str()) {
                    Some(&si) => {
                        if seen.insert((si, ii)) {
                            pairs.push((si, ii));
                        }
                    }
                    None => debug!(
                        "oracle reported unknown type {} for {}",
                        implementation.struct_name,
                        iface.id()
                    ),
                }
            }
        }

        Ok(pairs)
    }

    fn fall_back(
        &self,
        structs: &[TypeRef<'_>],
        interfaces: &[TypeRef<'_>],
        reason: FallbackReason,
    ) -> MatchOutcome {
        warn!("{}; using heuristic matching for all types", reason);
        MatchOutcome {
            implementations: self.heuristic_over(structs, interfaces),
            oracle_used: false,
            fallback: Some(reason),
        }
    }
}
