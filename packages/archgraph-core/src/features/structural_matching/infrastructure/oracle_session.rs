//! Semantic oracle session
//!
//! Owns the oracle for one matching run and enforces its lifecycle:
//!
//! ```text
//! Uninitialized ──initialize ok──▶ Ready ──dispose──▶ Disposed
//!       │                                               ▲
//!       └──────────initialize failed (auto-dispose)─────┘
//! ```
//!
//! Every call is wrapped in a tokio timeout so a hung language server can
//! always be abandoned.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::shared::ports::{OracleError, OracleImplementation, SemanticOracle};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Disposed,
}

pub struct OracleSession {
    oracle: Box<dyn SemanticOracle>,
    state: SessionState,
    init_timeout: Duration,
    query_timeout: Duration,
    deadline: Option<Instant>,
}

impl std::fmt::Debug for OracleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleSession")
            .field("state", &self.state)
            .field("query_timeout", &self.query_timeout)
            .finish_non_exhaustive()
    }
}

impl OracleSession {
    pub fn new(oracle: Box<dyn SemanticOracle>, config: &OracleConfig) -> Self {
        Self {
            oracle,
            state: SessionState::Uninitialized,
            init_timeout: Duration::from_millis(config.init_timeout_ms),
            query_timeout: Duration::from_millis(config.query_timeout_ms),
            deadline: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Start the oracle. On failure the session disposes itself.
    pub async fn initialize(
        &mut self,
        workspace_root: &Path,
        deadline: Option<Duration>,
    ) -> Result<(), OracleError> {
        match self.state {
            SessionState::Ready => return Ok(()),
            SessionState::Disposed => return Err(OracleError::Disposed),
            SessionState::Uninitialized => {}
        }

        let started = Instant::now();
        self.deadline = deadline.map(|d| started + d);
        let budget = self.budget(self.init_timeout);
        let result = match tokio::time::timeout(budget, self.oracle.initialize(workspace_root)).await
        {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout {
                operation: "initialize".to_string(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            }),
        };

        match result {
            Ok(()) => {
                debug!("semantic oracle ready in {:?}", started.elapsed());
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(error) => {
                warn!("semantic oracle initialization failed: {}", error);
                self.dispose().await;
                Err(error)
            }
        }
    }

    /// Implementations of the interface declared at `file:line`
    pub async fn implementations(
        &mut self,
        interface_name: &str,
        file: &str,
        line: u32,
    ) -> Result<Vec<OracleImplementation>, OracleError> {
        match self.state {
            SessionState::Uninitialized => return Err(OracleError::NotInitialized),
            SessionState::Disposed => return Err(OracleError::Disposed),
            SessionState::Ready => {}
        }

        let started = Instant::now();
        let budget = self.budget(self.query_timeout);
        if budget.is_zero() {
            return Err(OracleError::Timeout {
                operation: format!("getImplementations({})", interface_name),
                elapsed_ms: 0,
            });
        }

        let query = self.oracle.get_implementations(interface_name, file, line);
        match tokio::time::timeout(budget, query).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout {
                operation: format!("getImplementations({})", interface_name),
                elapsed_ms: started.elapsed().as_millis() as u64,
            }),
        }
    }

    /// Release the oracle. Idempotent.
    pub async fn dispose(&mut self) {
        if self.state == SessionState::Disposed {
            return;
        }
        self.state = SessionState::Disposed;
        // A hung dispose must not hold up the run either
        if tokio::time::timeout(self.init_timeout, self.oracle.dispose())
            .await
            .is_err()
        {
            warn!("semantic oracle dispose timed out");
        }
    }

    /// Per-call timeout capped by what is left of the overall deadline
    fn budget(&self, per_call: Duration) -> Duration {
        match self.deadline {
            Some(deadline) => per_call.min(deadline.saturating_duration_since(Instant::now())),
            None => per_call,
        }
    }
}
