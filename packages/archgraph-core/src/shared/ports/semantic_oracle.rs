//! Semantic oracle port
//!
//! An optional external service (usually a language server) that can resolve
//! interface implementations precisely. The engine is fully functional when
//! no oracle is supplied; when one is, it is a single sequential resource
//! with lifecycle `initialize → query* → dispose`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Failure talking to the oracle
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle not initialized")]
    NotInitialized,

    #[error("oracle already disposed")]
    Disposed,

    #[error("oracle request '{operation}' timed out after {elapsed_ms}ms")]
    Timeout { operation: String, elapsed_ms: u64 },

    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    #[error("oracle protocol error: {0}")]
    Protocol(String),
}

/// One implementing type reported by the oracle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleImplementation {
    pub struct_name: String,
}

/// External semantic resolver
///
/// Queries take `&mut self`: a persistent language-server process is not
/// safe for concurrent requests without pooling.
#[async_trait]
pub trait SemanticOracle: Send {
    async fn initialize(&mut self, workspace_root: &Path) -> Result<(), OracleError>;

    /// Types implementing the interface declared at `file:line`
    async fn get_implementations(
        &mut self,
        interface_name: &str,
        file: &str,
        line: u32,
    ) -> Result<Vec<OracleImplementation>, OracleError>;

    async fn dispose(&mut self);
}
