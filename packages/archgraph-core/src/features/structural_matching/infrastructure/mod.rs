//! Structural matching infrastructure

mod heuristic;
mod oracle_session;

pub use heuristic::HeuristicMatcher;
pub use oracle_session::{OracleSession, SessionState};
