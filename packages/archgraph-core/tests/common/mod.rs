//! Common test utilities for archgraph-core
//!
//! Fixture builders for raw projects and ArchJSON documents, shared by the
//! integration tests.

#![allow(dead_code)]

mod builders;
mod fixtures;

pub use builders::*;
pub use fixtures::*;
