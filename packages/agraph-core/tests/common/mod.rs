//! Common test utilities for agraph-core
//!
//! Shared fixtures, the index consistency checker and the random operation
//! builder used by the property tests.

#![allow(dead_code)]

mod assertions;
mod builders;
mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
