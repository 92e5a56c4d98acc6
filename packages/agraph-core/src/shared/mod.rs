//! Shared module - common types and utilities
//!
//! Plain data types used by every feature. Nothing here knows about decoding
//! or indexing; the invariants live in `features::graph`.

#[macro_use]
pub mod macros;
pub mod models;
pub mod utils;

pub use models::*;
pub use utils::id_generator::IdAllocator;
