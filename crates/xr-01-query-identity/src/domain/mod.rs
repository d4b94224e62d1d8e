//! # Domain Module
//!
//! Identity computation and inclusion trees.

pub mod errors;
pub mod identity;
pub mod inclusion;

pub use errors::*;
pub use identity::*;
pub use inclusion::{InclusionTree, SENTINEL_HASH};
