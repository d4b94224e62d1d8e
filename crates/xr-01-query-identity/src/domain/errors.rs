//! # Domain Errors

use thiserror::Error;

/// Identity computation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Sibling path deeper than the fixed-width index can represent.
    #[error("Sibling path too long: depth {depth} exceeds {max}")]
    PathTooLong {
        /// Depth of the rejected path.
        depth: usize,
        /// Maximum supported depth.
        max: usize,
    },

    /// Requested leaf outside the tree.
    #[error("Leaf index {index} out of range (tree has {count} leaves)")]
    LeafOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of real leaves.
        count: usize,
    },
}
