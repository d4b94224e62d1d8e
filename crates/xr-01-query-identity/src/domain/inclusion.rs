//! # Inclusion Tree
//!
//! Binary keccak tree over the transaction hashes of one block.
//!
//! Leaves are padded to a power of two (minimum two) with [`SENTINEL_HASH`].
//! Nodes live in a flat array, root at index 0, children of `i` at
//! `2i + 1` and `2i + 2`, leaves at the tail.

use super::errors::IdentityError;
use shared_types::{keccak256_concat, Hash, ProofNode};

/// Padding leaf.
pub const SENTINEL_HASH: Hash = [0u8; 32];

/// Inclusion tree for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionTree {
    nodes: Vec<Hash>,
    leaf_count: usize,
    padded_leaf_count: usize,
}

impl InclusionTree {
    /// Build a tree from leaf hashes in block order.
    pub fn build(leaves: Vec<Hash>) -> Self {
        let leaf_count = leaves.len();
        if leaf_count == 0 {
            return Self {
                nodes: vec![SENTINEL_HASH],
                leaf_count: 0,
                padded_leaf_count: 0,
            };
        }

        let padded_leaf_count = leaf_count.next_power_of_two().max(2);
        let leaf_start = padded_leaf_count - 1;
        let mut nodes = vec![SENTINEL_HASH; 2 * padded_leaf_count - 1];
        nodes[leaf_start..leaf_start + leaf_count].copy_from_slice(&leaves);

        for i in (0..leaf_start).rev() {
            nodes[i] = hash_pair(&nodes[2 * i + 1], &nodes[2 * i + 2]);
        }

        Self {
            nodes,
            leaf_count,
            padded_leaf_count,
        }
    }

    /// Root committed by the block header.
    pub fn root(&self) -> Hash {
        self.nodes[0]
    }

    /// Number of real (unpadded) leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Leaf-to-root sibling path for the leaf at `index`.
    pub fn path(&self, index: usize) -> Result<Vec<ProofNode>, IdentityError> {
        if index >= self.leaf_count {
            return Err(IdentityError::LeafOutOfRange {
                index,
                count: self.leaf_count,
            });
        }

        let mut current = self.padded_leaf_count - 1 + index;
        let mut path = Vec::with_capacity(self.padded_leaf_count.trailing_zeros() as usize);

        while current > 0 {
            // Even array slots are right children.
            let node = if current % 2 == 0 {
                ProofNode::left(self.nodes[current - 1])
            } else {
                ProofNode::right(self.nodes[current + 1])
            };
            path.push(node);
            current = (current - 1) / 2;
        }

        Ok(path)
    }

    /// Recompute the root from a leaf and its path and compare.
    pub fn verify(leaf: &Hash, path: &[ProofNode], root: &Hash) -> bool {
        let computed = path.iter().fold(*leaf, |current, node| {
            if node.is_left_sibling {
                hash_pair(&node.hash, &current)
            } else {
                hash_pair(&current, &node.hash)
            }
        });
        computed == *root
    }
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    keccak256_concat(&[left.as_slice(), right.as_slice()])
}
