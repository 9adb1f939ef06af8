//! # Merkle Tree Builder
//!
//! Builds a complete binary tree over one credential's ordered leaves.
//!
//! ## Algorithm
//!
//! 1. Leaf `i` = `leaf_hash(values[i])`; position encodes field identity and
//!    is never sorted.
//! 2. With `n` leaves, the padded width is `w = n.next_power_of_two()`.
//!    The last real leaf is repeated `w - n` times.
//! 3. Adjacent pairs are hashed left-to-right with `node_hash(left, right)`
//!    until one node (the root) remains. Depth is `log2(w)`; a single leaf
//!    has depth 0 and is its own root.
//!
//! The padding rule and concatenation order are shared with
//! [`multiproof`](crate::multiproof) through this type; nothing else
//! rebuilds levels.

use dac_core::{leaf_hash, node_hash, CoreError, Credential, FieldOrdering, FieldValue, Hash256};

use crate::error::MerkleError;

/// Padded width (power of two) for `leaf_count` real leaves.
///
/// Returns `None` if the width does not fit in `usize`.
pub fn padded_width(leaf_count: usize) -> Option<usize> {
    leaf_count.checked_next_power_of_two()
}

/// Tree depth for `leaf_count` real leaves (`None` on overflow or zero).
pub fn depth_for(leaf_count: usize) -> Option<u32> {
    if leaf_count == 0 {
        return None;
    }
    padded_width(leaf_count).map(usize::trailing_zeros)
}

/// A fully materialised Merkle tree for one credential instance.
///
/// `levels[0]` holds the padded leaves and `levels[depth]` holds the root.
/// The tree is immutable after construction and is meant to be dropped once
/// the request that built it has produced its root or proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    leaf_count: usize,
    levels: Vec<Vec<Hash256>>,
}

impl MerkleTree {
    /// Build a tree from field values already arranged in ordering order.
    ///
    /// # Errors
    ///
    /// `Input(EmptyOrdering)` when `values` is empty.
    pub fn build(values: &[FieldValue]) -> Result<Self, MerkleError> {
        Self::from_leaves(values.iter().map(leaf_hash).collect())
    }

    /// Project a credential through an ordering and build its tree.
    ///
    /// # Errors
    ///
    /// `Input(MissingField)` for the first field the ordering requires but
    /// the credential lacks. No hashing happens before that check.
    pub fn from_credential(
        credential: &Credential,
        ordering: &FieldOrdering,
    ) -> Result<Self, MerkleError> {
        let values = credential.ordered_values(ordering)?;
        Self::build(&values)
    }

    /// Build a tree from precomputed leaf hashes.
    pub fn from_leaves(mut leaves: Vec<Hash256>) -> Result<Self, MerkleError> {
        let leaf_count = leaves.len();
        let last = *leaves.last().ok_or(CoreError::EmptyOrdering)?;
        let width = padded_width(leaf_count).ok_or(CoreError::EmptyOrdering)?;
        leaves.resize(width, last);

        let mut levels = vec![leaves];
        while let Some(level) = levels.last() {
            if level.len() == 1 {
                break;
            }
            let next: Vec<Hash256> = level
                .chunks_exact(2)
                .map(|pair| node_hash(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }

        Ok(Self { leaf_count, levels })
    }

    /// The root hash.
    pub fn root(&self) -> Hash256 {
        // `from_leaves` always leaves a single-node top level.
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> u32 {
        (self.levels.len() - 1) as u32
    }

    /// Number of real (unpadded) leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Leaf count after padding (a power of two).
    pub fn padded_width(&self) -> usize {
        self.levels[0].len()
    }

    /// How many copies of the last leaf were appended.
    pub fn padding_count(&self) -> usize {
        self.padded_width() - self.leaf_count
    }

    /// Leaf hash at a real index.
    pub fn leaf(&self, index: usize) -> Option<&Hash256> {
        if index < self.leaf_count {
            self.levels[0].get(index)
        } else {
            None
        }
    }

    /// Node hash at `(level, index)`; level 0 is the padded leaf row.
    pub fn node(&self, level: u32, index: usize) -> Option<&Hash256> {
        self.levels.get(level as usize)?.get(index)
    }
}
