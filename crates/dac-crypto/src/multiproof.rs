//! # Multiproofs: Selective Disclosure of Several Leaves
//!
//! A multiproof lets a verifier recompute the root from a disclosed subset
//! of leaves plus the fewest auxiliary hashes that cannot be derived from
//! that subset.
//!
//! ## Generation
//!
//! Level by level, starting with the sorted target indices as the known set:
//!
//! - scan the known indices in ascending order;
//! - if `i` and its sibling `i ^ 1` are both known, record
//!   [`PlanStep::BothKnown`] and consume both;
//! - otherwise record [`PlanStep::SiblingSupplied`] and append the sibling's
//!   hash to the auxiliary list;
//! - the next known set is the parents `i / 2` of the pairs just resolved.
//!
//! The plan is the concatenation of per-pair markers over all levels.
//!
//! ## Verification
//!
//! Replays the plan over freshly recomputed leaf hashes. It is total: any
//! inconsistency (plan or auxiliary list too short or too long, a marker
//! that contradicts the index structure, wrong depth) yields a
//! [`Rejection`], never a panic. Every plan marker is re-derived from the
//! index set and cross-checked, so the plan can be serialized or not
//! without changing what is accepted.

use std::collections::BTreeMap;

use dac_core::{leaf_hash, node_hash, FieldValue, Hash256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::MerkleError;
use crate::merkle::{depth_for, MerkleTree};

/// One reconstruction marker, recorded once per resolved pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStep {
    /// Both children of the pair are already known to the verifier.
    BothKnown,
    /// One child is known; the other is the next auxiliary hash.
    SiblingSupplied,
}

/// A multi-leaf inclusion proof against a single root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multiproof {
    /// Disclosed leaf indices, strictly ascending.
    pub indices: Vec<usize>,
    /// Real (unpadded) leaf count of the tree.
    pub leaf_count: usize,
    /// Tree depth (`log2` of the padded width).
    pub depth: u32,
    /// Leaf hashes of the disclosed indices, in index order.
    pub leaves: Vec<Hash256>,
    /// Auxiliary sibling hashes, in consumption order.
    pub siblings: Vec<Hash256>,
    /// Per-pair reconstruction markers, in replay order.
    pub plan: Vec<PlanStep>,
}

/// Why a multiproof did not verify.
///
/// All variants mean "verification failed"; they differ only for
/// diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing was disclosed.
    #[error("no fields disclosed")]
    EmptyDisclosure,

    /// A disclosed index is outside the credential's field range.
    #[error("disclosed index {index} out of range for {leaf_count} leaves")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Leaf count claimed by the proof.
        leaf_count: usize,
    },

    /// The proof's depth differs from the depth the verifier expects.
    #[error("proof depth {found} does not match expected depth {expected}")]
    DepthMismatch {
        /// Depth supplied by the verifier.
        expected: u32,
        /// Depth carried by the proof.
        found: u32,
    },

    /// The proof is structurally inconsistent.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// A leaf hash carried by the proof differs from the recomputed one.
    #[error("leaf hash at index {0} does not match the disclosed value")]
    LeafMismatch(usize),

    /// The reconstructed root differs from the expected root.
    #[error("reconstructed root {computed} does not match expected root {expected}")]
    RootMismatch {
        /// Root the verifier trusts.
        expected: Hash256,
        /// Root the proof reconstructs to.
        computed: Hash256,
    },
}

impl Multiproof {
    /// Number of auxiliary hashes carried.
    pub fn auxiliary_count(&self) -> usize {
        self.siblings.len()
    }
}

/// Generate a multiproof for `targets` over `tree`.
///
/// Duplicate indices collapse. Both input checks run before any hash is
/// read from the tree.
///
/// # Errors
///
/// `EmptyTarget` for an empty set; `IndexOutOfRange` for an index not below
/// the tree's real leaf count; `MissingNode` if the tree lacks a node its
/// shape requires.
pub fn generate_multiproof<I>(tree: &MerkleTree, targets: I) -> Result<Multiproof, MerkleError>
where
    I: IntoIterator<Item = usize>,
{
    let mut known: Vec<usize> = targets.into_iter().collect();
    known.sort_unstable();
    known.dedup();

    if known.is_empty() {
        return Err(MerkleError::EmptyTarget);
    }
    let leaf_count = tree.leaf_count();
    if let Some(&index) = known.iter().find(|&&i| i >= leaf_count) {
        return Err(MerkleError::IndexOutOfRange { index, leaf_count });
    }

    let indices = known.clone();
    let leaves = indices
        .iter()
        .map(|&i| {
            tree.leaf(i)
                .copied()
                .ok_or(MerkleError::MissingNode { level: 0, index: i })
        })
        .collect::<Result<Vec<Hash256>, _>>()?;

    let mut siblings = Vec::new();
    let mut plan = Vec::new();

    for level in 0..tree.depth() {
        let mut parents = Vec::with_capacity(known.len());
        let mut j = 0;
        while j < known.len() {
            let i = known[j];
            let sibling = i ^ 1;
            if known.get(j + 1) == Some(&sibling) {
                plan.push(PlanStep::BothKnown);
                j += 2;
            } else {
                plan.push(PlanStep::SiblingSupplied);
                let hash = tree.node(level, sibling).ok_or(MerkleError::MissingNode {
                    level,
                    index: sibling,
                })?;
                siblings.push(*hash);
                j += 1;
            }
            parents.push(i / 2);
        }
        known = parents;
    }

    Ok(Multiproof {
        indices,
        leaf_count,
        depth: tree.depth(),
        leaves,
        siblings,
        plan,
    })
}

/// Verify a multiproof, returning the reason on failure.
///
/// `disclosed` may arrive in any order; indices are sorted before use and
/// leaf hashes are always recomputed from the values. A repeated index is
/// a malformed disclosure.
pub fn check_multiproof<'a, I>(
    disclosed: I,
    proof: &Multiproof,
    expected_root: &Hash256,
    depth: u32,
) -> Result<(), Rejection>
where
    I: IntoIterator<Item = (usize, &'a FieldValue)>,
{
    let mut values: BTreeMap<usize, &FieldValue> = BTreeMap::new();
    for (index, value) in disclosed {
        if values.insert(index, value).is_some() {
            return Err(Rejection::MalformedProof(format!(
                "index {index} disclosed more than once"
            )));
        }
    }

    if values.is_empty() {
        return Err(Rejection::EmptyDisclosure);
    }
    if proof.depth != depth {
        return Err(Rejection::DepthMismatch {
            expected: depth,
            found: proof.depth,
        });
    }
    if depth_for(proof.leaf_count) != Some(depth) {
        return Err(Rejection::MalformedProof(format!(
            "leaf count {} is inconsistent with depth {depth}",
            proof.leaf_count
        )));
    }
    if let Some(&index) = values.keys().find(|&&i| i >= proof.leaf_count) {
        return Err(Rejection::IndexOutOfRange {
            index,
            leaf_count: proof.leaf_count,
        });
    }
    if !values.keys().copied().eq(proof.indices.iter().copied()) {
        return Err(Rejection::MalformedProof(
            "disclosed indices differ from proof indices".to_string(),
        ));
    }
    if proof.leaves.len() != values.len() {
        return Err(Rejection::MalformedProof(format!(
            "proof carries {} leaf hashes for {} disclosed values",
            proof.leaves.len(),
            values.len()
        )));
    }

    let mut known: Vec<(usize, Hash256)> = Vec::with_capacity(values.len());
    for ((&index, value), carried) in values.iter().zip(&proof.leaves) {
        let recomputed = leaf_hash(value);
        if &recomputed != carried {
            return Err(Rejection::LeafMismatch(index));
        }
        known.push((index, recomputed));
    }

    let computed = replay(known, proof, depth)?;
    if &computed != expected_root {
        return Err(Rejection::RootMismatch {
            expected: *expected_root,
            computed,
        });
    }
    Ok(())
}

/// Verify a multiproof; `true` iff the reconstructed root equals
/// `expected_root` byte for byte.
pub fn verify_multiproof<'a, I>(
    disclosed: I,
    proof: &Multiproof,
    expected_root: &Hash256,
    depth: u32,
) -> bool
where
    I: IntoIterator<Item = (usize, &'a FieldValue)>,
{
    check_multiproof(disclosed, proof, expected_root, depth).is_ok()
}

fn replay(
    mut known: Vec<(usize, Hash256)>,
    proof: &Multiproof,
    depth: u32,
) -> Result<Hash256, Rejection> {
    let malformed = |msg: &str| Rejection::MalformedProof(msg.to_string());
    let mut plan = proof.plan.iter();
    let mut siblings = proof.siblings.iter();

    for _ in 0..depth {
        let mut parents = Vec::with_capacity(known.len());
        let mut j = 0;
        while j < known.len() {
            let (i, hash) = known[j];
            let next_is_sibling = known.get(j + 1).map(|&(k, _)| k) == Some(i ^ 1);
            let step = plan
                .next()
                .ok_or_else(|| malformed("plan exhausted before reaching the root"))?;
            let parent = match step {
                PlanStep::BothKnown => {
                    if !next_is_sibling {
                        return Err(malformed("plan marks a pair both-known but sibling is absent"));
                    }
                    let (_, right) = known[j + 1];
                    j += 2;
                    node_hash(&hash, &right)
                }
                PlanStep::SiblingSupplied => {
                    if next_is_sibling {
                        return Err(malformed("plan requests a sibling that is already known"));
                    }
                    let aux = siblings
                        .next()
                        .ok_or_else(|| malformed("auxiliary hashes exhausted"))?;
                    j += 1;
                    if i % 2 == 0 {
                        node_hash(&hash, aux)
                    } else {
                        node_hash(aux, &hash)
                    }
                }
            };
            parents.push((i / 2, parent));
        }
        known = parents;
    }

    if plan.next().is_some() {
        return Err(malformed("plan has unconsumed steps"));
    }
    if siblings.next().is_some() {
        return Err(malformed("auxiliary hashes left unconsumed"));
    }
    match known.as_slice() {
        [(0, root)] => Ok(*root),
        _ => Err(malformed("reconstruction did not converge to a single root")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential_values() -> Vec<FieldValue> {
        ["Alice", "2000-01-01", "CS", "A"]
            .iter()
            .map(|s| FieldValue::text(*s))
            .collect()
    }

    fn disclose(values: &[FieldValue], indices: &[usize]) -> Vec<(usize, FieldValue)> {
        indices.iter().map(|&i| (i, values[i].clone())).collect()
    }

    fn pairs(d: &[(usize, FieldValue)]) -> impl Iterator<Item = (usize, &FieldValue)> {
        d.iter().map(|(i, v)| (*i, v))
    }

    #[test]
    fn test_name_and_grade_scenario() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [3, 0]).unwrap();

        assert_eq!(proof.indices, vec![0, 3]);
        assert_eq!(proof.auxiliary_count(), 2);
        assert_eq!(proof.siblings, vec![*tree.leaf(1).unwrap(), *tree.leaf(2).unwrap()]);
        assert_eq!(
            proof.plan,
            vec![
                PlanStep::SiblingSupplied,
                PlanStep::SiblingSupplied,
                PlanStep::BothKnown
            ]
        );

        let d = disclose(&values, &[0, 3]);
        assert_eq!(
            check_multiproof(pairs(&d), &proof, &tree.root(), tree.depth()),
            Ok(())
        );
    }

    #[test]
    fn test_adjacent_pair_needs_one_sibling() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [0, 1]).unwrap();
        assert_eq!(proof.siblings.len(), 1);
        assert_eq!(
            proof.plan,
            vec![PlanStep::BothKnown, PlanStep::SiblingSupplied]
        );
        let d = disclose(&values, &[0, 1]);
        assert!(verify_multiproof(pairs(&d), &proof, &tree.root(), 2));
    }

    #[test]
    fn test_full_disclosure_needs_no_siblings() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, 0..4).unwrap();
        assert!(proof.siblings.is_empty());
        let d = disclose(&values, &[0, 1, 2, 3]);
        assert!(verify_multiproof(pairs(&d), &proof, &tree.root(), 2));
    }

    #[test]
    fn test_single_leaf_tree() {
        let values = vec![FieldValue::text("solo")];
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [0]).unwrap();
        assert!(proof.plan.is_empty());
        let d = disclose(&values, &[0]);
        assert!(verify_multiproof(pairs(&d), &proof, &tree.root(), 0));
    }

    #[test]
    fn test_last_leaf_against_its_padding_copy() {
        let values: Vec<FieldValue> = ["a", "b", "c"].iter().map(|s| FieldValue::text(*s)).collect();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [2]).unwrap();
        assert_eq!(proof.siblings[0], *tree.leaf(2).unwrap());
        let d = disclose(&values, &[2]);
        assert!(verify_multiproof(pairs(&d), &proof, &tree.root(), tree.depth()));
    }

    #[test]
    fn test_generation_rejects_empty_and_out_of_range() {
        let tree = MerkleTree::build(&credential_values()).unwrap();
        assert_eq!(
            generate_multiproof(&tree, std::iter::empty()).unwrap_err(),
            MerkleError::EmptyTarget
        );
        assert_eq!(
            generate_multiproof(&tree, [1, 4]).unwrap_err(),
            MerkleError::IndexOutOfRange {
                index: 4,
                leaf_count: 4
            }
        );
    }

    #[test]
    fn test_padding_index_is_out_of_range() {
        let values: Vec<FieldValue> = ["a", "b", "c"].iter().map(|s| FieldValue::text(*s)).collect();
        let tree = MerkleTree::build(&values).unwrap();
        assert!(matches!(
            generate_multiproof(&tree, [3]),
            Err(MerkleError::IndexOutOfRange { index: 3, leaf_count: 3 })
        ));
    }

    #[test]
    fn test_disclosure_order_is_irrelevant() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [2, 0, 3]).unwrap();
        let reversed: Vec<(usize, FieldValue)> = disclose(&values, &[3, 2, 0]);
        assert!(verify_multiproof(pairs(&reversed), &proof, &tree.root(), 2));
    }

    #[test]
    fn test_tampered_value_rejected() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [0, 3]).unwrap();
        let d = vec![(0, FieldValue::text("Alice")), (3, FieldValue::text("A+"))];
        assert_eq!(
            check_multiproof(pairs(&d), &proof, &tree.root(), 2),
            Err(Rejection::LeafMismatch(3))
        );

        let mut stripped = proof.clone();
        stripped.leaves[1] = leaf_hash(&FieldValue::text("A+"));
        assert!(matches!(
            check_multiproof(pairs(&d), &stripped, &tree.root(), 2),
            Err(Rejection::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_tampered_sibling_rejected() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let mut proof = generate_multiproof(&tree, [0, 3]).unwrap();
        proof.siblings[1] = Hash256::from_bytes([0u8; 32]);
        let d = disclose(&values, &[0, 3]);
        assert!(matches!(
            check_multiproof(pairs(&d), &proof, &tree.root(), 2),
            Err(Rejection::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_every_plan_flip_rejected() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [0, 3]).unwrap();
        let d = disclose(&values, &[0, 3]);
        for k in 0..proof.plan.len() {
            let mut tampered = proof.clone();
            tampered.plan[k] = match tampered.plan[k] {
                PlanStep::BothKnown => PlanStep::SiblingSupplied,
                PlanStep::SiblingSupplied => PlanStep::BothKnown,
            };
            assert!(
                !verify_multiproof(pairs(&d), &tampered, &tree.root(), 2),
                "flip at {k} accepted"
            );
        }
    }

    #[test]
    fn test_malformed_lengths_rejected_not_panicking() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [0, 3]).unwrap();
        let d = disclose(&values, &[0, 3]);

        let mut short = proof.clone();
        short.siblings.pop();
        assert!(matches!(
            check_multiproof(pairs(&d), &short, &tree.root(), 2),
            Err(Rejection::MalformedProof(_))
        ));

        let mut long = proof.clone();
        long.siblings.push(Hash256::from_bytes([7u8; 32]));
        assert!(matches!(
            check_multiproof(pairs(&d), &long, &tree.root(), 2),
            Err(Rejection::MalformedProof(_))
        ));

        let mut no_plan = proof.clone();
        no_plan.plan.clear();
        assert!(matches!(
            check_multiproof(pairs(&d), &no_plan, &tree.root(), 2),
            Err(Rejection::MalformedProof(_))
        ));

        let mut extra_plan = proof.clone();
        extra_plan.plan.push(PlanStep::BothKnown);
        assert!(matches!(
            check_multiproof(pairs(&d), &extra_plan, &tree.root(), 2),
            Err(Rejection::MalformedProof(_))
        ));
    }

    #[test]
    fn test_depth_and_range_diagnostics() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [0]).unwrap();
        let d = disclose(&values, &[0]);
        assert_eq!(
            check_multiproof(pairs(&d), &proof, &tree.root(), 3),
            Err(Rejection::DepthMismatch {
                expected: 3,
                found: 2
            })
        );

        let far = vec![(9, FieldValue::text("x"))];
        assert_eq!(
            check_multiproof(pairs(&far), &proof, &tree.root(), 2),
            Err(Rejection::IndexOutOfRange {
                index: 9,
                leaf_count: 4
            })
        );

        let none: Vec<(usize, FieldValue)> = Vec::new();
        assert_eq!(
            check_multiproof(pairs(&none), &proof, &tree.root(), 2),
            Err(Rejection::EmptyDisclosure)
        );

        let mut huge = proof.clone();
        huge.leaf_count = usize::MAX;
        assert!(matches!(
            check_multiproof(pairs(&d), &huge, &tree.root(), 2),
            Err(Rejection::MalformedProof(_))
        ));
    }

    #[test]
    fn test_duplicate_disclosed_index_rejected() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let proof = generate_multiproof(&tree, [0]).unwrap();
        let d = vec![(0, values[0].clone()), (0, values[0].clone())];
        assert!(matches!(
            check_multiproof(pairs(&d), &proof, &tree.root(), 2),
            Err(Rejection::MalformedProof(_))
        ));
    }

    #[test]
    fn test_root_from_other_credential_rejected() {
        let values = credential_values();
        let tree = MerkleTree::build(&values).unwrap();
        let other: Vec<FieldValue> = ["Bob", "2001-02-02", "CS", "B"]
            .iter()
            .map(|s| FieldValue::text(*s))
            .collect();
        let other_tree = MerkleTree::build(&other).unwrap();
        let proof = generate_multiproof(&tree, [2]).unwrap();
        let d = disclose(&values, &[2]);
        assert!(!verify_multiproof(pairs(&d), &proof, &other_tree.root(), 2));
    }

    #[test]
    fn test_serde_plan_is_snake_case() {
        let tree = MerkleTree::build(&credential_values()).unwrap();
        let proof = generate_multiproof(&tree, [0, 3]).unwrap();
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json["plan"][2], "both_known");
        let back: Multiproof = serde_json::from_value(json).unwrap();
        assert_eq!(back, proof);
    }
}
