//! Merkle root reduction over transaction id digests.

use crate::hash::{sha256_concat, Hash};

/// Combine two digests into their parent node: a single SHA-256 over the
/// 64-byte concatenation. Pure and stateless, safe to call concurrently.
pub fn combine(left: &Hash, right: &Hash) -> Hash {
    sha256_concat(&[left.as_ref(), right.as_ref()])
}

/// Compute the merkle root of an ordered list of digests.
///
/// Returns the zero hash for an empty list. A single digest is returned
/// unchanged. Otherwise the list is reduced level by level: adjacent pairs
/// combine left-to-right, and a level with an odd count pairs its last
/// digest with itself. Each level is written into a freshly allocated
/// vector rather than mutated in place.
pub fn merkle_root(hashes: &[Hash]) -> Hash {
    if hashes.is_empty() {
        return Hash::ZERO;
    }

    if hashes.len() == 1 {
        return hashes[0];
    }

    let mut current_level: Vec<Hash> = hashes.to_vec();

    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));

        for chunk in current_level.chunks(2) {
            let node = if chunk.len() == 2 {
                combine(&chunk[0], &chunk[1])
            } else {
                // Odd number of elements: the last one pairs with itself
                combine(&chunk[0], &chunk[0])
            };
            next_level.push(node);
        }

        current_level = next_level;
    }

    current_level[0]
}

/// A merkle tree for efficient proofs.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes in the tree, level by level (leaves first).
    levels: Vec<Vec<Hash>>,
}

/// A merkle proof for a single leaf.
#[derive(Debug, Clone)]
pub struct MerkleProof {
    /// The leaf being proven.
    pub leaf: Hash,
    /// Sibling hashes from leaf to root.
    pub siblings: Vec<Hash>,
    /// Direction for each sibling (true = right, false = left).
    pub directions: Vec<bool>,
}

impl MerkleTree {
    /// Build a merkle tree from a list of leaf digests.
    pub fn new(leaves: &[Hash]) -> Self {
        if leaves.is_empty() {
            return Self {
                levels: vec![vec![Hash::ZERO]],
            };
        }

        let mut levels = vec![leaves.to_vec()];

        while levels.last().expect("levels is never empty").len() > 1 {
            let current = levels.last().expect("levels is never empty");
            let mut next = Vec::with_capacity(current.len().div_ceil(2));

            for chunk in current.chunks(2) {
                let node = if chunk.len() == 2 {
                    combine(&chunk[0], &chunk[1])
                } else {
                    combine(&chunk[0], &chunk[0])
                };
                next.push(node);
            }

            levels.push(next);
        }

        Self { levels }
    }

    /// Get the root of the merkle tree.
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .expect("tree always has a root level")
    }

    /// Get the number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map(|l| l.len()).unwrap_or(0)
    }

    /// Generate a proof for the leaf at the given index.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        if index >= self.leaf_count() {
            return None;
        }

        let leaf = self.levels[0][index];
        let mut siblings = Vec::new();
        let mut directions = Vec::new();
        let mut idx = index;

        for level in &self.levels[..self.levels.len() - 1] {
            let sibling_idx = if idx % 2 == 0 { idx + 1 } else { idx - 1 };
            let is_right = idx % 2 == 0;

            let sibling = if sibling_idx < level.len() {
                level[sibling_idx]
            } else {
                level[idx] // Odd leaf pairs with itself
            };

            siblings.push(sibling);
            directions.push(is_right);
            idx /= 2;
        }

        Some(MerkleProof {
            leaf,
            siblings,
            directions,
        })
    }

    /// Verify a merkle proof against this tree's root.
    pub fn verify_proof(&self, proof: &MerkleProof) -> bool {
        verify_proof(&self.root(), proof)
    }
}

/// Verify a merkle proof against a given root.
pub fn verify_proof(root: &Hash, proof: &MerkleProof) -> bool {
    let mut current = proof.leaf;

    for (sibling, is_right) in proof.siblings.iter().zip(proof.directions.iter()) {
        current = if *is_right {
            combine(&current, sibling)
        } else {
            combine(sibling, &current)
        };
    }

    current == *root
}
