//! Sorted-pair keccak256 Merkle tree
//!
//! Mirrors the verifier contract bit for bit:
//! - leaves are sorted ascending before the tree is built, so leaf order never matters
//! - each parent is `keccak256(min(a, b) || max(a, b))`, so proofs carry no orientation
//! - an odd node at the end of a level moves up unchanged
//!
//! An empty tree has root [`EMPTY_ROOT`]. A one-leaf tree has that leaf as its root.

use alloy_primitives::{keccak256, B256};

/// Root of a tree with no leaves
pub const EMPTY_ROOT: B256 = B256::ZERO;

/// Hash two nodes in byte order
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left.as_slice());
    data[32..].copy_from_slice(right.as_slice());
    keccak256(data)
}

/// Fold a proof from `leaf` and compare with `root`
pub fn verify_proof(leaf: B256, proof: &[B256], root: B256) -> bool {
    proof.iter().fold(leaf, |acc, node| hash_pair(&acc, node)) == root
}

/// Fully materialized tree; level 0 holds the sorted leaves
#[derive(Debug, Clone)]
pub struct MerkleTree {
    layers: Vec<Vec<B256>>,
}

impl MerkleTree {
    /// Build from leaf hashes in any order
    pub fn new(mut leaves: Vec<B256>) -> Self {
        leaves.sort();

        let mut layers = vec![leaves];
        while let Some(layer) = layers.last().filter(|layer| layer.len() > 1) {
            let next: Vec<B256> = layer
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    _ => pair[0],
                })
                .collect();
            layers.push(next);
        }

        Self { layers }
    }

    /// Root hash
    pub fn root(&self) -> B256 {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or(EMPTY_ROOT)
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.leaves().len()
    }

    /// Whether the tree has no leaves
    pub fn is_empty(&self) -> bool {
        self.leaves().is_empty()
    }

    /// Sorted leaves
    pub fn leaves(&self) -> &[B256] {
        self.layers.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `leaf` is in the tree
    pub fn contains(&self, leaf: &B256) -> bool {
        self.leaves().binary_search(leaf).is_ok()
    }

    /// Sibling hashes from `leaf` up to the root.
    ///
    /// A leaf that is not in the tree gets an empty proof rather than an error. With
    /// duplicate leaves the first occurrence is proven.
    pub fn proof(&self, leaf: &B256) -> Vec<B256> {
        let Some(mut index) = self.leaves().iter().position(|candidate| candidate == leaf) else {
            return Vec::new();
        };

        let mut proof = Vec::with_capacity(self.layers.len().saturating_sub(1));
        for layer in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = layer.get(index ^ 1) {
                proof.push(*sibling);
            }
            index /= 2;
        }
        proof
    }
}
