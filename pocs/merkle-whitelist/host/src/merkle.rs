//! Sorted-pair keccak-256 Merkle tree over whitelist leaves.
//!
//! Construction:
//!
//! * leaf hashes are sorted ascending before the tree is built, so the root
//!   depends only on the multiset of leaves, not on input order;
//! * every internal node is `keccak256(min(a, b) || max(a, b))`;
//! * an unpaired trailing node is promoted to the next level unchanged (no
//!   duplication, no zero padding).
//!
//! This is the `merkletreejs` layout with `hashLeaves`, `sortLeaves` and
//! `sortPairs` enabled, which is also what OpenZeppelin's `MerkleProof`
//! verifies on-chain. Proofs therefore carry sibling hashes only.

use alloy_primitives::B256;
use tracing::debug;

use crate::error::{LeafKey, WhitelistError};
use crate::hash::hash_sorted_pair;
use crate::leaf::{WhitelistEntry, WORD_BYTES};

/// A fully materialised tree. `layers[0]` is the sorted leaf layer, the last
/// layer holds the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<Vec<B256>>,
}

/// A Merkle inclusion proof: sibling hashes from the leaf level upward.
///
/// Levels where the node was promoted without a sibling contribute nothing,
/// so the path can be shorter than the tree depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerkleProof {
    pub path: Vec<B256>,
}

impl MerkleTree {
    /// Build a tree from whitelist entries.
    pub fn from_entries(entries: &[WhitelistEntry]) -> Result<Self, WhitelistError> {
        let leaves: Vec<B256> = entries.iter().map(WhitelistEntry::leaf_hash).collect();
        Self::from_leaves(&leaves)
    }

    /// Build a tree from leaf hashes. The leaves are sorted first; duplicates
    /// are kept.
    pub fn from_leaves(leaves: &[B256]) -> Result<Self, WhitelistError> {
        if leaves.is_empty() {
            return Err(WhitelistError::EmptySet);
        }

        let mut sorted = leaves.to_vec();
        sorted.sort_unstable();

        let mut layers = vec![sorted];
        while let Some(current) = layers.last().filter(|layer| layer.len() > 1) {
            let next: Vec<B256> = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_sorted_pair(left, right),
                    [promoted] => *promoted,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }

        let tree = Self { layers };
        debug!(
            leaves = tree.leaf_count(),
            depth = tree.depth(),
            root = %tree.root(),
            "built whitelist tree"
        );
        Ok(tree)
    }

    /// The Merkle root hash.
    pub fn root(&self) -> B256 {
        self.layers[self.layers.len() - 1][0]
    }

    /// Number of levels above the leaves. A single-leaf tree has depth 0.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Leaf hashes in tree order (ascending).
    pub fn leaves(&self) -> &[B256] {
        &self.layers[0]
    }

    /// Every level of the tree, leaves first.
    pub fn layers(&self) -> &[Vec<B256>] {
        &self.layers
    }

    /// Position of `leaf` in the sorted leaf layer (first occurrence).
    pub fn leaf_index(&self, leaf: &B256) -> Option<usize> {
        let leaves = self.leaves();
        let index = leaves.partition_point(|candidate| candidate < leaf);
        (leaves.get(index) == Some(leaf)).then_some(index)
    }

    /// Generate an inclusion proof for the leaf at `index` of the sorted leaf
    /// layer.
    pub fn prove(&self, index: usize) -> Result<MerkleProof, WhitelistError> {
        if index >= self.leaf_count() {
            return Err(WhitelistError::LeafNotFound(LeafKey::Index(index)));
        }

        let mut node_idx = index;
        let mut path = Vec::with_capacity(self.depth());

        for layer in &self.layers[..self.depth()] {
            // Sibling is the other node of the same pair, if the pair is complete.
            if let Some(sibling) = layer.get(node_idx ^ 1) {
                path.push(*sibling);
            }
            node_idx /= 2;
        }

        debug!(index, siblings = path.len(), "generated inclusion proof");
        Ok(MerkleProof { path })
    }

    /// Generate an inclusion proof for a leaf hash.
    pub fn prove_leaf(&self, leaf: &B256) -> Result<MerkleProof, WhitelistError> {
        let index = self
            .leaf_index(leaf)
            .ok_or(WhitelistError::LeafNotFound(LeafKey::Hash(*leaf)))?;
        self.prove(index)
    }
}

impl MerkleProof {
    pub fn new(path: Vec<B256>) -> Self {
        Self { path }
    }

    /// Verify that `leaf` is included in a tree with the given `root`.
    pub fn verify(&self, leaf: B256, root: B256) -> bool {
        verify(&self.path, leaf, root)
    }

    /// `0x`-prefixed hex strings, one per sibling.
    pub fn to_hex(&self) -> Vec<String> {
        self.path.iter().map(|node| node.to_string()).collect()
    }

    /// Parse a proof from hex strings (`0x` prefix optional).
    pub fn from_hex<S: AsRef<str>>(elements: &[S]) -> Result<Self, WhitelistError> {
        let raw = elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let s = element.as_ref().trim();
                let digits = s.strip_prefix("0x").unwrap_or(s);
                hex::decode(digits).map_err(|e| {
                    WhitelistError::InvalidProofFormat(format!("element {i} is not hex: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_slices(&raw)
    }

    /// Build a proof from raw byte slices, rejecting any element that is not
    /// exactly 32 bytes.
    pub fn from_slices<T: AsRef<[u8]>>(elements: &[T]) -> Result<Self, WhitelistError> {
        let path = elements
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let bytes = element.as_ref();
                if bytes.len() != WORD_BYTES {
                    return Err(WhitelistError::InvalidProofFormat(format!(
                        "element {i} is {} bytes, expected {WORD_BYTES}",
                        bytes.len()
                    )));
                }
                Ok(B256::from_slice(bytes))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { path })
    }
}

/// Fold `leaf` upward through `path` with sorted-pair hashing.
pub fn compute_root(leaf: B256, path: &[B256]) -> B256 {
    path.iter()
        .fold(leaf, |current, sibling| hash_sorted_pair(&current, sibling))
}

/// Whether `path` folds `leaf` to `root`. An empty path holds only when the
/// leaf is the root itself.
pub fn verify(path: &[B256], leaf: B256, root: B256) -> bool {
    compute_root(leaf, path) == root
}

/// [`verify`] over untyped proof elements. A malformed element is reported as
/// [`WhitelistError::InvalidProofFormat`]; a well-formed proof that does not
/// match is `Ok(false)`.
pub fn verify_raw<T: AsRef<[u8]>>(
    path: &[T],
    leaf: B256,
    root: B256,
) -> Result<bool, WhitelistError> {
    let proof = MerkleProof::from_slices(path)?;
    Ok(proof.verify(leaf, root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash;

    fn leaves(n: usize) -> Vec<B256> {
        (0..n).map(|i| hash(format!("leaf_{i}").as_bytes())).collect()
    }

    #[test]
    fn test_leaf_index_finds_sorted_position() {
        let input = leaves(7);
        let tree = MerkleTree::from_leaves(&input).unwrap();
        for leaf in &input {
            let index = tree.leaf_index(leaf).unwrap();
            assert_eq!(tree.leaves()[index], *leaf);
        }
        assert_eq!(tree.leaf_index(&hash(b"absent")), None);
    }

    #[test]
    fn test_layer_sizes_follow_promotion() {
        let tree = MerkleTree::from_leaves(&leaves(5)).unwrap();
        let sizes: Vec<usize> = tree.layers().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![5, 3, 2, 1]);
        assert_eq!(tree.depth(), 3);
    }

    #[test]
    fn test_promoted_node_is_unchanged() {
        let tree = MerkleTree::from_leaves(&leaves(3)).unwrap();
        let layers = tree.layers();
        assert_eq!(layers[1][1], layers[0][2]);
        assert_eq!(
            tree.root(),
            hash_sorted_pair(&hash_sorted_pair(&layers[0][0], &layers[0][1]), &layers[0][2])
        );
    }

    #[test]
    fn test_promoted_leaf_has_short_proof() {
        let tree = MerkleTree::from_leaves(&leaves(5)).unwrap();
        // The largest leaf sits alone at the end and is promoted twice.
        let proof = tree.prove(4).unwrap();
        assert_eq!(proof.path.len(), 1);
        assert!(proof.verify(tree.leaves()[4], tree.root()));
    }

    #[test]
    fn test_duplicate_leaves_are_kept() {
        let leaf = hash(b"dup");
        let tree = MerkleTree::from_leaves(&[leaf, leaf]).unwrap();
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.root(), hash_sorted_pair(&leaf, &leaf));
        assert_eq!(tree.leaf_index(&leaf), Some(0));
    }

    #[test]
    fn test_hex_proof_round_trip() {
        let tree = MerkleTree::from_leaves(&leaves(6)).unwrap();
        let proof = tree.prove(2).unwrap();
        let parsed = MerkleProof::from_hex(&proof.to_hex()).unwrap();
        assert_eq!(parsed, proof);
    }

    #[test]
    fn test_from_hex_rejects_bad_elements() {
        let err = MerkleProof::from_hex(&["0x1234"]).unwrap_err();
        assert!(matches!(err, WhitelistError::InvalidProofFormat(_)));

        let err = MerkleProof::from_hex(&["0xzz"]).unwrap_err();
        assert!(matches!(err, WhitelistError::InvalidProofFormat(_)));
    }

    #[test]
    fn test_verify_raw_rejects_short_element() {
        let tree = MerkleTree::from_leaves(&leaves(4)).unwrap();
        let leaf = tree.leaves()[0];
        let mut raw: Vec<Vec<u8>> = tree
            .prove(0)
            .unwrap()
            .path
            .iter()
            .map(|node| node.to_vec())
            .collect();
        assert_eq!(verify_raw(&raw, leaf, tree.root()), Ok(true));

        raw[0].pop();
        assert!(matches!(
            verify_raw(&raw, leaf, tree.root()),
            Err(WhitelistError::InvalidProofFormat(_))
        ));
    }

    #[test]
    fn test_verify_raw_mismatch_is_false_not_error() {
        let tree = MerkleTree::from_leaves(&leaves(4)).unwrap();
        let raw = vec![[0u8; 32]];
        assert_eq!(verify_raw(&raw, tree.leaves()[0], tree.root()), Ok(false));
    }
}
