//! In-memory whitelist for the distributor.
//!
//! Holds the `WhitelistEntry` records the root commits to and turns them into
//! a tree and a distributable proof bundle. The set is fixed once the root is
//! published; there is no update path.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{LeafKey, WhitelistError};
use crate::leaf::WhitelistEntry;
use crate::merkle::{MerkleProof, MerkleTree};

/// An ordered list of whitelist entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    entries: Vec<WhitelistEntry>,
}

/// Everything a claimant needs to call `verifyInWhitelist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub address: Address,
    pub amount: U256,
    pub leaf: B256,
    pub proof: Vec<B256>,
}

/// The published root together with one claim per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub root: B256,
    pub claims: Vec<Claim>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry and return its index.
    pub fn add_entry(&mut self, entry: WhitelistEntry) -> usize {
        let idx = self.entries.len();
        self.entries.push(entry);
        idx
    }

    pub fn get_entry(&self, index: usize) -> Option<&WhitelistEntry> {
        self.entries.get(index)
    }

    /// First entry recorded for `address`.
    pub fn find(&self, address: &Address) -> Option<&WhitelistEntry> {
        self.entries.iter().find(|e| e.address == *address)
    }

    pub fn entries(&self) -> &[WhitelistEntry] {
        &self.entries
    }

    /// Leaf hash of every entry, in insertion order.
    pub fn leaf_hashes(&self) -> Vec<B256> {
        self.entries.iter().map(WhitelistEntry::leaf_hash).collect()
    }

    /// Build the Merkle tree over all entries.
    pub fn build_tree(&self) -> Result<MerkleTree, WhitelistError> {
        MerkleTree::from_entries(&self.entries)
    }

    /// Claim for `address` against `tree`, which must have been built from
    /// this whitelist.
    pub fn claim_for(&self, tree: &MerkleTree, address: &Address) -> Result<Claim, WhitelistError> {
        let entry = self
            .find(address)
            .ok_or(WhitelistError::LeafNotFound(LeafKey::Address(*address)))?;
        claim(tree, entry)
    }

    /// One claim per entry, in insertion order.
    pub fn proof_bundle(&self, tree: &MerkleTree) -> Result<ProofBundle, WhitelistError> {
        let claims = self
            .entries
            .iter()
            .map(|entry| claim(tree, entry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProofBundle {
            root: tree.root(),
            claims,
        })
    }
}

impl FromIterator<WhitelistEntry> for Whitelist {
    fn from_iter<I: IntoIterator<Item = WhitelistEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

fn claim(tree: &MerkleTree, entry: &WhitelistEntry) -> Result<Claim, WhitelistError> {
    let leaf = entry.leaf_hash();
    let proof = tree.prove_leaf(&leaf)?;
    Ok(Claim {
        address: entry.address,
        amount: entry.amount,
        leaf,
        proof: proof.path,
    })
}

impl Claim {
    /// Re-derive the leaf from (address, amount) and check it against `root`.
    /// The stored `leaf` field is informational and not trusted.
    pub fn verify(&self, root: B256) -> bool {
        let leaf = WhitelistEntry::new(self.address, self.amount).leaf_hash();
        MerkleProof::new(self.proof.clone()).verify(leaf, root)
    }
}

impl ProofBundle {
    pub fn claim_for(&self, address: &Address) -> Option<&Claim> {
        self.claims.iter().find(|c| c.address == *address)
    }
}
