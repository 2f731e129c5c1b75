use std::fmt;

use alloy_primitives::{Address, B256};

/// How a leaf was looked up when it could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKey {
    Hash(B256),
    Index(usize),
    Address(Address),
}

impl fmt::Display for LeafKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafKey::Hash(hash) => write!(f, "hash {hash}"),
            LeafKey::Index(index) => write!(f, "index {index}"),
            LeafKey::Address(address) => write!(f, "address {address}"),
        }
    }
}

/// Errors from leaf encoding, tree construction and proof handling.
///
/// A proof that simply does not fold to the root is not an error; every
/// verification routine reports that as `false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WhitelistError {
    #[error("{field} does not fit in {bits} bits")]
    EncodingOverflow { field: &'static str, bits: usize },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("cannot build a Merkle tree over an empty whitelist")]
    EmptySet,

    #[error("leaf not found in tree ({0})")]
    LeafNotFound(LeafKey),

    #[error("invalid proof format: {0}")]
    InvalidProofFormat(String),
}
