//! Merkle whitelist host library
//!
//! Builds the sorted-pair keccak-256 tree over `(address, amount)` leaves,
//! generates inclusion proofs for claimants, and checks them the same way the
//! deployed `WhitelistVerifier` contract does.

pub mod adapters;
pub mod config;
pub mod error;
pub mod hash;
pub mod leaf;
pub mod merkle;
pub mod ports;
pub mod whitelist;

pub use error::WhitelistError;
pub use leaf::WhitelistEntry;
pub use merkle::{MerkleProof, MerkleTree};
pub use whitelist::{Claim, ProofBundle, Whitelist};
