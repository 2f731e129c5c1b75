//! On-chain decision procedure for the Merkle whitelist.
//!
//! Mirrors `WhitelistVerifier.sol` operation for operation so that the
//! host-side tree and the contract can be checked against the same golden
//! vectors:
//!
//! ```solidity
//! function verifyInWhitelist(bytes32[] calldata proof, uint256 amount)
//!     public view returns (bool)
//! {
//!     bytes32 leaf = keccak256(abi.encode(msg.sender, amount));
//!     return MerkleProof.verify(proof, merkleRoot, leaf);
//! }
//! ```
//!
//! This crate does not depend on the host library. The leaf is
//! always rebuilt from the transaction sender, never taken from the caller.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::{sol, SolCall, SolValue};

sol! {
    /// ABI of the deployed whitelist verifier.
    interface IWhitelistVerifier {
        function merkleRoot() external view returns (bytes32);
        function verifyInWhitelist(bytes32[] calldata proof, uint256 amount) external view returns (bool);
    }
}

pub use IWhitelistVerifier::{merkleRootCall, verifyInWhitelistCall};

/// Errors from raw calldata dispatch. A proof that does not verify is not an
/// error: it returns an encoded `false`.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("calldata shorter than a function selector ({0} bytes)")]
    MissingSelector(usize),

    #[error("unknown function selector 0x{}", alloy_primitives::hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("invalid proof format: {0}")]
    InvalidProofFormat(#[from] alloy_sol_types::Error),
}

/// keccak256(a || b) with the numerically smaller hash first (OpenZeppelin
/// `Hashes.commutativeKeccak256`).
pub fn hash_pair(a: &B256, b: &B256) -> B256 {
    let mut buf = [0u8; 64];
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());
    keccak256(buf)
}

/// Leaf for `sender`: keccak256(abi.encode(sender, amount)).
pub fn leaf_for(sender: Address, amount: U256) -> B256 {
    keccak256((sender, amount).abi_encode())
}

/// Rebuild the root implied by `leaf` and `proof` (`MerkleProof.processProof`).
pub fn process_proof(proof: &[B256], leaf: B256) -> B256 {
    proof
        .iter()
        .fold(leaf, |computed, sibling| hash_pair(&computed, sibling))
}

/// `MerkleProof.verify`: true iff `proof` folds `leaf` up to `root`.
pub fn verify(proof: &[B256], root: B256, leaf: B256) -> bool {
    process_proof(proof, leaf) == root
}

/// A deployed verifier instance. The root is fixed at construction and is the
/// only state the contract holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhitelistVerifier {
    merkle_root: B256,
}

impl WhitelistVerifier {
    /// Deploy with the published whitelist root.
    pub fn new(merkle_root: B256) -> Self {
        Self { merkle_root }
    }

    pub fn merkle_root(&self) -> B256 {
        self.merkle_root
    }

    /// Whether `sender` is whitelisted for exactly `amount`.
    ///
    /// `sender` must come from the transaction context (`msg.sender`), not
    /// from the claimant's payload.
    pub fn verify_in_whitelist(&self, sender: Address, proof: &[B256], amount: U256) -> bool {
        verify(proof, self.merkle_root, leaf_for(sender, amount))
    }

    /// Execute a read-only call the way the EVM would route it: select on the
    /// first four bytes, decode the arguments, ABI-encode the return value.
    pub fn call(&self, sender: Address, calldata: &[u8]) -> Result<Bytes, CallError> {
        let selector: [u8; 4] = calldata
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or(CallError::MissingSelector(calldata.len()))?;

        if selector == merkleRootCall::SELECTOR {
            Ok(self.merkle_root.abi_encode().into())
        } else if selector == verifyInWhitelistCall::SELECTOR {
            let call = verifyInWhitelistCall::abi_decode(calldata)?;
            let ok = self.verify_in_whitelist(sender, &call.proof, call.amount);
            Ok(ok.abi_encode().into())
        } else {
            Err(CallError::UnknownSelector(selector))
        }
    }
}
