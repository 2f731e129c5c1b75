use alloy_primitives::{Address, B256, U256};
use std::future::Future;

use whitelist_verifier::CallError;

/// Port for the chain hosting deployed whitelist verifiers.
///
/// Implementations:
/// - `LocalChain`, an in-process EVM-free stand-in that routes ABI calldata
///   to [`whitelist_verifier::WhitelistVerifier`]
pub trait WhitelistChain: Send + Sync {
    /// Deploy a verifier committed to `merkle_root` and return its address.
    fn deploy(&self, merkle_root: B256) -> impl Future<Output = Result<Address, ChainError>> + Send;

    /// Read `merkleRoot()` from a deployed verifier.
    fn merkle_root(
        &self,
        contract: Address,
    ) -> impl Future<Output = Result<B256, ChainError>> + Send;

    /// Call `verifyInWhitelist(proof, amount)` as `sender`.
    fn verify_in_whitelist(
        &self,
        contract: Address,
        sender: Address,
        proof: &[B256],
        amount: U256,
    ) -> impl Future<Output = Result<bool, ChainError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("no contract deployed at {0}")]
    ContractNotFound(Address),

    #[error("call failed: {0}")]
    Call(#[from] CallError),

    #[error("failed to decode return data: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}
