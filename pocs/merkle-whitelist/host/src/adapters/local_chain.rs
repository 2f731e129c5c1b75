use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolCall, SolValue};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use whitelist_verifier::{merkleRootCall, verifyInWhitelistCall, WhitelistVerifier};

use crate::ports::chain::{ChainError, WhitelistChain};

/// In-process chain holding deployed `WhitelistVerifier` instances.
///
/// Contract addresses follow CREATE semantics (`keccak256(rlp([deployer,
/// nonce]))[12..]`), and every read goes through ABI calldata so the
/// selector and argument encoding are exercised exactly as a node would.
pub struct LocalChain {
    deployer: Address,
    nonce: Mutex<u64>,
    contracts: Mutex<HashMap<Address, WhitelistVerifier>>,
}

impl LocalChain {
    pub fn new(deployer: Address) -> Self {
        Self {
            deployer,
            nonce: Mutex::new(0),
            contracts: Mutex::new(HashMap::new()),
        }
    }

    pub fn deployer(&self) -> Address {
        self.deployer
    }

    async fn contract(&self, address: Address) -> Result<WhitelistVerifier, ChainError> {
        self.contracts
            .lock()
            .await
            .get(&address)
            .copied()
            .ok_or(ChainError::ContractNotFound(address))
    }
}

impl Default for LocalChain {
    fn default() -> Self {
        Self::new(Address::ZERO)
    }
}

impl WhitelistChain for LocalChain {
    async fn deploy(&self, merkle_root: B256) -> Result<Address, ChainError> {
        let mut nonce = self.nonce.lock().await;
        let address = self.deployer.create(*nonce);
        *nonce += 1;

        self.contracts
            .lock()
            .await
            .insert(address, WhitelistVerifier::new(merkle_root));
        info!(%address, root = %merkle_root, "deployed whitelist verifier");
        Ok(address)
    }

    async fn merkle_root(&self, contract: Address) -> Result<B256, ChainError> {
        let verifier = self.contract(contract).await?;
        let ret = verifier.call(self.deployer, &merkleRootCall {}.abi_encode())?;
        Ok(B256::abi_decode(&ret)?)
    }

    async fn verify_in_whitelist(
        &self,
        contract: Address,
        sender: Address,
        proof: &[B256],
        amount: U256,
    ) -> Result<bool, ChainError> {
        let verifier = self.contract(contract).await?;
        let calldata = verifyInWhitelistCall {
            proof: proof.to_vec(),
            amount,
        }
        .abi_encode();
        let ret = verifier
            .call(sender, &calldata)
            .inspect_err(|e| warn!(%contract, %sender, error = %e, "call reverted"))?;
        let ok = bool::abi_decode(&ret)?;
        if ok {
            debug!(%contract, %sender, %amount, siblings = proof.len(), "whitelist check passed");
        } else {
            warn!(%contract, %sender, %amount, "sender not whitelisted for amount");
        }
        Ok(ok)
    }
}
