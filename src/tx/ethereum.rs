//! Ethereum authority: secp256k1 keys with EIP-155 replay-protected signatures

use super::authority::{AddressChecked, Authority};
use crate::error::{RelayerError, RelayerResult};

use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, Signature, H256};
use tracing::debug;

/// Gas ceiling used when a chain does not configure its own
pub const DEFAULT_GAS_LIMIT: u64 = 6_382_056;

/// Parse a decimal chain id
pub fn parse_chain_id(id: &str) -> RelayerResult<u64> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RelayerError::InvalidChainId(id.to_string()));
    }
    id.parse::<u64>()
        .map_err(|_| RelayerError::InvalidChainId(id.to_string()))
}

/// Signing authority for one EVM chain
pub struct EthereumAuthority {
    wallet: LocalWallet,
    chain_id: String,
    numeric_chain_id: u64,
    gas_limit: u64,
}

impl EthereumAuthority {
    pub fn new(wallet: LocalWallet, chain_id: &str) -> RelayerResult<Self> {
        let numeric_chain_id = parse_chain_id(chain_id)?;
        Ok(Self {
            wallet: wallet.with_chain_id(numeric_chain_id),
            chain_id: chain_id.to_string(),
            numeric_chain_id,
            gas_limit: DEFAULT_GAS_LIMIT,
        })
    }

    /// Build from a hex encoded private key, with or without `0x`
    pub fn from_private_key(key: &str, chain_id: &str) -> RelayerResult<Self> {
        let wallet = key
            .trim()
            .trim_start_matches("0x")
            .parse::<LocalWallet>()
            .map_err(|e| RelayerError::InvalidKey(e.to_string()))?;
        Self::new(wallet, chain_id)
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn numeric_chain_id(&self) -> u64 {
        self.numeric_chain_id
    }
}

impl std::fmt::Debug for EthereumAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EthereumAuthority")
            .field("address", &self.wallet.address())
            .field("chain_id", &self.chain_id)
            .field("gas_limit", &self.gas_limit)
            .finish()
    }
}

impl Authority for EthereumAuthority {
    type Address = Address;
    type UnsignedTx = TypedTransaction;
    type SignedTx = SignedTransaction;

    fn chain_id(&self) -> &str {
        &self.chain_id
    }

    fn address(&self) -> Address {
        self.wallet.address()
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn sign_unchecked(
        &self,
        tx: &TypedTransaction,
        _checked: AddressChecked,
    ) -> RelayerResult<SignedTransaction> {
        // EIP-155: the sighash commits to this chain id
        let mut tx = tx.clone();
        tx.set_chain_id(self.numeric_chain_id);

        let signature =
            self.wallet
                .sign_transaction_sync(&tx)
                .map_err(|e| RelayerError::Signing {
                    chain_id: self.chain_id.clone(),
                    message: e.to_string(),
                })?;

        debug!(
            "Chain {}: signed sighash {:?}",
            self.chain_id,
            tx.sighash()
        );
        Ok(SignedTransaction { tx, signature })
    }
}

/// A transaction together with its signature, ready for broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    tx: TypedTransaction,
    signature: Signature,
}

impl SignedTransaction {
    pub fn tx(&self) -> &TypedTransaction {
        &self.tx
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Digest the signature commits to
    pub fn sighash(&self) -> H256 {
        self.tx.sighash()
    }

    /// Raw signed encoding for `eth_sendRawTransaction`
    pub fn rlp(&self) -> Bytes {
        self.tx.rlp_signed(&self.signature)
    }

    pub fn hash(&self) -> H256 {
        self.tx.hash(&self.signature)
    }

    /// True if the signature recovers to `address`
    pub fn verify(&self, address: Address) -> bool {
        self.signature.verify(self.sighash(), address).is_ok()
    }
}
