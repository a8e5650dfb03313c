//! The connection to the chain.
//!
//! [`Provider`] covers the read-only surface every fetcher needs.
//! [`Signer`] adds transaction submission for the connected wallet. Both are
//! object-safe async traits, so flows can run against the JSON-RPC
//! implementation or against a test stub.

use crate::{
    errors::ProviderError,
    primitives::{Address, TxHash},
};
use num_bigint::BigUint;

mod json_rpc;

pub use json_rpc::JsonRpcProvider;

/// A state-changing contract call to be signed by the connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from:      Address,
    pub to:        Address,
    pub data:      Vec<u8>,
    pub gas_price: Option<BigUint>,
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number:     u64,
}

/// Read-only chain access.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Execute a read-only contract call against the latest block and return
    /// the raw return data.
    async fn call(&self, to: &Address, data: Vec<u8>) -> Result<Vec<u8>, ProviderError>;

    /// Native asset balance of `owner`, in the smallest unit.
    async fn get_balance(&self, owner: &Address) -> Result<BigUint, ProviderError>;

    /// Number of the latest block.
    async fn block_number(&self) -> Result<u64, ProviderError>;

    /// Timestamp (seconds since the epoch) of the given block.
    async fn block_timestamp(&self, number: u64) -> Result<u64, ProviderError>;

    /// Current gas price suggested by the node.
    async fn gas_price(&self) -> Result<BigUint, ProviderError>;
}

/// Transaction submission on behalf of the connected wallet.
#[async_trait::async_trait]
pub trait Signer: Provider {
    /// The account transactions are sent from.
    async fn signer_address(&self) -> Result<Address, ProviderError>;

    /// Submit a transaction and return its hash without waiting for it to be
    /// mined.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError>;

    /// Wait until the transaction is mined. There is no timeout. A reverted
    /// transaction is reported as [`ProviderError::Reverted`].
    async fn wait_for_transaction(&self, hash: &TxHash)
        -> Result<TransactionReceipt, ProviderError>;
}
