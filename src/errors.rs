//! Error types shared by the fetchers and transaction flows.

use crate::{amount::AmountError, network::Network, primitives::TxHash};

/// Failures reported by the connection to the chain.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A JSON-RPC error object returned by the node or wallet.
    #[error("JSON-RPC error {code}: {message}")]
    Rpc {
        code:    i64,
        message: String,
        data:    Option<serde_json::Value>,
    },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Transaction {0} reverted")]
    Reverted(TxHash),
    #[error("No signing account is available on the connection")]
    NoSigner,
}

/// Errors of the dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    Amount(#[from] AmountError),
    #[error("Contract '{0}' is not configured for this network")]
    ContractNotConfigured(&'static str),
    #[error("Bond '{bond}' is not available on {network}")]
    BondUnavailable {
        bond:    String,
        network: Network,
    },
}

pub type ClientResult<T> = Result<T, ClientError>;
