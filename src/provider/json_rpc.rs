//! HTTP JSON-RPC implementation of [`Provider`] and [`Signer`].
//!
//! Signing is left to the node or wallet behind the endpoint
//! (`eth_sendTransaction`), the same way a browser wallet signs on behalf of
//! the dashboard.

use super::{Provider, Signer, TransactionReceipt, TransactionRequest};
use crate::{
    errors::ProviderError,
    primitives::{Address, TxHash},
};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use url::Url;

/// Interval between receipt polls while waiting for a transaction.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

pub struct JsonRpcProvider {
    url:           Url,
    client:        reqwest::Client,
    from:          Option<Address>,
    poll_interval: Duration,
    next_id:       AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error:  Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code:    i64,
    message: String,
    data:    Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcBlock {
    timestamp: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: TxHash,
    block_number:     String,
    status:           Option<String>,
}

/// Parse a `0x`-prefixed hex quantity.
fn parse_quantity(s: &str) -> Result<BigUint, ProviderError> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| ProviderError::Decode(format!("quantity '{}' lacks 0x prefix", s)))?;
    if digits.is_empty() {
        return Ok(BigUint::from(0u32));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| ProviderError::Decode(format!("invalid hex quantity '{}'", s)))
}

fn parse_u64_quantity(s: &str) -> Result<u64, ProviderError> {
    parse_quantity(s)?
        .to_u64()
        .ok_or_else(|| ProviderError::Decode(format!("quantity '{}' exceeds u64", s)))
}

fn parse_bytes(s: &str) -> Result<Vec<u8>, ProviderError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| ProviderError::Decode(format!("invalid hex data: {}", e)))
}

fn quantity(value: &BigUint) -> String { format!("0x{}", value.to_str_radix(16)) }

impl JsonRpcProvider {
    /// Connect to `url`. Transactions are sent from `from`, or from the first
    /// account the endpoint reports if none is given.
    pub fn new(url: Url, from: Option<Address>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().connect_timeout(timeout).timeout(timeout).build()?;
        Ok(JsonRpcProvider {
            url,
            client,
            from,
            poll_interval: DEFAULT_POLL_INTERVAL,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!("JSON-RPC request {} {} {}", id, method, params);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        let response: RpcResponse =
            self.client.post(self.url.clone()).json(&body).send().await?.json().await?;
        if let Some(err) = response.error {
            debug!("JSON-RPC {} failed with {}: {}", method, err.code, err.message);
            return Err(ProviderError::Rpc {
                code:    err.code,
                message: err.message,
                data:    err.data,
            });
        }
        serde_json::from_value(response.result)
            .map_err(|e| ProviderError::Decode(format!("{} result: {}", method, e)))
    }
}

#[async_trait::async_trait]
impl Provider for JsonRpcProvider {
    async fn call(&self, to: &Address, data: Vec<u8>) -> Result<Vec<u8>, ProviderError> {
        let call = json!({ "to": to.to_string(), "data": format!("0x{}", hex::encode(data)) });
        let result: String = self.request("eth_call", json!([call, "latest"])).await?;
        parse_bytes(&result)
    }

    async fn get_balance(&self, owner: &Address) -> Result<BigUint, ProviderError> {
        let result: String =
            self.request("eth_getBalance", json!([owner.to_string(), "latest"])).await?;
        parse_quantity(&result)
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        let result: String = self.request("eth_blockNumber", json!([])).await?;
        parse_u64_quantity(&result)
    }

    async fn block_timestamp(&self, number: u64) -> Result<u64, ProviderError> {
        let block: Option<RpcBlock> = self
            .request("eth_getBlockByNumber", json!([format!("0x{:x}", number), false]))
            .await?;
        let block = block.ok_or_else(|| ProviderError::Decode(format!("block {} not found", number)))?;
        parse_u64_quantity(&block.timestamp)
    }

    async fn gas_price(&self) -> Result<BigUint, ProviderError> {
        let result: String = self.request("eth_gasPrice", json!([])).await?;
        parse_quantity(&result)
    }
}

#[async_trait::async_trait]
impl Signer for JsonRpcProvider {
    async fn signer_address(&self) -> Result<Address, ProviderError> {
        if let Some(from) = self.from {
            return Ok(from);
        }
        let accounts: Vec<Address> = self.request("eth_accounts", json!([])).await?;
        accounts.into_iter().next().ok_or(ProviderError::NoSigner)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError> {
        let mut params = json!({
            "from": tx.from.to_string(),
            "to": tx.to.to_string(),
            "data": format!("0x{}", hex::encode(&tx.data)),
        });
        if let Some(gas_price) = &tx.gas_price {
            params["gasPrice"] = Value::String(quantity(gas_price));
        }
        self.request("eth_sendTransaction", json!([params])).await
    }

    async fn wait_for_transaction(
        &self,
        hash: &TxHash,
    ) -> Result<TransactionReceipt, ProviderError> {
        loop {
            let polled: Result<Option<RpcReceipt>, _> =
                self.request("eth_getTransactionReceipt", json!([hash.to_string()])).await;
            match polled {
                Ok(Some(receipt)) => {
                    if receipt.status.as_deref() == Some("0x0") {
                        return Err(ProviderError::Reverted(*hash));
                    }
                    return Ok(TransactionReceipt {
                        transaction_hash: receipt.transaction_hash,
                        block_number:     parse_u64_quantity(&receipt.block_number)?,
                    });
                }
                Ok(None) => trace!("Transaction {} not mined yet", hash),
                Err(e @ ProviderError::Rpc {
                    ..
                }) => return Err(e),
                // The transaction may still be mined; keep waiting.
                Err(e) => warn!("Polling the receipt of {} failed, retrying: {}", hash, e),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
