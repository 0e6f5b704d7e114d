//! EVM JSON-RPC client over HTTP.

use crate::types::{ChainBlock, ChainTransaction, Receipt, ReceiptStatus};
use crate::{ChainError, ChainSource};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tally_types::{Address, Amount, TxHash};

/// Default timeout for a single RPC request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default interval between receipt polls while a transaction confirms.
const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default number of receipt polls before giving up.
const DEFAULT_RECEIPT_MAX_ATTEMPTS: u32 = 120;

/// JSON-RPC chain client.
///
/// Speaks `eth_blockNumber`, `eth_getBlockByNumber` (with full transaction
/// bodies) and `eth_getTransactionReceipt`. The access credential is
/// appended to the endpoint path, provider-style, and never logged.
pub struct HttpChainSource {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    url: String,
    receipt_poll_interval: Duration,
    receipt_max_attempts: u32,
}

impl HttpChainSource {
    /// Create a client for `endpoint`, authenticating with `api_key`.
    /// An empty key leaves the endpoint untouched.
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        let url = if api_key.is_empty() {
            endpoint.trim_end_matches('/').to_string()
        } else {
            format!("{}/{}", endpoint.trim_end_matches('/'), api_key)
        };
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http_client,
            url,
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            receipt_max_attempts: DEFAULT_RECEIPT_MAX_ATTEMPTS,
        }
    }

    /// Override the receipt polling cadence.
    pub fn with_receipt_polling(mut self, interval: Duration, max_attempts: u32) -> Self {
        self.receipt_poll_interval = interval;
        self.receipt_max_attempts = max_attempts;
        self
    }

    /// Issue one JSON-RPC call. A `null` result deserialises to `None`.
    async fn rpc<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, ChainError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http_client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChainError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ChainError::Unreachable(format!("connection failed: {e}"))
                } else {
                    ChainError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ChainError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let rpc_response: RpcResponse<T> = response.json().await.map_err(|e| {
            ChainError::InvalidResponse(format!("failed to parse RPC response: {e}"))
        })?;

        if let Some(err) = rpc_response.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(rpc_response.result)
    }
}

#[async_trait]
impl ChainSource for HttpChainSource {
    async fn tip_height(&self) -> Result<u64, ChainError> {
        let tip: String = self
            .rpc("eth_blockNumber", serde_json::json!([]))
            .await?
            .ok_or_else(|| ChainError::InvalidResponse("null tip height".into()))?;
        parse_hex_u64(&tip)
    }

    async fn block_with_transactions(
        &self,
        height: u64,
    ) -> Result<Option<ChainBlock>, ChainError> {
        let params = serde_json::json!([format!("0x{height:x}"), true]);
        let raw: Option<RawBlock> = self.rpc("eth_getBlockByNumber", params).await?;
        raw.map(RawBlock::into_block).transpose()
    }

    async fn transaction_receipt(&self, hash: &TxHash) -> Result<Receipt, ChainError> {
        // The source may lag the canonical chain; poll until the receipt is
        // indexed, bounded so a dropped transaction cannot wedge ingestion.
        for attempt in 0..self.receipt_max_attempts {
            let raw: Option<RawReceipt> = self
                .rpc(
                    "eth_getTransactionReceipt",
                    serde_json::json!([hash.to_string()]),
                )
                .await?;
            if let Some(raw) = raw {
                return raw.into_receipt();
            }
            tracing::trace!(tx = %hash, attempt, "receipt not yet available");
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
        Err(ChainError::ReceiptTimeout(*hash))
    }
}

// ── JSON-RPC wire shapes ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    number: String,
    timestamp: String,
    miner: String,
    gas_used: String,
    base_fee_per_gas: Option<String>,
    transactions: Vec<RawTransaction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    hash: String,
    block_number: String,
    from: Option<String>,
    to: Option<String>,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    gas_used: String,
    effective_gas_price: String,
    /// `0x1` success, `0x0` reverted. Absent on blocks predating the
    /// status field, which are treated as successful.
    status: Option<String>,
}

impl RawBlock {
    fn into_block(self) -> Result<ChainBlock, ChainError> {
        let transactions = self
            .transactions
            .into_iter()
            .map(RawTransaction::into_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ChainBlock {
            number: parse_hex_u64(&self.number)?,
            timestamp: parse_hex_u64(&self.timestamp)?,
            miner: Address::parse(&self.miner)?,
            gas_used: parse_hex_u64(&self.gas_used)?,
            base_fee_per_gas: self
                .base_fee_per_gas
                .as_deref()
                .map(Amount::from_hex)
                .transpose()?,
            transactions,
        })
    }
}

impl RawTransaction {
    fn into_transaction(self) -> Result<ChainTransaction, ChainError> {
        Ok(ChainTransaction {
            hash: TxHash::parse(&self.hash)?,
            block_number: parse_hex_u64(&self.block_number)?,
            from: self.from.as_deref().map(Address::parse).transpose()?,
            to: self.to.as_deref().map(Address::parse).transpose()?,
            value: Amount::from_hex(&self.value)?,
        })
    }
}

impl RawReceipt {
    fn into_receipt(self) -> Result<Receipt, ChainError> {
        let status = match self.status.as_deref() {
            Some(s) if parse_hex_u64(s)? == 0 => ReceiptStatus::Reverted,
            _ => ReceiptStatus::Succeeded,
        };
        Ok(Receipt {
            gas_used: parse_hex_u64(&self.gas_used)?,
            effective_gas_price: Amount::from_hex(&self.effective_gas_price)?,
            status,
        })
    }
}

/// Parse a `0x`-prefixed hex quantity into a `u64`.
fn parse_hex_u64(raw: &str) -> Result<u64, ChainError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|_| ChainError::InvalidResponse(format!("bad hex quantity: {raw}")))
}
