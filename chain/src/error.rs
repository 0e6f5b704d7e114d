use tally_types::{TxHash, TypeError};
use thiserror::Error;

/// Errors from the chain data source.
///
/// Every variant is a transport or resolution failure and is fatal to the
/// block being processed; an on-chain execution failure is *not* an error —
/// it is a [`crate::ReceiptStatus::Reverted`] receipt.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("chain request failed: {0}")]
    RequestFailed(String),

    #[error("malformed chain response: {0}")]
    InvalidResponse(String),

    #[error("chain RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("receipt for {0} not available after confirmation wait")]
    ReceiptTimeout(TxHash),
}

impl From<TypeError> for ChainError {
    fn from(e: TypeError) -> Self {
        ChainError::InvalidResponse(e.to_string())
    }
}
