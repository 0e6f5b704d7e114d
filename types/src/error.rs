//! Parse errors for the fundamental types.

use thiserror::Error;

/// Errors raised when constructing typed values from untrusted input.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid hex quantity: {0}")]
    InvalidQuantity(String),
}
