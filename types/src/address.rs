//! Account address type, canonicalised to lower-case `0x` hex.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An account address, always stored as `0x` followed by 40 lower-case hex
/// characters.
///
/// Every address entering the system — from the chain source or from
/// configuration — is normalised through [`Address::parse`], so two spellings
/// of the same address can never produce two ledger rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all addresses.
    pub const PREFIX: &'static str = "0x";

    /// Parse and normalise an address from a raw string.
    ///
    /// Accepts mixed-case input (checksummed or not) and stores the
    /// lower-case form. Rejects anything that is not `0x` + 40 hex digits.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let lower = raw.trim().to_ascii_lowercase();
        let digits = lower
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| TypeError::InvalidAddress(raw.to_string()))?;
        if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidAddress(raw.to_string()));
        }
        Ok(Self(lower))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
