//! Monetary amounts and balances.
//!
//! Amounts are signed arbitrary-precision integers denominated in the chain's
//! smallest unit, so every balance, fee, and reward computation is exact.
//! Floating point is never used; derived balances may legitimately go
//! negative (an address first observed as a sender has no recorded inflows).

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use std::str::FromStr;

use crate::TypeError;

/// Number of decimal places between the chain's display unit and its
/// smallest unit.
pub const UNIT_DECIMALS: u32 = 18;

/// A signed amount in the chain's smallest unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(BigInt);

impl Amount {
    pub fn zero() -> Self {
        Self(BigInt::from(0))
    }

    pub fn new(raw: BigInt) -> Self {
        Self(raw)
    }

    /// An amount of `units` whole coins, shifted into the smallest unit.
    pub fn from_units(units: u64) -> Self {
        Self(BigInt::from(units) * BigInt::from(10u64).pow(UNIT_DECIMALS))
    }

    /// Parse a non-negative `0x`-prefixed hex quantity, as chain sources
    /// encode balances and gas prices on the wire.
    pub fn from_hex(raw: &str) -> Result<Self, TypeError> {
        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidQuantity(raw.to_string()));
        }
        BigInt::parse_bytes(digits.as_bytes(), 16)
            .map(Self)
            .ok_or_else(|| TypeError::InvalidQuantity(raw.to_string()))
    }

    pub fn raw(&self) -> &BigInt {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigInt::from(0)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < BigInt::from(0)
    }
}

impl From<u64> for Amount {
    fn from(raw: u64) -> Self {
        Self(BigInt::from(raw))
    }
}

impl From<i64> for Amount {
    fn from(raw: i64) -> Self {
        Self(BigInt::from(raw))
    }
}

impl Add for Amount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Add<&Amount> for &Amount {
    type Output = Amount;
    fn add(self, rhs: &Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        self.0 += &rhs.0;
    }
}

impl Sub for Amount {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Sub<&Amount> for &Amount {
    type Output = Amount;
    fn sub(self, rhs: &Amount) -> Amount {
        Amount(&self.0 - &rhs.0)
    }
}

impl Mul<u64> for &Amount {
    type Output = Amount;
    fn mul(self, rhs: u64) -> Amount {
        Amount(&self.0 * BigInt::from(rhs))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |acc, x| acc + x)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    /// Parse a decimal string, e.g. `"100"` or `"-102"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigInt::from_str(s.trim())
            .map(Self)
            .map_err(|_| TypeError::InvalidAmount(s.to_string()))
    }
}
