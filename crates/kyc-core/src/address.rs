// crates/kyc-core/src/address.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use ethers_core::types::H160;

use crate::error::KycError;

/// A 20-byte EVM chain address.
///
/// Parsing accepts an optional `0x` prefix followed by exactly 40 hex digits
/// in any case. Mixed-case input is not checksum-validated. Display is
/// lowercase `0x`-prefixed; [`Address::to_checksum`] gives the EIP-55 form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// Whether `s` is a syntactically valid hex address.
    pub fn is_valid(s: &str) -> bool {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit())
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        ethers_core::utils::to_checksum(&H160::from(*self), None)
    }
}

impl From<H160> for Address {
    fn from(value: H160) -> Self {
        Address(value.0)
    }
}

impl From<Address> for H160 {
    fn from(value: Address) -> Self {
        H160(value.0)
    }
}

impl FromStr for Address {
    type Err = KycError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Address::is_valid(s) {
            return Err(KycError::InvalidInput(format!(
                "invalid chain address: {:?}",
                s
            )));
        }
        let digits = &s[s.len() - 40..];
        let bytes = hex::decode(digits)
            .map_err(|e| KycError::InvalidInput(format!("invalid chain address: {}", e)))?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
