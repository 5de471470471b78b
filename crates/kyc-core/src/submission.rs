// crates/kyc-core/src/submission.rs
//
// Proof digests and on-chain submission records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::crypto::to_hex_prefixed;

/// A 32-byte freshness proof binding subject, verdict, score, and time.
///
/// The digest includes the timestamp, so it can only be recomputed by someone
/// who knows the exact second it was generated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    #[serde(with = "hex_bytes32")]
    pub digest: [u8; 32],
    /// Unix seconds mixed into the digest.
    pub timestamp: i64,
}

impl Proof {
    pub fn to_hex(&self) -> String {
        to_hex_prefixed(&self.digest)
    }
}

/// Hash of a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash(#[serde(with = "hex_bytes32")] pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_hex_prefixed(&self.0))
    }
}

/// EIP-155 signature components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub v: u64,
    #[serde(with = "hex_bytes32")]
    pub r: [u8; 32],
    #[serde(with = "hex_bytes32")]
    pub s: [u8; 32],
}

/// Everything that went into one accepted on-chain update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSubmission {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    /// Always zero: the update transfers no value.
    pub value: u128,
    pub contract: Address,
    #[serde(with = "hex_vec")]
    pub call_data: Vec<u8>,
    pub signature: TxSignature,
    pub tx_hash: TxHash,
}

mod hex_bytes32 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        raw.try_into()
            .map_err(|_| serde::de::Error::custom("expected 32 bytes"))
    }
}

mod hex_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
