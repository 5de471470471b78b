// crates/kyc-core/src/crypto.rs

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of the given bytes.
///
/// Returns a 32-byte hash.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute the Keccak-256 hash used by EVM chains (not NIST SHA3-256).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    ethers_core::utils::keccak256(data)
}

/// Encode bytes as a `0x`-prefixed lowercase hex string.
pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
