// crates/kyc-chain/src/signer.rs
//
// secp256k1 signing account of the oracle.

use std::fmt;

use ethers::signers::{LocalWallet, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::Signature;

use kyc_core::{Address, ChainError};

/// The oracle's signing key plus its derived chain address.
#[derive(Clone)]
pub struct LocalSigner {
    wallet: LocalWallet,
    address: Address,
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl LocalSigner {
    /// Parse a 32-byte hex private key, `0x` prefix optional.
    pub fn from_hex(key_hex: &str) -> Result<Self, ChainError> {
        let trimmed = key_hex.trim();
        let trimmed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(trimmed)
            .map_err(|e| ChainError::InvalidKey(format!("not hex: {}", e)))?;
        if bytes.len() != 32 {
            return Err(ChainError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let wallet = LocalWallet::from_bytes(&bytes)
            .map_err(|_| ChainError::InvalidKey("not a valid secp256k1 scalar".to_string()))?;
        Ok(Self::from_wallet(wallet))
    }

    pub fn from_wallet(wallet: LocalWallet) -> Self {
        let address = Address::from(wallet.address());
        Self { wallet, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a legacy transaction. `v` carries the EIP-155 chain id of `tx`.
    pub fn sign_transaction(&self, tx: &TypedTransaction) -> Result<Signature, ChainError> {
        self.wallet
            .sign_transaction_sync(tx)
            .map_err(|e| ChainError::Signing(e.to_string()))
    }
}
