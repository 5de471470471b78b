// crates/kyc-chain/src/transaction.rs
//
// Legacy transaction with EIP-155 replay protection.
//
// signing payload = rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])
// raw             = rlp([nonce, gasPrice, gasLimit, to, value, data, v, r, s])
// v               = recovery_id + chainId * 2 + 35
// hash            = keccak256(raw)

use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{TransactionRequest, H160};
use ethers::utils::keccak256;

use kyc_core::{Address, ChainError, TxHash, TxSignature};

use crate::signer::LocalSigner;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: u128,
    pub data: Vec<u8>,
    pub chain_id: u64,
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub signature: TxSignature,
    pub raw: Vec<u8>,
    pub hash: TxHash,
}

impl LegacyTransaction {
    pub fn to_typed(&self) -> TypedTransaction {
        TransactionRequest::new()
            .nonce(self.nonce)
            .gas_price(self.gas_price)
            .gas(self.gas_limit)
            .to(H160::from(self.to))
            .value(self.value)
            .data(self.data.clone())
            .chain_id(self.chain_id)
            .into()
    }

    pub fn signing_payload(&self) -> Vec<u8> {
        self.to_typed().rlp().to_vec()
    }

    pub fn signing_hash(&self) -> [u8; 32] {
        self.to_typed().sighash().0
    }

    pub fn sign(&self, signer: &LocalSigner) -> Result<SignedTransaction, ChainError> {
        // v = chain_id * 2 + 35 + recovery id must fit in u64.
        self.chain_id
            .checked_mul(2)
            .and_then(|x| x.checked_add(36))
            .ok_or_else(|| ChainError::Signing(format!("chain id {} too large", self.chain_id)))?;

        let tx = self.to_typed();
        let signature = signer.sign_transaction(&tx)?;
        let raw = tx.rlp_signed(&signature).to_vec();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        signature.r.to_big_endian(&mut r);
        signature.s.to_big_endian(&mut s);

        Ok(SignedTransaction {
            signature: TxSignature { v: signature.v, r, s },
            hash: TxHash(keccak256(&raw)),
            raw,
        })
    }
}
