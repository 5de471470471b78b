// crates/kyc-chain/src/submitter.rs
//
// ChainSubmitter: turns a verdict into a signed status-update transaction and
// broadcasts it.
//
// Submissions from one signing account are serialized: the nonce read, the
// signature, and the broadcast happen under one lock, so two concurrent
// requests can never be handed the same pending nonce.

use async_trait::async_trait;
use tokio::sync::Mutex;

use kyc_core::{Address, ChainSubmission, KycError, Proof, VerdictSubmitter};

use crate::abi::{encode_update_call, function_selector, DEFAULT_FUNCTION_SIGNATURE};
use crate::rpc::ChainClient;
use crate::signer::LocalSigner;
use crate::transaction::LegacyTransaction;

/// Gas limit used when none is configured.
pub const DEFAULT_GAS_LIMIT: u64 = 300_000;

/// Contract call settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterConfig {
    pub contract: Address,
    pub function_signature: String,
    pub gas_limit: u64,
}

impl SubmitterConfig {
    pub fn new(contract: Address) -> Self {
        Self {
            contract,
            function_signature: DEFAULT_FUNCTION_SIGNATURE.to_string(),
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }
}

pub struct ChainSubmitter<C> {
    client: C,
    signer: LocalSigner,
    contract: Address,
    selector: [u8; 4],
    gas_limit: u64,
    lock: Mutex<()>,
}

impl<C: ChainClient> ChainSubmitter<C> {
    pub fn new(client: C, signer: LocalSigner, config: SubmitterConfig) -> Result<Self, KycError> {
        if config.gas_limit == 0 {
            return Err(KycError::Config("gas limit must be positive".to_string()));
        }
        let selector = function_selector(&config.function_signature)?;
        Ok(Self {
            client,
            signer,
            contract: config.contract,
            selector,
            gas_limit: config.gas_limit,
            lock: Mutex::new(()),
        })
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn endpoint(&self) -> String {
        self.client.endpoint()
    }
}

#[async_trait]
impl<C: ChainClient> VerdictSubmitter for ChainSubmitter<C> {
    async fn submit(
        &self,
        subject: &Address,
        verified: bool,
        risk_score: u8,
        proof: &Proof,
    ) -> Result<ChainSubmission, KycError> {
        let call_data = encode_update_call(self.selector, subject, verified, risk_score, &proof.digest);

        let _guard = self.lock.lock().await;

        let chain_id = self.client.chain_id().await?;
        let nonce = self.client.pending_nonce(&self.signer.address()).await?;
        let gas_price = self.client.gas_price().await?;

        let tx = LegacyTransaction {
            nonce,
            gas_price,
            gas_limit: self.gas_limit,
            to: self.contract,
            value: 0,
            data: call_data,
            chain_id,
        };
        let signed = tx.sign(&self.signer)?;

        let reported = self.client.send_raw_transaction(&signed.raw).await?;
        if reported != signed.hash {
            tracing::warn!(
                "Node reported tx hash {} but the signed transaction hashes to {}",
                reported,
                signed.hash
            );
        }

        tracing::info!(
            "Submitted KYC update for {}: nonce={}, chain_id={}, tx={}",
            subject,
            nonce,
            chain_id,
            signed.hash
        );

        Ok(ChainSubmission {
            chain_id,
            nonce,
            gas_price,
            gas_limit: self.gas_limit,
            value: 0,
            contract: self.contract,
            call_data: tx.data,
            signature: signed.signature,
            tx_hash: signed.hash,
        })
    }

    fn contract(&self) -> Address {
        self.contract
    }

    fn signer(&self) -> Address {
        self.signer.address()
    }
}
