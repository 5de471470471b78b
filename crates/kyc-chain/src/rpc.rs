// crates/kyc-chain/src/rpc.rs
//
// Chain node access. `ChainClient` is the seam the submitter talks to;
// `JsonRpcChainClient` implements it with an ethers HTTP provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::providers::{Http, Middleware, Provider, ProviderError};
use ethers::types::{BlockNumber, Bytes, H160, U256};

use kyc_core::{Address, ChainError, KycError, TxHash};

/// Upper bound on a single chain RPC call.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// The four node operations a submission needs.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Transaction count of `address`, including pending transactions.
    async fn pending_nonce(&self, address: &Address) -> Result<u64, ChainError>;

    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Broadcast a signed transaction. Returns the hash the node reports.
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, ChainError>;

    /// Human-readable endpoint description for health output.
    fn endpoint(&self) -> String;
}

#[async_trait]
impl<C: ChainClient + ?Sized> ChainClient for Arc<C> {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        (**self).chain_id().await
    }

    async fn pending_nonce(&self, address: &Address) -> Result<u64, ChainError> {
        (**self).pending_nonce(address).await
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        (**self).gas_price().await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, ChainError> {
        (**self).send_raw_transaction(raw).await
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}

/// JSON-RPC client for an EVM node.
#[derive(Debug)]
pub struct JsonRpcChainClient {
    url: String,
    provider: Provider<Http>,
    timeout: Duration,
}

impl JsonRpcChainClient {
    pub fn new(url: &str) -> Result<Self, KycError> {
        Self::with_timeout(url, DEFAULT_RPC_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, KycError> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| KycError::Config(format!("invalid chain RPC url {}: {}", url, e)))?;
        Ok(Self {
            url: url.to_string(),
            provider,
            timeout,
        })
    }

    /// Await one provider call. Transport, node and timeout failures are all
    /// reported through `wrap`, so each operation surfaces as its own
    /// `ChainError` variant.
    async fn call<T, F>(
        &self,
        method: &str,
        wrap: fn(String) -> ChainError,
        request: F,
    ) -> Result<T, ChainError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        tracing::debug!("Chain RPC {}", method);
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(wrap(format!("{} failed: {}", method, e))),
            Err(_) => Err(wrap(format!("{} timed out after {:?}", method, self.timeout))),
        }
    }
}

fn to_u64(method: &str, value: U256) -> Result<u64, ChainError> {
    if value.bits() > 64 {
        return Err(ChainError::MalformedResponse(format!(
            "{}: quantity {} exceeds u64",
            method, value
        )));
    }
    Ok(value.low_u64())
}

fn to_u128(method: &str, value: U256) -> Result<u128, ChainError> {
    if value.bits() > 128 {
        return Err(ChainError::MalformedResponse(format!(
            "{}: quantity {} exceeds u128",
            method, value
        )));
    }
    Ok(value.as_u128())
}

#[async_trait]
impl ChainClient for JsonRpcChainClient {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        let id = self
            .call("eth_chainId", ChainError::ChainId, self.provider.get_chainid())
            .await?;
        to_u64("eth_chainId", id)
    }

    async fn pending_nonce(&self, address: &Address) -> Result<u64, ChainError> {
        let count = self
            .call(
                "eth_getTransactionCount",
                ChainError::Nonce,
                self.provider
                    .get_transaction_count(H160::from(*address), Some(BlockNumber::Pending.into())),
            )
            .await?;
        to_u64("eth_getTransactionCount", count)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        let price = self
            .call("eth_gasPrice", ChainError::GasPrice, self.provider.get_gas_price())
            .await?;
        to_u128("eth_gasPrice", price)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, ChainError> {
        let pending = self
            .call(
                "eth_sendRawTransaction",
                ChainError::Broadcast,
                self.provider.send_raw_transaction(Bytes::from(raw.to_vec())),
            )
            .await?;
        Ok(TxHash(pending.tx_hash().0))
    }

    fn endpoint(&self) -> String {
        self.url.clone()
    }
}
