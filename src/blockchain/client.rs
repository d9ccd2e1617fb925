//! Read-only blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint
//! - Query chain state (chain id, balances, nonce, gas price)
//! - Submit signed transactions
//! - Serve the configured chain descriptor
//! - Verify personal-message signatures
//! - Handle timeouts and network errors gracefully

use alloy::consensus::TxEnvelope;
use alloy::primitives::{Address, Signature, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ChainMetadata, NativeCurrency,
};

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: BlockchainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// No request is issued here; an unreachable node surfaces on the first
    /// query instead.
    pub fn new(config: BlockchainConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        // 1. Add primary provider
        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as Arc<dyn Provider + Send + Sync>);

        // 2. Add failover providers
        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::debug!(
            rpc_url = %config.rpc_url,
            chain_id = config.chain_id,
            providers = providers.len(),
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<ChainId> {
        let chain_id = self.get_chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(chain_id)
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        let mut timed_out = true;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_chain_id();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(ChainId(result)),
                Ok(Err(e)) => {
                    timed_out = false;
                    tracing::warn!(provider_idx = i, error = %e, "RPC error, trying next provider");
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, "RPC timeout, trying next provider");
                }
            }
        }
        Err(self.exhausted(timed_out, "All RPC providers failed"))
    }

    /// Get the balance of an address.
    pub async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        let mut timed_out = true;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_balance(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    timed_out = false;
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                }
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted(timed_out, "All providers failed to get balance"))
    }

    /// Get the transaction count (nonce) for an address.
    pub async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        let mut timed_out = true;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_transaction_count(address);
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    timed_out = false;
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                }
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted(timed_out, "All providers failed to get transaction count"))
    }

    /// Get current gas price in wei.
    pub async fn get_gas_price(&self) -> BlockchainResult<u128> {
        let mut timed_out = true;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.get_gas_price();
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    timed_out = false;
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                }
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted(timed_out, "All providers failed to get gas price"))
    }

    /// Broadcast a signed transaction and return its hash.
    ///
    /// Resolves as soon as a node accepts the transaction.
    pub async fn send_envelope(&self, envelope: TxEnvelope) -> BlockchainResult<TxHash> {
        let mut timed_out = true;
        for (i, provider) in self.providers.iter().enumerate() {
            let fut = provider.send_tx_envelope(envelope.clone());
            match timeout(self.timeout_duration, fut).await {
                Ok(Ok(pending)) => return Ok(*pending.tx_hash()),
                Ok(Err(e)) => {
                    timed_out = false;
                    tracing::warn!(provider_idx = i, error = %e, "RPC error");
                }
                Err(_) => tracing::warn!(provider_idx = i, "RPC timeout"),
            }
        }
        Err(self.exhausted(timed_out, "All providers failed to send transaction"))
    }

    /// Descriptor of the configured chain.
    pub fn chain_metadata(&self) -> ChainMetadata {
        let currency = &self.config.native_currency;
        ChainMetadata {
            id: self.config.chain_id,
            name: self.config.chain_name.clone(),
            native_currency: NativeCurrency {
                name: currency.name.clone(),
                symbol: currency.symbol.clone(),
                decimals: currency.decimals,
            },
        }
    }

    /// Check an EIP-191 personal-message signature against `address`.
    ///
    /// A well-formed signature that recovers to another signer yields
    /// `Ok(false)`; undecodable signature bytes are an error.
    pub fn verify_message(
        &self,
        address: Address,
        message: &str,
        signature: &[u8],
    ) -> BlockchainResult<bool> {
        let signature = Signature::try_from(signature)
            .map_err(|e| BlockchainError::Signature(e.to_string()))?;

        match signature.recover_address_from_msg(message.as_bytes()) {
            Ok(recovered) => Ok(recovered == address),
            Err(e) => {
                tracing::debug!(error = %e, "Signature recovery failed");
                Ok(false)
            }
        }
    }

    /// Error for a request no provider answered. Only a round in which every
    /// provider timed out reports a timeout.
    fn exhausted(&self, timed_out: bool, context: &str) -> BlockchainError {
        if timed_out {
            BlockchainError::Timeout(self.config.rpc_timeout_secs)
        } else {
            BlockchainError::Rpc(context.to_string())
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
