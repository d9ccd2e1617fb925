//! Local signing wallet.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Default environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "WALLET_CONSOLE_PRIVATE_KEY";

/// Wallet for message and transaction signing with nonce management.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Next nonce for sequential transactions.
    nonce: Arc<AtomicU64>,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;
        let signer = signer.with_chain_id(Some(chain_id));

        tracing::info!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Ok(Self {
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
            chain_id,
        })
    }

    /// Load wallet from the named environment variable.
    pub fn from_env(var: &str, chain_id: u64) -> BlockchainResult<Self> {
        let private_key = std::env::var(var).map_err(|_| {
            BlockchainError::Wallet(format!("Environment variable {} not set", var))
        })?;

        Self::from_private_key(&private_key, chain_id)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet is configured for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Get and increment the nonce atomically.
    pub fn get_and_increment_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Set the nonce to a specific value (e.g., after querying from chain).
    pub fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::SeqCst);
    }

    /// Sign arbitrary message bytes (with Ethereum prefix).
    pub async fn sign_message(&self, message: &[u8]) -> BlockchainResult<alloy::signers::Signature> {
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Message signing failed: {}", e)))
    }

    /// Network wallet used to sign transaction envelopes.
    pub fn network_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

/// Generate a fresh address nobody has used before.
///
/// The key behind it is discarded immediately.
pub fn random_recipient() -> Address {
    PrivateKeySigner::random().address()
}
