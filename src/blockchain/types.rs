//! Chain-specific types and error definitions.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export BlockchainConfig from config module to avoid duplication
pub use crate::config::schema::BlockchainConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An active wallet session: the disclosed account and the chain it is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub account: Address,
    pub chain_id: ChainId,
}

/// Notification that the wallet session changed outside of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The wallet switched (or disclosed a different) account.
    AccountsChanged,
    /// The wallet moved to another chain.
    ChainChanged,
    /// The session was torn down by the wallet or by the user.
    Revoked,
}

/// Native currency descriptor of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Descriptor of the configured chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    pub id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid private key format, signing failure or missing account.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The signature bytes could not be decoded.
    #[error("Invalid signature: {0}")]
    Signature(String),

    /// Gas price exceeded maximum allowed.
    #[error("Gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// No wallet session is open.
    #[error("No active wallet session")]
    NoSession,
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(1u64);
        assert_eq!(chain_id.0, 1);
        assert_eq!(u64::from(chain_id), 1);
        assert_eq!(chain_id.to_string(), "1");
    }

    #[test]
    fn test_chain_metadata_serializes_camel_case() {
        let meta = ChainMetadata {
            id: 1,
            name: "Ethereum".to_string(),
            native_currency: NativeCurrency {
                name: "Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        };
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"name":"Ethereum","nativeCurrency":{"name":"Ether","symbol":"ETH","decimals":18}}"#
        );
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::GasPriceTooHigh {
            current_gwei: 600,
            max_gwei: 500,
        };
        assert!(err.to_string().contains("600"));
    }
}
