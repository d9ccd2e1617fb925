//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the console.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::wallet::PRIVATE_KEY_ENV_VAR;

/// Root configuration for the wallet console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Chain and RPC settings.
    pub blockchain: BlockchainConfig,

    /// Where the signing key comes from.
    pub wallet: WalletConfig,

    /// Fixed inputs of the demo actions.
    pub actions: ActionsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain integration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockchainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// Chain ID (e.g., 1 for Ethereum mainnet, 31337 for local Anvil).
    pub chain_id: u64,

    /// Human-readable chain name.
    pub chain_name: String,

    /// Native currency of the chain.
    pub native_currency: NativeCurrencyConfig,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Gas price multiplier (1.0 = estimated, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: 1,
            chain_name: "Ethereum".to_string(),
            native_currency: NativeCurrencyConfig::default(),
            rpc_timeout_secs: 10,
            gas_price_multiplier: 1.2,
            max_gas_price_gwei: 500,
        }
    }
}

/// Native currency descriptor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NativeCurrencyConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrencyConfig {
    fn default() -> Self {
        Self {
            name: "Ether".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex private key.
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: PRIVATE_KEY_ENV_VAR.to_string(),
        }
    }
}

/// Inputs of the sign and transfer actions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Payload signed by the sign action.
    pub sign_message: String,

    /// Amount sent by the transfer action, in whole native units.
    pub transfer_amount: String,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            sign_message: "Message".to_string(),
            transfer_amount: "1.00".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
