//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key) + BlockchainConfig (RPC URLs, chain)
//!     → wallet.rs (key loading, signing)
//!     → client.rs (read-only RPC with timeouts and failover)
//!     → transaction.rs (build, sign, broadcast)
//!     → facade.rs (session slot + ProviderFacade impl)
//!     → provider.rs (the trait the session and action layers depend on)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod facade;
pub mod provider;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use facade::WalletProvider;
pub use provider::ProviderFacade;
pub use types::{
    BlockchainConfig, BlockchainError, BlockchainResult, ChainId, ChainMetadata, NativeCurrency,
    Session, SessionEvent,
};
pub use wallet::Wallet;
