//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ConsoleConfig (validated, immutable)
//!     → handed to the provider, orchestrator and logging at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    ActionsConfig, BlockchainConfig, ConsoleConfig, NativeCurrencyConfig, ObservabilityConfig,
    WalletConfig,
};
