//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, amounts > 0)
//! - Check URLs and log levels parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConsoleConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::actions::units::{parse_ether, NATIVE_DECIMALS};
use crate::config::schema::ConsoleConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ConsoleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let chain = &config.blockchain;

    if let Err(e) = chain.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new("blockchain.rpc_url", e.to_string()));
    }
    for url in &chain.failover_urls {
        if let Err(e) = url.parse::<url::Url>() {
            errors.push(ValidationError::new(
                "blockchain.failover_urls",
                format!("'{}': {}", url, e),
            ));
        }
    }
    if chain.chain_id == 0 {
        errors.push(ValidationError::new("blockchain.chain_id", "must be non-zero"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.native_currency.decimals != NATIVE_DECIMALS {
        errors.push(ValidationError::new(
            "blockchain.native_currency.decimals",
            format!("only {} decimals are supported", NATIVE_DECIMALS),
        ));
    }
    if !(chain.gas_price_multiplier >= 1.0) {
        errors.push(ValidationError::new(
            "blockchain.gas_price_multiplier",
            "must be >= 1.0",
        ));
    }

    if config.actions.sign_message.is_empty() {
        errors.push(ValidationError::new("actions.sign_message", "must not be empty"));
    }
    match parse_ether(&config.actions.transfer_amount) {
        Ok(amount) if amount.is_zero() => {
            errors.push(ValidationError::new("actions.transfer_amount", "must be > 0"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("actions.transfer_amount", e.to_string())),
    }

    if config.wallet.private_key_env.is_empty() {
        errors.push(ValidationError::new("wallet.private_key_env", "must not be empty"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ConsoleConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ConsoleConfig::default();
        config.blockchain.rpc_url = "nope".to_string();
        config.blockchain.chain_id = 0;
        config.actions.transfer_amount = "0".to_string();
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "blockchain.rpc_url",
                "blockchain.chain_id",
                "actions.transfer_amount",
                "observability.log_level",
            ]
        );
    }

    #[test]
    fn test_rejects_non_standard_decimals() {
        let mut config = ConsoleConfig::default();
        config.blockchain.native_currency.decimals = 6;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("18 decimals"));
    }

    #[test]
    fn test_rejects_unparseable_amount() {
        let mut config = ConsoleConfig::default();
        config.actions.transfer_amount = "one".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "actions.transfer_amount");
    }
}
