//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ConsoleConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ConsoleConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ConsoleConfig, ConfigError> {
    let config: ConsoleConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load from `path` when given, otherwise validate and use the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<ConsoleConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = ConsoleConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let config = parse_config("[blockchain]\nchain_id = 5\n").unwrap();
        assert_eq!(config.blockchain.chain_id, 5);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[blockchain\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = parse_config("[blockchain]\nchain_id = 0\nrpc_timeout_secs = 0\n").unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Validation failed: "));
        assert!(text.contains("blockchain.chain_id"));
        assert!(text.contains("blockchain.rpc_timeout_secs"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/wallet-console.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_defaults_when_no_path() {
        let config = load_or_default(None).unwrap();
        assert_eq!(config.blockchain.chain_id, 1);
    }
}
