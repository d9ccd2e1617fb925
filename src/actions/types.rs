//! Action requests, outcomes and errors.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::blockchain::types::BlockchainError;

/// The fixed menu of actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionRequest {
    GetChainId,
    GetBalance,
    GetNetwork,
    SignMessage,
    SendNativeTransfer,
}

impl ActionRequest {
    pub const ALL: [ActionRequest; 5] = [
        ActionRequest::GetChainId,
        ActionRequest::GetBalance,
        ActionRequest::GetNetwork,
        ActionRequest::SignMessage,
        ActionRequest::SendNativeTransfer,
    ];

    /// Whether the action needs an open wallet session.
    ///
    /// Only the network descriptor is readable without one.
    pub fn requires_connection(self) -> bool {
        !matches!(self, ActionRequest::GetNetwork)
    }

    /// Short name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ActionRequest::GetChainId => "chain-id",
            ActionRequest::GetBalance => "balance",
            ActionRequest::GetNetwork => "network",
            ActionRequest::SignMessage => "sign",
            ActionRequest::SendNativeTransfer => "send",
        }
    }
}

impl fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown action '{0}' (expected chain-id, balance, network, sign or send)")]
pub struct ParseActionError(String);

impl FromStr for ActionRequest {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionRequest::ALL
            .into_iter()
            .find(|action| action.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

/// Why an action did not complete.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("action already in progress")]
    InProgress,

    /// Detail stays in diagnostics; users only see the generic text.
    #[error("An error occurred")]
    Provider(#[from] BlockchainError),

    #[error("An error occurred")]
    Encode(#[from] serde_json::Error),
}

/// Result of one `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Success { lines: Vec<String> },
    Failure { reason: String },
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionOutcome::Success { .. })
    }

    pub fn lines(&self) -> &[String] {
        match self {
            ActionOutcome::Success { lines } => lines,
            ActionOutcome::Failure { .. } => &[],
        }
    }
}

impl From<Result<Vec<String>, ActionError>> for ActionOutcome {
    fn from(result: Result<Vec<String>, ActionError>) -> Self {
        match result {
            Ok(lines) => ActionOutcome::Success { lines },
            Err(e) => ActionOutcome::Failure {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for action in ActionRequest::ALL {
            assert_eq!(action.name().parse::<ActionRequest>().unwrap(), action);
        }
        assert_eq!("SIGN".parse::<ActionRequest>().unwrap(), ActionRequest::SignMessage);
        assert!("mint".parse::<ActionRequest>().is_err());
    }

    #[test]
    fn test_only_network_runs_disconnected() {
        let free: Vec<_> = ActionRequest::ALL
            .into_iter()
            .filter(|a| !a.requires_connection())
            .collect();
        assert_eq!(free, vec![ActionRequest::GetNetwork]);
    }

    #[test]
    fn test_provider_error_is_generic() {
        let err = ActionError::from(BlockchainError::Rpc("node exploded".to_string()));
        assert_eq!(err.to_string(), "An error occurred");
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome = ActionOutcome::from(Err(ActionError::NotConnected));
        assert_eq!(
            outcome,
            ActionOutcome::Failure {
                reason: "wallet not connected".to_string()
            }
        );
        assert!(outcome.lines().is_empty());
    }
}
