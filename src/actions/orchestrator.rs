//! Action orchestrator.
//!
//! Runs one action at a time against the provider, writing progress into the
//! status log as each provider call returns. Provider calls inside an action
//! are strictly sequential.

use alloy::primitives::{hex, Address, U256};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::actions::guard::InFlightGuard;
use crate::actions::types::{ActionError, ActionOutcome, ActionRequest};
use crate::actions::units::{self, format_ether, AmountError};
use crate::blockchain::provider::ProviderFacade;
use crate::blockchain::types::BlockchainError;
use crate::blockchain::wallet::random_recipient;
use crate::config::ActionsConfig;
use crate::console::StatusSink;
use crate::session::ConnectionState;

/// Fixed inputs of the sign and transfer actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSettings {
    pub sign_message: String,
    /// Transfer value in wei.
    pub transfer_amount: U256,
}

impl ActionSettings {
    pub fn from_config(config: &ActionsConfig) -> Result<Self, AmountError> {
        Ok(Self {
            sign_message: config.sign_message.clone(),
            transfer_amount: units::parse_ether(&config.transfer_amount)?,
        })
    }
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            sign_message: "Message".to_string(),
            transfer_amount: U256::from(units::WEI_PER_ETHER),
        }
    }
}

pub struct ActionOrchestrator {
    provider: Arc<dyn ProviderFacade>,
    connection: watch::Receiver<ConnectionState>,
    sink: Arc<dyn StatusSink>,
    settings: ActionSettings,
    guard: InFlightGuard,
}

impl ActionOrchestrator {
    pub fn new(
        provider: Arc<dyn ProviderFacade>,
        connection: watch::Receiver<ConnectionState>,
        sink: Arc<dyn StatusSink>,
        settings: ActionSettings,
    ) -> Self {
        Self {
            provider,
            connection,
            sink,
            settings,
            guard: InFlightGuard::new(),
        }
    }

    /// Whether an action is currently running.
    pub fn is_busy(&self) -> bool {
        self.guard.is_held()
    }

    /// Run `action` to completion.
    ///
    /// Rejected immediately, without touching the provider or the log, when
    /// another action holds the guard.
    pub async fn execute(&self, action: ActionRequest) -> ActionOutcome {
        let Some(_permit) = self.guard.try_acquire() else {
            tracing::debug!(%action, "Rejected: another action is running");
            return ActionOutcome::from(Err(ActionError::InProgress));
        };

        let span = tracing::info_span!("action", kind = %action, run_id = %Uuid::new_v4());
        async {
            let result = self.dispatch(action).await;
            match &result {
                Ok(lines) => {
                    tracing::info!(lines = lines.len(), "Action completed");
                    self.sink.finish();
                }
                Err(ActionError::InProgress) => {}
                Err(ActionError::NotConnected) => {
                    tracing::info!("Action needs a connected wallet");
                    self.sink.show_error();
                }
                Err(e @ (ActionError::Provider(_) | ActionError::Encode(_))) => {
                    tracing::error!(error = ?e, "Action failed");
                    self.sink.show_error();
                }
            }
            ActionOutcome::from(result)
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, action: ActionRequest) -> Result<Vec<String>, ActionError> {
        let connected = self.connection.borrow().is_connected();
        if action.requires_connection() && !connected {
            return Err(ActionError::NotConnected);
        }

        self.sink.reset();
        match action {
            ActionRequest::GetChainId => self.get_chain_id().await,
            ActionRequest::GetBalance => self.get_balance().await,
            ActionRequest::GetNetwork => self.get_network().await,
            ActionRequest::SignMessage => self.sign_message().await,
            ActionRequest::SendNativeTransfer => self.send_native_transfer().await,
        }
    }

    async fn get_chain_id(&self) -> Result<Vec<String>, ActionError> {
        let mut lines = Vec::new();
        let chain_id = self.provider.get_chain_id().await?;
        self.emit(&mut lines, format!("chainId: {}", chain_id));
        Ok(lines)
    }

    async fn get_balance(&self) -> Result<Vec<String>, ActionError> {
        let mut lines = Vec::new();
        let account = self.active_account().await?;
        let balance = self.provider.get_balance(account).await?;
        self.emit(&mut lines, format!("balance: {}", format_ether(balance)));
        Ok(lines)
    }

    async fn get_network(&self) -> Result<Vec<String>, ActionError> {
        let mut lines = Vec::new();
        let network = self.provider.get_chain_metadata().await?;
        let encoded = serde_json::to_string(&network)?;
        self.emit(&mut lines, format!("network: {}", encoded));
        Ok(lines)
    }

    async fn sign_message(&self) -> Result<Vec<String>, ActionError> {
        let mut lines = Vec::new();
        let message = self.settings.sign_message.as_str();
        let account = self.active_account().await?;

        let signature = self.provider.sign_message(message, account).await?;
        self.emit(&mut lines, format!("signature: {}", hex::encode_prefixed(&signature)));

        let valid = self
            .provider
            .verify_message(account, message, &signature)
            .await?;
        // The verdict goes under the signature, not over it.
        let verdict = format!("isValid? {}", valid);
        self.sink.append(&verdict);
        lines.push(verdict);
        Ok(lines)
    }

    /// Send the configured amount to a throwaway address and show its balance
    /// around the transfer. The "after" read does not wait for inclusion and
    /// may still show the old balance.
    async fn send_native_transfer(&self) -> Result<Vec<String>, ActionError> {
        let mut lines = Vec::new();

        let chain_id = self.provider.get_chain_id().await?;
        self.emit(&mut lines, format!("Transfer txn on {}", chain_id));

        let to = random_recipient();
        let before = self.provider.get_balance(to).await?;
        self.emit(&mut lines, format!("balance of {}, before: {}", to, before));

        let account = self.active_account().await?;
        let tx_hash = self
            .provider
            .send_transaction(to, self.settings.transfer_amount, account)
            .await?;
        tracing::info!(tx_hash = %tx_hash, to = %to, "Transfer submitted");

        let after = self.provider.get_balance(to).await?;
        self.emit(&mut lines, format!("balance of {}, after: {}", to, after));
        Ok(lines)
    }

    async fn active_account(&self) -> Result<Address, ActionError> {
        let addresses = self.provider.get_addresses().await?;
        addresses.first().copied().ok_or_else(|| {
            ActionError::Provider(BlockchainError::Wallet(
                "wallet disclosed no accounts".to_string(),
            ))
        })
    }

    /// Record a line and make it the log's content.
    fn emit(&self, lines: &mut Vec<String>, line: String) {
        self.sink.replace(&line);
        lines.push(line);
    }
}
