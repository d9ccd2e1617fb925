//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the RPC client and load the wallet key
//! - Wire provider, status log, connection manager and orchestrator together
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No RPC traffic until the user connects

use std::sync::Arc;
use thiserror::Error;

use crate::actions::units::AmountError;
use crate::actions::{ActionOrchestrator, ActionSettings};
use crate::blockchain::{BlockchainClient, BlockchainError, Wallet, WalletProvider};
use crate::config::ConsoleConfig;
use crate::console::ConsoleLog;
use crate::session::ConnectionManager;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Blockchain(#[from] BlockchainError),

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Every long-lived component of a console session.
pub struct App {
    pub provider: Arc<WalletProvider>,
    pub log: Arc<ConsoleLog>,
    pub connection: Arc<ConnectionManager>,
    pub actions: Arc<ActionOrchestrator>,
}

/// Build the components from configuration.
pub fn build_app(config: &ConsoleConfig) -> Result<App, StartupError> {
    let client = BlockchainClient::new(config.blockchain.clone())?;
    let wallet = Wallet::from_env(&config.wallet.private_key_env, config.blockchain.chain_id)?;
    let settings = ActionSettings::from_config(&config.actions)?;

    let provider = Arc::new(WalletProvider::new(client, wallet));
    let log = Arc::new(ConsoleLog::new());
    let connection = Arc::new(ConnectionManager::new(provider.clone(), log.clone()));
    let actions = Arc::new(ActionOrchestrator::new(
        provider.clone(),
        connection.subscribe(),
        log.clone(),
        settings,
    ));

    tracing::info!(
        rpc_url = %config.blockchain.rpc_url,
        chain_id = config.blockchain.chain_id,
        "Console ready"
    );

    Ok(App {
        provider,
        log,
        connection,
        actions,
    })
}
