//! alloy-backed [`ProviderFacade`].
//!
//! Combines the read-only [`BlockchainClient`] with a local [`Wallet`] and a
//! session slot. The session opens once the node confirms it serves the
//! configured chain.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::broadcast;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::provider::ProviderFacade;
use crate::blockchain::transaction::TxBuilder;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, ChainMetadata, Session, SessionEvent,
};
use crate::blockchain::wallet::Wallet;

const SESSION_EVENT_CAPACITY: usize = 16;

pub struct WalletProvider {
    client: BlockchainClient,
    wallet: Wallet,
    session: Mutex<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl WalletProvider {
    pub fn new(client: BlockchainClient, wallet: Wallet) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            client,
            wallet,
            session: Mutex::new(None),
            events,
        }
    }

    fn session(&self) -> Option<Session> {
        match self.session.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_session(&self, session: Option<Session>) {
        match self.session.lock() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    fn active_session(&self) -> BlockchainResult<Session> {
        self.session().ok_or(BlockchainError::NoSession)
    }

    fn require_account(&self, account: Address) -> BlockchainResult<()> {
        let session = self.active_session()?;
        if session.account != account {
            return Err(BlockchainError::Wallet(format!(
                "Account {} is not controlled by this wallet",
                account
            )));
        }
        Ok(())
    }

    /// Store a new session and announce what changed relative to the old one.
    fn open_session(&self, session: Session) {
        let previous = self.session();
        self.set_session(Some(session));
        tracing::info!(account = %session.account, chain_id = %session.chain_id, "Wallet session opened");

        if previous.map(|p| p.account) != Some(session.account) {
            let _ = self.events.send(SessionEvent::AccountsChanged);
        }
        if previous.map(|p| p.chain_id) != Some(session.chain_id) {
            let _ = self.events.send(SessionEvent::ChainChanged);
        }
    }

    /// Drop the session as if the wallet revoked it, and notify listeners.
    pub fn revoke(&self) {
        self.set_session(None);
        tracing::info!("Wallet session revoked");
        let _ = self.events.send(SessionEvent::Revoked);
    }
}

#[async_trait]
impl ProviderFacade for WalletProvider {
    async fn connect(&self) -> BlockchainResult<Session> {
        let chain_id = self.client.verify_chain_id().await?;
        let session = Session {
            account: self.wallet.address(),
            chain_id,
        };
        self.open_session(session);
        Ok(session)
    }

    async fn disconnect(&self) -> BlockchainResult<()> {
        let had_session = self.session().is_some();
        self.set_session(None);
        tracing::info!("Wallet session closed");
        if had_session {
            // No accounts are disclosed any more.
            let _ = self.events.send(SessionEvent::AccountsChanged);
        }
        Ok(())
    }

    async fn current_session(&self) -> BlockchainResult<Option<Session>> {
        Ok(self.session())
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.active_session()?;
        self.client.get_chain_id().await
    }

    async fn get_addresses(&self) -> BlockchainResult<Vec<Address>> {
        Ok(self.session().map(|s| s.account).into_iter().collect())
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.client.get_balance(address).await
    }

    async fn get_chain_metadata(&self) -> BlockchainResult<ChainMetadata> {
        Ok(self.client.chain_metadata())
    }

    async fn sign_message(&self, message: &str, account: Address) -> BlockchainResult<Bytes> {
        self.require_account(account)?;
        let signature = self.wallet.sign_message(message.as_bytes()).await?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }

    async fn verify_message(
        &self,
        address: Address,
        message: &str,
        signature: &Bytes,
    ) -> BlockchainResult<bool> {
        self.client.verify_message(address, message, signature)
    }

    async fn send_transaction(
        &self,
        to: Address,
        value: U256,
        account: Address,
    ) -> BlockchainResult<TxHash> {
        self.require_account(account)?;
        TxBuilder::new(&self.client, &self.wallet)
            .send_transfer(to, value)
            .await
    }

    fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::BlockchainConfig;

    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn provider() -> WalletProvider {
        let config = BlockchainConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            rpc_timeout_secs: 1,
            ..BlockchainConfig::default()
        };
        let client = BlockchainClient::new(config).unwrap();
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY, 1).unwrap();
        WalletProvider::new(client, wallet)
    }

    #[tokio::test]
    async fn test_no_session_before_connect() {
        let provider = provider();
        assert_eq!(provider.current_session().await.unwrap(), None);
        assert!(provider.get_addresses().await.unwrap().is_empty());
        assert!(matches!(
            provider.get_chain_id().await,
            Err(BlockchainError::NoSession)
        ));
    }

    #[tokio::test]
    async fn test_connect_fails_when_node_unreachable() {
        let provider = provider();
        assert!(provider.connect().await.is_err());
        assert_eq!(provider.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_revoke_notifies_listeners() {
        let provider = provider();
        let mut events = provider.session_events();
        provider.revoke();
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Revoked);
    }

    #[tokio::test]
    async fn test_open_session_announces_account_and_chain() {
        let provider = provider();
        let mut events = provider.session_events();
        let account = provider.wallet.address();

        provider.open_session(Session {
            account,
            chain_id: ChainId(1),
        });
        assert_eq!(events.recv().await.unwrap(), SessionEvent::AccountsChanged);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::ChainChanged);
        assert_eq!(provider.get_addresses().await.unwrap(), vec![account]);

        provider.open_session(Session {
            account,
            chain_id: ChainId(5),
        });
        assert_eq!(events.recv().await.unwrap(), SessionEvent::ChainChanged);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_announces_empty_accounts() {
        let provider = provider();
        let mut events = provider.session_events();

        provider.disconnect().await.unwrap();
        assert!(events.try_recv().is_err(), "nothing to close, nothing to announce");

        provider.open_session(Session {
            account: provider.wallet.address(),
            chain_id: ChainId(1),
        });
        while events.try_recv().is_ok() {}

        provider.disconnect().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), SessionEvent::AccountsChanged);
        assert_eq!(provider.current_session().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_chain_metadata_without_session() {
        let provider = provider();
        let meta = provider.get_chain_metadata().await.unwrap();
        assert_eq!(meta.id, 1);
    }
}
