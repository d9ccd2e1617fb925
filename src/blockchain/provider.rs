//! Provider facade consumed by the session and action layers.
//!
//! Two halves sit behind one trait: read-only chain queries (chain metadata,
//! balances, signature verification) and the wallet side (session, address
//! disclosure, signing, transaction submission). Every call may suspend and
//! may fail.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::blockchain::types::{BlockchainResult, ChainId, ChainMetadata, Session, SessionEvent};

#[async_trait]
pub trait ProviderFacade: Send + Sync {
    /// Open a wallet session.
    async fn connect(&self) -> BlockchainResult<Session>;

    /// Tear the wallet session down. Best effort.
    async fn disconnect(&self) -> BlockchainResult<()>;

    /// The session the wallet currently reports, if any.
    async fn current_session(&self) -> BlockchainResult<Option<Session>>;

    /// Chain id as seen by the signer.
    async fn get_chain_id(&self) -> BlockchainResult<ChainId>;

    /// Disclosed addresses; the first one is the active account.
    async fn get_addresses(&self) -> BlockchainResult<Vec<Address>>;

    /// Native balance in the smallest unit.
    async fn get_balance(&self, address: Address) -> BlockchainResult<U256>;

    async fn get_chain_metadata(&self) -> BlockchainResult<ChainMetadata>;

    async fn sign_message(&self, message: &str, account: Address) -> BlockchainResult<Bytes>;

    async fn verify_message(
        &self,
        address: Address,
        message: &str,
        signature: &Bytes,
    ) -> BlockchainResult<bool>;

    /// Submit a native transfer. Returns once the node accepted it; no receipt
    /// is awaited.
    async fn send_transaction(
        &self,
        to: Address,
        value: U256,
        account: Address,
    ) -> BlockchainResult<TxHash>;

    /// Stream of out-of-band session changes.
    fn session_events(&self) -> broadcast::Receiver<SessionEvent>;
}
