//! Shared utilities for integration testing.

#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Notify};

use wallet_console::actions::{ActionOrchestrator, ActionSettings};
use wallet_console::blockchain::{
    BlockchainError, BlockchainResult, ChainId, ChainMetadata, NativeCurrency, ProviderFacade,
    Session, SessionEvent,
};
use wallet_console::console::{ConsoleLog, StatusSink};
use wallet_console::session::ConnectionManager;

pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Scripted provider that counts every call.
pub struct MockProvider {
    pub account: Address,
    pub chain_id: u64,
    pub signature: Bytes,
    pub signature_valid: bool,
    calls: AtomicUsize,
    balances: Mutex<HashMap<Address, U256>>,
    session: Mutex<Option<Session>>,
    sent: Mutex<Vec<(Address, U256, Address)>>,
    credit_on_send: AtomicBool,
    fail_connect: AtomicBool,
    fail_disconnect: AtomicBool,
    fail_balance: AtomicBool,
    paused: AtomicBool,
    entered: Notify,
    release: Notify,
    events: broadcast::Sender<SessionEvent>,
}

impl MockProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            account: Address::repeat_byte(0xab),
            chain_id: 1,
            signature: Bytes::from(vec![0x11, 0x11]),
            signature_valid: true,
            calls: AtomicUsize::new(0),
            balances: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            credit_on_send: AtomicBool::new(false),
            fail_connect: AtomicBool::new(false),
            fail_disconnect: AtomicBool::new(false),
            fail_balance: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
            events,
        }
    }

    /// Provider whose verification rejects every signature.
    pub fn rejecting_signatures() -> Self {
        Self {
            signature_valid: false,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_balance(&self, address: Address, wei: U256) {
        self.balances.lock().unwrap().insert(address, wei);
    }

    pub fn sent(&self) -> Vec<(Address, U256, Address)> {
        self.sent.lock().unwrap().clone()
    }

    /// Make transfers show up in the recipient balance immediately.
    pub fn credit_on_send(&self, enabled: bool) {
        self.credit_on_send.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_connect(&self, enabled: bool) {
        self.fail_connect.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_disconnect(&self, enabled: bool) {
        self.fail_disconnect.store(enabled, Ordering::SeqCst);
    }

    pub fn fail_balance(&self, enabled: bool) {
        self.fail_balance.store(enabled, Ordering::SeqCst);
    }

    /// Replace the wallet-side session and notify listeners.
    pub fn change_session(&self, session: Option<Session>, event: SessionEvent) {
        *self.session.lock().unwrap() = session;
        let _ = self.events.send(event);
    }

    pub fn session(&self) -> Option<Session> {
        *self.session.lock().unwrap()
    }

    /// Suspend the next provider call until [`MockProvider::resume`].
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Let later calls through while the parked one stays parked.
    pub fn stop_pausing(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    /// Wait until a call is parked on the pause.
    pub async fn wait_until_paused(&self) {
        self.entered.notified().await;
    }

    async fn checkpoint(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.paused.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl ProviderFacade for MockProvider {
    async fn connect(&self) -> BlockchainResult<Session> {
        self.checkpoint().await;
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(BlockchainError::Wallet("user rejected the request".to_string()));
        }
        let session = Session {
            account: self.account,
            chain_id: ChainId(self.chain_id),
        };
        *self.session.lock().unwrap() = Some(session);
        Ok(session)
    }

    async fn disconnect(&self) -> BlockchainResult<()> {
        self.checkpoint().await;
        *self.session.lock().unwrap() = None;
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("transport closed".to_string()));
        }
        Ok(())
    }

    async fn current_session(&self) -> BlockchainResult<Option<Session>> {
        // Answer from the view held before suspending.
        let session = self.session();
        self.checkpoint().await;
        Ok(session)
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.checkpoint().await;
        Ok(ChainId(self.chain_id))
    }

    async fn get_addresses(&self) -> BlockchainResult<Vec<Address>> {
        self.checkpoint().await;
        Ok(self.session().map(|s| s.account).into_iter().collect())
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.checkpoint().await;
        if self.fail_balance.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("secret upstream detail".to_string()));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn get_chain_metadata(&self) -> BlockchainResult<ChainMetadata> {
        self.checkpoint().await;
        Ok(ChainMetadata {
            id: self.chain_id,
            name: "Ethereum".to_string(),
            native_currency: NativeCurrency {
                name: "Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        })
    }

    async fn sign_message(&self, _message: &str, _account: Address) -> BlockchainResult<Bytes> {
        self.checkpoint().await;
        Ok(self.signature.clone())
    }

    async fn verify_message(
        &self,
        address: Address,
        _message: &str,
        signature: &Bytes,
    ) -> BlockchainResult<bool> {
        self.checkpoint().await;
        Ok(self.signature_valid && address == self.account && *signature == self.signature)
    }

    async fn send_transaction(
        &self,
        to: Address,
        value: U256,
        account: Address,
    ) -> BlockchainResult<TxHash> {
        self.checkpoint().await;
        self.sent.lock().unwrap().push((to, value, account));
        if self.credit_on_send.load(Ordering::SeqCst) {
            let mut balances = self.balances.lock().unwrap();
            *balances.entry(to).or_insert(U256::ZERO) += value;
        }
        Ok(TxHash::repeat_byte(0x42))
    }

    fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// One write into a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOp {
    Reset,
    Replace(String),
    Append(String),
    Error,
    Finish,
}

/// Sink that keeps every write in order.
#[derive(Default)]
pub struct RecordingSink {
    ops: Mutex<Vec<SinkOp>>,
}

impl RecordingSink {
    pub fn ops(&self) -> Vec<SinkOp> {
        self.ops.lock().unwrap().clone()
    }

    fn push(&self, op: SinkOp) {
        self.ops.lock().unwrap().push(op);
    }
}

impl StatusSink for RecordingSink {
    fn reset(&self) {
        self.push(SinkOp::Reset);
    }

    fn replace(&self, line: &str) {
        self.push(SinkOp::Replace(line.to_string()));
    }

    fn append(&self, line: &str) {
        self.push(SinkOp::Append(line.to_string()));
    }

    fn show_error(&self) {
        self.push(SinkOp::Error);
    }

    fn finish(&self) {
        self.push(SinkOp::Finish);
    }
}

/// Provider, log, state machine and orchestrator wired the way startup does.
pub struct Harness {
    pub provider: Arc<MockProvider>,
    pub log: Arc<ConsoleLog>,
    pub connection: Arc<ConnectionManager>,
    pub actions: Arc<ActionOrchestrator>,
}

impl Harness {
    pub fn new(provider: Arc<MockProvider>) -> Self {
        let log = Arc::new(ConsoleLog::new());
        let connection = Arc::new(ConnectionManager::new(provider.clone(), log.clone()));
        let actions = Arc::new(ActionOrchestrator::new(
            provider.clone(),
            connection.subscribe(),
            log.clone(),
            ActionSettings::default(),
        ));
        Self {
            provider,
            log,
            connection,
            actions,
        }
    }

    /// Harness with an open session.
    pub async fn connected() -> Self {
        let harness = Self::new(Arc::new(MockProvider::new()));
        harness.connection.request_connect().await.unwrap();
        harness
    }
}
