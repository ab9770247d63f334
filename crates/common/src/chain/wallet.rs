use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{broadcast, watch};

use super::Error;

/// Address reported by a simulated wallet connection.
pub const SIMULATED_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb";

/// Transaction submitted to the marketplace contract through a wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    /// Contract address.
    pub to: Option<String>,

    /// Transferred amount, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Hex-encoded call data.
    pub data: String,
}

/// Notification emitted by a wallet backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletEvent {
    /// Wallet accounts were changed. An empty list means that access was revoked.
    AccountsChanged(Vec<String>),

    /// Wallet backend was disconnected.
    Disconnected,
}

/// Wallet backend capable of signing and sending marketplace transactions.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Request access to wallet accounts.
    async fn enable(&self) -> Result<Vec<String>, Error>;

    /// Get currently available accounts without prompting for access.
    async fn accounts(&self) -> Result<Vec<String>, Error>;

    /// Sign and send a transaction, returning its hash.
    async fn send_transaction(&self, request: TransactionRequest) -> Result<String, Error>;

    /// Subscribe to wallet events, if the backend supports them.
    fn events(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        None
    }
}

/// Kind of an established wallet connection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// Transactions are sent through a [`WalletProvider`].
    External,

    /// Transactions are simulated locally.
    Simulation,
}

/// Wallet connection state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WalletState {
    pub address: Option<String>,
    pub connected: bool,
    pub connecting: bool,
    pub error: Option<String>,
    pub kind: Option<WalletKind>,
}

/// Shared wallet connection state.
///
/// Every state change is published to receivers created with [`WalletSession::subscribe`].
pub struct WalletSession {
    state: watch::Sender<WalletState>,
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletSession {
    /// Create new disconnected session.
    pub fn new() -> Self {
        let (state, _) = watch::channel(WalletState::default());

        Self { state }
    }

    /// Get a snapshot of the current state.
    pub fn state(&self) -> WalletState {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.state.subscribe()
    }

    pub(super) fn begin_connect(&self) {
        self.state.send_modify(|state| {
            state.connecting = true;
            state.error = None;
        });
    }

    pub(super) fn connected(&self, address: String, kind: WalletKind) {
        self.state.send_replace(WalletState {
            address: Some(address),
            connected: true,
            connecting: false,
            error: None,
            kind: Some(kind),
        });
    }

    /// Reset the session into the disconnected state.
    pub fn disconnect(&self) {
        self.state.send_replace(WalletState::default());
    }

    /// Apply a [`WalletEvent`] received from a wallet backend.
    pub fn handle_event(&self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => self.disconnect(),
                Some(account) => {
                    self.state.send_if_modified(|state| {
                        if state.connected && state.address.as_deref() != Some(&account) {
                            state.address = Some(account);
                            true
                        } else {
                            false
                        }
                    });
                }
            },
            WalletEvent::Disconnected => self.disconnect(),
        }
    }
}
