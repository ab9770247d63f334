//! Marketplace blockchain client.
//!
//! [`Client`] registers content, purchases licenses and logs content usages
//! on the marketplace contract. Transactions are sent through a connected
//! [`WalletProvider`]; whenever no provider is connected, or a provider call fails,
//! the client falls back to simulated transactions, so that callers never
//! have to handle blockchain unavailability.

/// Content usage proofs.
pub mod proof;

/// JSON-RPC wallet provider.
pub mod rpc_wallet;

/// Wallet providers and connection state.
pub mod wallet;

use std::{sync::Arc, time::Duration};

use derive_more::{Display, Error, From};
use rand::random;
use serde::Serialize;
use serde_json::json;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    config::{self, Network},
    hash,
};

use proof::UsageProof;
use rpc_wallet::RpcWallet;
use wallet::{
    TransactionRequest, WalletEvent, WalletKind, WalletProvider, WalletSession, WalletState,
    SIMULATED_ADDRESS,
};

/// Period of wallet account polling for JSON-RPC wallets.
const ACCOUNT_POLL_PERIOD: Duration = Duration::from_secs(5);

/// Errors returned by [`WalletProvider`]s.
#[derive(Debug, Display, From, Error)]
pub enum Error {
    /// HTTP transport error.
    Http(reqwest::Error),

    /// Wallet rejected the request.
    #[from(ignore)]
    #[display(fmt = "wallet error {}: {}", code, message)]
    Rpc { code: i64, message: String },

    /// Wallet responded without a result.
    #[display(fmt = "wallet returned an empty response")]
    EmptyResponse,
}

/// Public endpoints of a [`Network`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NetworkEndpoints {
    pub indexer_url: &'static str,
    pub node_url: &'static str,
}

/// Get public endpoints of the provided network.
///
/// Returns [`None`] for networks without known public endpoints.
pub fn endpoints(network: Network) -> Option<NetworkEndpoints> {
    match network {
        Network::Testnet => Some(NetworkEndpoints {
            indexer_url: "https://indexer.testnet.midnight.network/api/v1/graphql",
            node_url: "https://rpc.testnet.midnight.network",
        }),
        Network::Local => Some(NetworkEndpoints {
            indexer_url: "http://localhost:4000/api/v1/graphql",
            node_url: "http://localhost:3000",
        }),
        Network::Mainnet => None,
    }
}

/// Content registration parameters.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterContent {
    pub content_hash: String,
    pub ipfs_cid: String,
    pub title: String,
    pub content_type: String,
    pub price_per_use: String,
    pub creator: String,
    pub registered_at: i64,
}

/// Registered content.
#[derive(Clone, Debug)]
pub struct Registration {
    pub content_id: String,
    pub tx_hash: String,
}

/// Purchased license.
#[derive(Clone, Debug)]
pub struct Purchase {
    pub license_id: String,
    pub tx_hash: String,
}

/// Logged content usage.
#[derive(Clone, Debug)]
pub struct Access {
    pub event_id: String,
    pub tx_hash: String,
}

/// Marketplace contract client.
pub struct Client {
    network: Network,
    contract_address: Option<String>,
    provider: Option<Arc<dyn WalletProvider>>,
    session: WalletSession,
}

impl Client {
    /// Create new [`Client`] from the provided [`Chain`] configuration.
    ///
    /// If no wallet URL is configured, all transactions are simulated.
    /// Otherwise wallet account polling is started, which requires
    /// a Tokio runtime.
    ///
    /// [`Chain`]: config::Chain
    pub fn new(config: &config::Chain) -> Self {
        let provider = config.wallet_url.as_ref().map(|url| {
            let wallet = Arc::new(RpcWallet::new(url));
            wallet.spawn_account_poller(ACCOUNT_POLL_PERIOD);
            wallet as Arc<dyn WalletProvider>
        });

        Self::with_provider(config, provider)
    }

    /// Create new [`Client`] with a custom [`WalletProvider`].
    pub fn with_provider(
        config: &config::Chain,
        provider: Option<Arc<dyn WalletProvider>>,
    ) -> Self {
        Self {
            network: config.network,
            contract_address: config.contract_address.clone(),
            provider,
            session: WalletSession::new(),
        }
    }

    /// Network this client is configured for.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Current wallet connection.
    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Connect to the configured wallet provider.
    ///
    /// Falls back to a simulated wallet if no provider is available
    /// or if it refuses to provide an account.
    pub async fn connect_wallet(&self) -> WalletState {
        self.session.begin_connect();

        if let Some(provider) = &self.provider {
            match provider.enable().await {
                Ok(accounts) => {
                    if let Some(address) = accounts.into_iter().next() {
                        info!(%address, "connected to wallet provider");
                        self.session.connected(address, WalletKind::External);
                        return self.session.state();
                    }

                    warn!("wallet provider returned no accounts");
                }
                Err(err) => warn!(%err, "wallet provider connection failed"),
            }
        }

        info!("using simulated wallet");
        self.session
            .connected(String::from(SIMULATED_ADDRESS), WalletKind::Simulation);
        self.session.state()
    }

    /// Re-read provider accounts of an external wallet connection.
    ///
    /// An empty account list disconnects the session. Provider failures
    /// are logged and leave the session unchanged.
    pub async fn refresh_accounts(&self) -> WalletState {
        let provider = self
            .provider
            .as_ref()
            .filter(|_| self.session.state().kind == Some(WalletKind::External));

        if let Some(provider) = provider {
            match provider.accounts().await {
                Ok(accounts) => self
                    .session
                    .handle_event(WalletEvent::AccountsChanged(accounts)),
                Err(err) => warn!(%err, "unable to refresh wallet accounts"),
            }
        }

        self.session.state()
    }

    /// Disconnect from the current wallet.
    pub fn disconnect_wallet(&self) {
        self.session.disconnect();
    }

    /// Start forwarding provider events into the wallet session.
    ///
    /// Events only apply to external wallet connections, simulated sessions
    /// ignore them. Returns [`None`] if the provider doesn't emit any events.
    pub fn spawn_event_listener(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut events = self.provider.as_ref()?.events()?;
        let client = Arc::clone(self);

        Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) if client.session.state().kind == Some(WalletKind::External) => {
                        client.session.handle_event(event)
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "wallet events were dropped")
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }

    /// Register content on the marketplace contract.
    pub async fn register_content(&self, params: &RegisterContent) -> Registration {
        info!(content_hash = %params.content_hash, "registering content");

        let data = encode_json(&json!(params));
        let tx_hash = self.submit(None, data).await;

        Registration {
            content_id: format!(
                "0x{}",
                hash::content_id(&params.content_hash, &params.creator, params.registered_at)
            ),
            tx_hash,
        }
    }

    /// Purchase a license for the provided content.
    pub async fn purchase_license(&self, content_id: &str, amount: &str) -> Purchase {
        info!(%content_id, "purchasing license");

        let data = format!("0x{}", hex::encode(content_id));
        let tx_hash = self.submit(Some(amount.to_string()), data).await;

        Purchase {
            license_id: simulated_id(),
            tx_hash,
        }
    }

    /// Log a content usage under the provided license.
    pub async fn access_content(&self, license_id: &str, proof: &UsageProof) -> Access {
        info!(%license_id, "logging content access");

        let data = encode_json(&json!({
            "licenseId": license_id,
            "proof": proof,
        }));
        let tx_hash = self.submit(None, data).await;

        Access {
            event_id: simulated_id(),
            tx_hash,
        }
    }

    /// Send a transaction through the connected provider, or simulate it.
    async fn submit(&self, value: Option<String>, data: String) -> String {
        let provider = self
            .provider
            .as_ref()
            .filter(|_| self.session.state().kind == Some(WalletKind::External));

        if let Some(provider) = provider {
            let request = TransactionRequest {
                to: self.contract_address.clone(),
                value,
                data,
            };

            match provider.send_transaction(request).await {
                Ok(tx_hash) => return tx_hash,
                Err(err) => warn!(%err, "wallet transaction failed, simulating"),
            }
        }

        simulated_tx_hash()
    }
}

/// Encode a JSON value as `0x`-prefixed hex call data.
fn encode_json(value: &serde_json::Value) -> String {
    format!("0x{}", hex::encode(value.to_string()))
}

fn simulated_id() -> String {
    format!("0x{}", hex::encode(random::<[u8; 16]>()))
}

fn simulated_tx_hash() -> String {
    format!("0x{}", hex::encode(random::<[u8; 32]>()))
}
