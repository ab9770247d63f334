use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::warn;

use super::{
    wallet::{TransactionRequest, WalletEvent, WalletProvider},
    Error,
};

/// Capacity of the wallet event channel.
const EVENT_CAPACITY: usize = 16;

#[derive(Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// [`WalletProvider`] that forwards requests to a JSON-RPC wallet endpoint over HTTP.
///
/// HTTP wallets cannot push notifications, so account changes are detected
/// by polling `midnight_accounts`, see [`RpcWallet::spawn_account_poller`].
pub struct RpcWallet {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
    events: broadcast::Sender<WalletEvent>,
}

impl RpcWallet {
    /// Create new [`RpcWallet`] for the provided endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
            events,
        }
    }

    /// Periodically poll wallet accounts and publish every change
    /// as [`WalletEvent::AccountsChanged`].
    ///
    /// The first successful poll is always published. Failed polls are logged
    /// and skipped. Polling stops once the wallet is dropped.
    pub fn spawn_account_poller(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let wallet = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut known: Option<Vec<String>> = None;

            loop {
                interval.tick().await;

                let Some(wallet) = wallet.upgrade() else {
                    break;
                };

                match wallet.accounts().await {
                    Ok(accounts) if known.as_ref() != Some(&accounts) => {
                        known = Some(accounts.clone());
                        // No subscribers is fine.
                        let _ = wallet.events.send(WalletEvent::AccountsChanged(accounts));
                    }
                    Ok(_) => {}
                    Err(err) => warn!(%err, "unable to poll wallet accounts"),
                }
            }
        })
    }

    async fn call<P, T>(&self, method: &str, params: P) -> Result<T, Error>
    where
        P: Serialize,
        T: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response: RpcResponse<T> = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(RpcError { code, message }) = response.error {
            return Err(Error::Rpc { code, message });
        }

        response.result.ok_or(Error::EmptyResponse)
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn enable(&self) -> Result<Vec<String>, Error> {
        self.call("midnight_enable", Vec::<String>::new()).await
    }

    async fn accounts(&self) -> Result<Vec<String>, Error> {
        self.call("midnight_accounts", Vec::<String>::new()).await
    }

    async fn send_transaction(&self, request: TransactionRequest) -> Result<String, Error> {
        self.call("midnight_sendTransaction", [request]).await
    }

    fn events(&self) -> Option<broadcast::Receiver<WalletEvent>> {
        Some(self.events.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        net::TcpListener,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{extract::State, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::time;

    use crate::chain::{
        wallet::{TransactionRequest, WalletEvent, WalletProvider},
        Error,
    };

    use super::RpcWallet;

    /// Wallet endpoint that records requests and answers with canned responses.
    #[derive(Default)]
    struct StubWallet {
        requests: Mutex<Vec<Value>>,

        /// Accounts returned by `midnight_accounts`, `None` for a response without a result.
        accounts: Mutex<Option<Vec<String>>>,
    }

    async fn rpc(State(stub): State<Arc<StubWallet>>, Json(request): Json<Value>) -> Json<Value> {
        stub.requests.lock().unwrap().push(request.clone());

        let id = request["id"].clone();

        let response = match request["method"].as_str() {
            Some("midnight_enable") => json!({ "jsonrpc": "2.0", "id": id, "result": ["0xaaa"] }),
            Some("midnight_accounts") => match &*stub.accounts.lock().unwrap() {
                Some(accounts) => json!({ "jsonrpc": "2.0", "id": id, "result": accounts }),
                None => json!({ "jsonrpc": "2.0", "id": id }),
            },
            _ => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": 4001, "message": "user rejected" }
            }),
        };

        Json(response)
    }

    fn serve(stub: Arc<StubWallet>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("unable to bind listener");
        let addr = listener.local_addr().unwrap();

        let router = Router::new().route("/", post(rpc)).with_state(stub);

        tokio::spawn(
            axum::Server::from_tcp(listener)
                .expect("unable to create server")
                .serve(router.into_make_service()),
        );

        format!("http://{addr}/")
    }

    #[tokio::test]
    async fn json_rpc_envelope() {
        let stub = Arc::new(StubWallet::default());
        let wallet = RpcWallet::new(serve(stub.clone()));

        let accounts = wallet.enable().await.expect("unable to enable wallet");
        assert_eq!(accounts, vec![String::from("0xaaa")]);

        let err = wallet
            .send_transaction(TransactionRequest {
                to: Some(String::from("0xcontract")),
                value: None,
                data: String::from("0x00"),
            })
            .await
            .expect_err("transaction should be rejected");

        assert!(
            matches!(err, Error::Rpc { code: 4001, ref message } if message == "user rejected")
        );

        let requests = stub.requests.lock().unwrap();

        assert_eq!(
            requests[0],
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "midnight_enable",
                "params": []
            })
        );

        assert_eq!(
            requests[1],
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "midnight_sendTransaction",
                "params": [{ "to": "0xcontract", "data": "0x00" }]
            })
        );
    }

    #[tokio::test]
    async fn missing_result() {
        let stub = Arc::new(StubWallet::default());
        let wallet = RpcWallet::new(serve(stub));

        let err = wallet
            .accounts()
            .await
            .expect_err("response has no result");

        assert!(matches!(err, Error::EmptyResponse));
    }

    #[tokio::test]
    async fn unreachable_endpoint() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let wallet = RpcWallet::new(format!("http://{addr}/"));

        assert!(matches!(wallet.enable().await, Err(Error::Http(_))));
    }

    #[tokio::test]
    async fn polls_account_changes() {
        let stub = Arc::new(StubWallet::default());
        *stub.accounts.lock().unwrap() = Some(vec![String::from("0xaaa")]);

        let wallet = Arc::new(RpcWallet::new(serve(stub.clone())));
        let mut events = wallet.events().expect("wallet should emit events");

        let poller = wallet.spawn_account_poller(Duration::from_millis(10));

        let event = time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no initial accounts event")
            .unwrap();
        assert_eq!(event, WalletEvent::AccountsChanged(vec![String::from("0xaaa")]));

        *stub.accounts.lock().unwrap() = Some(vec![String::from("0xbbb")]);

        let event = time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no accounts change event")
            .unwrap();
        assert_eq!(event, WalletEvent::AccountsChanged(vec![String::from("0xbbb")]));

        *stub.accounts.lock().unwrap() = Some(Vec::new());

        let event = time::timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no revocation event")
            .unwrap();
        assert_eq!(event, WalletEvent::AccountsChanged(Vec::new()));

        drop(wallet);
        time::timeout(Duration::from_secs(5), poller)
            .await
            .expect("poller should stop once the wallet is dropped")
            .unwrap();
    }
}
