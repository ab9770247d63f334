use std::sync::Arc;

use axum::Extension;
use common::{
    chain::{self, wallet::WalletState, NetworkEndpoints},
    config::Network,
};
use serde::Serialize;

use crate::response::ApiResponse;

/// Wallet connection status.
#[derive(Serialize)]
pub(super) struct WalletStatus {
    #[serde(flatten)]
    wallet: WalletState,
    network: Network,

    /// Public endpoints of the configured network, if known.
    endpoints: Option<NetworkEndpoints>,
}

/// Get the current wallet connection state.
///
/// Accounts of an external wallet are re-read before responding.
pub(super) async fn status(
    Extension(chain): Extension<Arc<chain::Client>>,
) -> ApiResponse<WalletStatus> {
    ApiResponse::new(WalletStatus {
        wallet: chain.refresh_accounts().await,
        network: chain.network(),
        endpoints: chain::endpoints(chain.network()),
    })
}
