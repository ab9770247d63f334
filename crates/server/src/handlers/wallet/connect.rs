use std::sync::Arc;

use axum::Extension;
use common::chain::{self, wallet::WalletState};

use crate::response::ApiResponse;

/// Connect the marketplace wallet.
///
/// Falls back to a simulated wallet if the configured provider is unavailable.
pub(super) async fn connect(
    Extension(chain): Extension<Arc<chain::Client>>,
) -> ApiResponse<WalletState> {
    ApiResponse::new(chain.connect_wallet().await).with_message("Wallet connected")
}

/// Disconnect the marketplace wallet.
pub(super) async fn disconnect(
    Extension(chain): Extension<Arc<chain::Client>>,
) -> ApiResponse<WalletState> {
    chain.disconnect_wallet();

    ApiResponse::new(chain.session().state()).with_message("Wallet disconnected")
}
