//! Bridges bitcoind `-walletnotify` webhooks to in-process listeners.
//!
//! Each notification body is a txid. The transaction and the wallet's view
//! of it are fetched over RPC, inputs are linked to the outputs they spend,
//! and the resulting [`types::TransactionNotification`] is handed to every
//! registered listener at most once per confirmation height.
//!
//! Delivery is fire-and-forget: the webhook always gets `200 OK` and nothing
//! is retried. A notification dropped because the node was unreachable is
//! lost until the node sends another one for the same transaction, for
//! example when it confirms.

pub mod chains;
pub mod config;
pub mod notifier;
pub mod server;
pub mod types;

use std::sync::Arc;

use chains::ChainQuery;
use config::NotifierConfig;
use notifier::{Dispatcher, ListenerRegistry};
use server::Server;
use tracing::info;

/// Wires a dispatcher to the HTTP endpoint and serves until the process exits.
pub async fn start_notification_listener(
    config: &NotifierConfig,
    query: Arc<dyn ChainQuery>,
    listeners: ListenerRegistry,
) -> anyhow::Result<()> {
    info!(
        listeners = listeners.len(),
        cache_ttl_secs = config.cache.ttl_secs,
        "Starting notification listener"
    );
    let dispatcher = Arc::new(Dispatcher::new(query, listeners, config.cache.ttl()));
    Server::new(config.server.address.clone(), dispatcher)
        .run()
        .await
}
