use std::{str::FromStr, sync::Arc, time::Duration};

use bitcoin::Txid;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    chains::ChainQuery,
    notifier::{
        builder::EventBuilder, cache::DedupCache, errors::NotifyError, listener::ListenerRegistry,
    },
    types::WalletInfo,
};

/// Hex length of a 32-byte transaction id.
const TXID_HEX_LEN: usize = 64;

/// What happened to a notification that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Dispatched { listeners: usize },
    Duplicate,
}

/// Resolves webhook notifications into enriched events and fans them out.
///
/// RPC lookups run concurrently across notifications. The dedup
/// check-and-set and the listener fan-out share one lock, so listeners
/// observe events one at a time.
pub struct Dispatcher {
    query: Arc<dyn ChainQuery>,
    builder: EventBuilder,
    listeners: ListenerRegistry,
    cache: Mutex<DedupCache>,
}

/// Parses a webhook body into a txid. Surrounding whitespace is ignored.
pub fn parse_txid(payload: &[u8]) -> Result<Txid, NotifyError> {
    let text = std::str::from_utf8(payload)
        .map_err(|e| NotifyError::InvalidIdentifier(format!("payload is not UTF-8: {e}")))?
        .trim();

    if text.len() != TXID_HEX_LEN {
        return Err(NotifyError::InvalidIdentifier(format!(
            "expected {TXID_HEX_LEN} hex characters, got {}",
            text.len()
        )));
    }

    Txid::from_str(text).map_err(|e| NotifyError::InvalidIdentifier(format!("{text}: {e}")))
}

impl Dispatcher {
    pub fn new(query: Arc<dyn ChainQuery>, listeners: ListenerRegistry, cache_ttl: Duration) -> Self {
        Self {
            builder: EventBuilder::new(query.clone()),
            query,
            listeners,
            cache: Mutex::new(DedupCache::new(cache_ttl)),
        }
    }

    /// Processes one raw notification. Stale cache entries are evicted
    /// before returning, whatever the outcome.
    pub async fn handle(&self, payload: &[u8]) -> Result<Outcome, NotifyError> {
        let result = self.process(payload).await;
        if let Err(e) = &result {
            error!(error = %e, "Dropping notification");
        }
        self.evict().await;
        result
    }

    /// Removes cache entries older than the ttl.
    pub async fn evict(&self) -> usize {
        let evicted = self.cache.lock().await.evict_expired();
        if evicted > 0 {
            debug!(evicted, "Evicted stale dedup entries");
        }
        evicted
    }

    pub async fn cached_height(&self, txid: &Txid) -> Option<u32> {
        self.cache.lock().await.height(txid)
    }

    pub async fn cache_len(&self) -> usize {
        self.cache.lock().await.len()
    }

    async fn resolve_wallet_info(&self, txid: &Txid) -> Result<WalletInfo, NotifyError> {
        self.query
            .get_wallet_transaction(txid)
            .await
            .map_err(|source| NotifyError::WalletInfoUnavailable {
                txid: *txid,
                source,
            })
    }

    async fn process(&self, payload: &[u8]) -> Result<Outcome, NotifyError> {
        let received_at = Utc::now();
        let txid = parse_txid(payload)?;

        let tx = self
            .query
            .get_raw_transaction(&txid)
            .await
            .map_err(|source| NotifyError::UpstreamUnavailable { txid, source })?;

        let (wallet_info, watch_only) = match self.resolve_wallet_info(&txid).await {
            Ok(info) => (info, false),
            Err(e) => {
                warn!(error = %e, "Treating transaction as watch-only");
                (WalletInfo::watch_only(received_at), true)
            }
        };
        let height = wallet_info.height;

        // Skip the per-input lookups for deliveries we already know about.
        if self.cache.lock().await.is_duplicate(&txid, height) {
            debug!(%txid, height, "Duplicate notification suppressed");
            return Ok(Outcome::Duplicate);
        }

        let event = self.builder.build(&tx, wallet_info, watch_only).await;

        let mut cache = self.cache.lock().await;
        if cache.is_duplicate(&txid, height) {
            debug!(%txid, height, "Duplicate notification suppressed");
            return Ok(Outcome::Duplicate);
        }
        cache.record(txid, height);
        let listeners = self.listeners.notify_all(&event);
        drop(cache);

        info!(%txid, height, watch_only, listeners, "Dispatched transaction notification");
        Ok(Outcome::Dispatched { listeners })
    }
}
