use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::types::TransactionNotification;

/// Receiver of enriched transaction events.
///
/// Called synchronously while the dispatcher holds its dedup lock, so a
/// slow implementation delays every other notification.
pub trait TransactionListener: Send + Sync {
    fn deliver(&self, event: &TransactionNotification);
}

impl<F> TransactionListener for F
where
    F: Fn(&TransactionNotification) + Send + Sync,
{
    fn deliver(&self, event: &TransactionNotification) {
        self(event)
    }
}

/// Ordered set of listeners fixed at startup.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn TransactionListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listener(mut self, listener: impl TransactionListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers `event` to every listener in registration order.
    pub fn notify_all(&self, event: &TransactionNotification) -> usize {
        for listener in &self.listeners {
            listener.deliver(event);
        }
        self.listeners.len()
    }
}

impl FromIterator<Arc<dyn TransactionListener>> for ListenerRegistry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn TransactionListener>>>(iter: I) -> Self {
        Self {
            listeners: iter.into_iter().collect(),
        }
    }
}

/// Writes one structured log line per event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl TransactionListener for LoggingListener {
    fn deliver(&self, event: &TransactionNotification) {
        let enriched = event.inputs.iter().filter(|i| i.is_enriched()).count();
        info!(
            txid = %event.txid,
            height = event.height,
            watch_only = event.watch_only,
            value = event.value,
            inputs = event.inputs.len(),
            enriched_inputs = enriched,
            outputs = event.outputs.len(),
            "Transaction notification"
        );
    }
}

/// Forwards events to an async consumer.
pub struct ChannelListener {
    sender: UnboundedSender<TransactionNotification>,
}

impl ChannelListener {
    pub fn new(sender: UnboundedSender<TransactionNotification>) -> Self {
        Self { sender }
    }
}

impl TransactionListener for ChannelListener {
    fn deliver(&self, event: &TransactionNotification) {
        if self.sender.send(event.clone()).is_err() {
            warn!(txid = %event.txid, "Notification channel closed, dropping event");
        }
    }
}
