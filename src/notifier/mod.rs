//! Webhook notification pipeline: resolve, dedup, enrich, fan out.

pub mod builder;
pub mod cache;
pub mod dispatcher;
pub mod errors;
pub mod listener;

#[cfg(test)]
pub(crate) mod testutil;

pub use builder::EventBuilder;
pub use cache::DedupCache;
pub use dispatcher::{Dispatcher, Outcome, parse_txid};
pub use errors::NotifyError;
pub use listener::{ChannelListener, ListenerRegistry, LoggingListener, TransactionListener};
