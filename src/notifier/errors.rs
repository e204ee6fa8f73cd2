use bitcoin::Txid;
use thiserror::Error;

use crate::chains::QueryError;

/// Failure modes of a single notification.
///
/// `InvalidIdentifier` and `UpstreamUnavailable` abort the notification.
/// The other two are absorbed by the pipeline: a missing wallet record
/// marks the event watch-only, a missing prior output leaves the input
/// unenriched.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid transaction identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Failed to fetch transaction {txid}: {source}")]
    UpstreamUnavailable {
        txid: Txid,
        #[source]
        source: QueryError,
    },
    #[error("No wallet record for {txid}: {source}")]
    WalletInfoUnavailable {
        txid: Txid,
        #[source]
        source: QueryError,
    },
    #[error("Prior output {txid}:{vout} unavailable: {reason}")]
    PriorOutputUnavailable {
        txid: Txid,
        vout: u32,
        reason: String,
    },
}
