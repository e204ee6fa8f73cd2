use bitcoin::{ScriptBuf, Txid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Height reported for transactions that are not yet in a block.
pub const UNCONFIRMED_HEIGHT: u32 = 0;

/// Output of a notified transaction, copied verbatim with its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOutput {
    pub script_pubkey: ScriptBuf,
    pub value: u64, // satoshis
    pub index: u32,
}

/// Input of a notified transaction.
///
/// `linked_script_pubkey` and `value` are only populated when the
/// transaction that created the spent output could be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub outpoint_hash: Txid,
    pub outpoint_index: u32,
    pub linked_script_pubkey: Option<ScriptBuf>,
    pub value: Option<u64>,
}

impl TransactionInput {
    pub fn is_enriched(&self) -> bool {
        self.linked_script_pubkey.is_some()
    }
}

/// Wallet-level view of a transaction as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletInfo {
    pub height: u32,
    /// Net effect on the wallet in satoshis, negative for sends.
    pub amount: i64,
    pub time_received: DateTime<Utc>,
}

impl WalletInfo {
    /// Metadata used when the wallet holds no record of a transaction.
    ///
    /// Amount is zero, the height is the unconfirmed sentinel and the
    /// timestamp is the moment the notification reached this process.
    pub fn watch_only(received_at: DateTime<Utc>) -> Self {
        Self {
            height: UNCONFIRMED_HEIGHT,
            amount: 0,
            time_received: received_at,
        }
    }
}

/// Enriched event handed to every registered listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNotification {
    pub txid: Txid,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub watch_only: bool,
    pub value: i64,
    pub timestamp: DateTime<Utc>,
    pub height: u32,
}

impl TransactionNotification {
    pub fn is_confirmed(&self) -> bool {
        self.height != UNCONFIRMED_HEIGHT
    }
}
