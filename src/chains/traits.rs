use async_trait::async_trait;
use bitcoin::{Transaction, Txid};
use thiserror::Error;

use crate::types::WalletInfo;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("RPC response for {method} carried no result")]
    EmptyResult { method: &'static str },
    #[error("Failed to decode transaction: {0}")]
    Decode(String),
    #[error("Transaction {0} not found")]
    NotFound(Txid),
}

/// Lookups the notification pipeline needs from the node.
///
/// `get_wallet_transaction` failing means the local wallet does not track
/// the transaction.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn get_raw_transaction(&self, txid: &Txid) -> Result<Transaction, QueryError>;
    async fn get_wallet_transaction(&self, txid: &Txid) -> Result<WalletInfo, QueryError>;
}
