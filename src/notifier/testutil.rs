use std::{
    collections::HashMap,
    str::FromStr,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness, absolute,
    transaction,
};
use chrono::{DateTime, Utc};

use crate::{
    chains::{ChainQuery, QueryError},
    types::{TransactionInput, TransactionNotification, TransactionOutput, WalletInfo},
};

pub fn script(tag: u8) -> ScriptBuf {
    ScriptBuf::from_bytes(vec![0x00, 0x14, tag])
}

pub fn transaction(inputs: &[OutPoint], outputs: &[u64]) -> Transaction {
    Transaction {
        version: transaction::Version::TWO,
        lock_time: absolute::LockTime::ZERO,
        input: inputs
            .iter()
            .map(|outpoint| TxIn {
                previous_output: *outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            })
            .collect(),
        output: outputs
            .iter()
            .enumerate()
            .map(|(i, value)| TxOut {
                value: Amount::from_sat(*value),
                script_pubkey: script(i as u8),
            })
            .collect(),
    }
}

pub fn funding_outpoint(tag: char) -> OutPoint {
    OutPoint {
        txid: Txid::from_str(&tag.to_string().repeat(64)).unwrap(),
        vout: 0,
    }
}

pub fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

pub fn wallet_info(height: u32) -> WalletInfo {
    WalletInfo {
        height,
        amount: 3_000,
        time_received: timestamp(1_700_000_000),
    }
}

pub fn sample_notification() -> TransactionNotification {
    let outpoint = funding_outpoint('c');
    TransactionNotification {
        txid: outpoint.txid,
        inputs: vec![TransactionInput {
            outpoint_hash: outpoint.txid,
            outpoint_index: 0,
            linked_script_pubkey: Some(script(9)),
            value: Some(500),
        }],
        outputs: vec![TransactionOutput {
            script_pubkey: script(0),
            value: 1_000,
            index: 0,
        }],
        watch_only: false,
        value: 1_000,
        timestamp: timestamp(1_700_000_000),
        height: 0,
    }
}

/// In-memory node used by the pipeline tests.
#[derive(Default)]
pub struct MockChain {
    transactions: Mutex<HashMap<Txid, Transaction>>,
    wallet: Mutex<HashMap<Txid, WalletInfo>>,
    raw_calls: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tx` and returns its txid.
    pub fn add_transaction(&self, tx: Transaction) -> Txid {
        let txid = tx.compute_txid();
        self.transactions.lock().unwrap().insert(txid, tx);
        txid
    }

    pub fn set_wallet_info(&self, txid: Txid, info: WalletInfo) {
        self.wallet.lock().unwrap().insert(txid, info);
    }

    pub fn raw_calls(&self) -> usize {
        self.raw_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainQuery for MockChain {
    async fn get_raw_transaction(&self, txid: &Txid) -> Result<Transaction, QueryError> {
        self.raw_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.transactions
            .lock()
            .unwrap()
            .get(txid)
            .cloned()
            .ok_or(QueryError::NotFound(*txid))
    }

    async fn get_wallet_transaction(&self, txid: &Txid) -> Result<WalletInfo, QueryError> {
        tokio::task::yield_now().await;
        self.wallet
            .lock()
            .unwrap()
            .get(txid)
            .cloned()
            .ok_or(QueryError::NotFound(*txid))
    }
}
