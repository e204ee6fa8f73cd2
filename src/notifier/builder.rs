use std::sync::Arc;

use bitcoin::{OutPoint, Transaction, TxIn, TxOut};
use futures::future::join_all;
use tracing::warn;

use crate::{
    chains::ChainQuery,
    notifier::errors::NotifyError,
    types::{TransactionInput, TransactionNotification, TransactionOutput, WalletInfo},
};

/// Turns a resolved transaction into a [`TransactionNotification`],
/// linking each input to the output it spends where the node can supply it.
#[derive(Clone)]
pub struct EventBuilder {
    query: Arc<dyn ChainQuery>,
}

impl EventBuilder {
    pub fn new(query: Arc<dyn ChainQuery>) -> Self {
        Self { query }
    }

    pub async fn build(
        &self,
        tx: &Transaction,
        wallet_info: WalletInfo,
        watch_only: bool,
    ) -> TransactionNotification {
        let outputs = tx
            .output
            .iter()
            .enumerate()
            .map(|(index, txout)| TransactionOutput {
                script_pubkey: txout.script_pubkey.clone(),
                value: txout.value.to_sat(),
                index: index as u32,
            })
            .collect();

        let inputs = join_all(tx.input.iter().map(|txin| self.enrich_input(txin))).await;

        TransactionNotification {
            txid: tx.compute_txid(),
            inputs,
            outputs,
            watch_only,
            value: wallet_info.amount,
            timestamp: wallet_info.time_received,
            height: wallet_info.height,
        }
    }

    async fn enrich_input(&self, txin: &TxIn) -> TransactionInput {
        let outpoint = txin.previous_output;
        let mut input = TransactionInput {
            outpoint_hash: outpoint.txid,
            outpoint_index: outpoint.vout,
            linked_script_pubkey: None,
            value: None,
        };

        // coinbase inputs spend nothing
        if outpoint.is_null() {
            return input;
        }

        match self.resolve_prior_output(&outpoint).await {
            Ok(prev) => {
                input.linked_script_pubkey = Some(prev.script_pubkey);
                input.value = Some(prev.value.to_sat());
            }
            Err(e) => warn!(error = %e, "Leaving input unenriched"),
        }
        input
    }

    pub async fn resolve_prior_output(&self, outpoint: &OutPoint) -> Result<TxOut, NotifyError> {
        let prev_tx = self
            .query
            .get_raw_transaction(&outpoint.txid)
            .await
            .map_err(|e| NotifyError::PriorOutputUnavailable {
                txid: outpoint.txid,
                vout: outpoint.vout,
                reason: e.to_string(),
            })?;

        prev_tx
            .output
            .get(outpoint.vout as usize)
            .cloned()
            .ok_or_else(|| NotifyError::PriorOutputUnavailable {
                txid: outpoint.txid,
                vout: outpoint.vout,
                reason: format!("transaction has only {} outputs", prev_tx.output.len()),
            })
    }
}
