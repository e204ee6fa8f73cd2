use async_trait::async_trait;
use bitcoin::{SignedAmount, Transaction, Txid};
use chrono::DateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    chains::traits::{ChainQuery, QueryError},
    config::Rpc,
    types::{UNCONFIRMED_HEIGHT, WalletInfo},
};

const RPC_ID: &str = "bitcoind-notify";

/// JSON-RPC client for a bitcoind (or API-compatible) node.
pub struct BitcoindClient {
    client: Client,
    url: String,
    auth: Option<(String, String)>,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

impl<T> RpcResponse<T> {
    fn into_result(self, method: &'static str) -> Result<T, QueryError> {
        if let Some(err) = self.error {
            return Err(QueryError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        self.result.ok_or(QueryError::EmptyResult { method })
    }
}

/// Subset of the `gettransaction` reply the pipeline uses.
#[derive(Debug, Deserialize)]
pub struct GetTransactionResult {
    pub amount: f64,
    pub timereceived: i64,
    #[serde(default)]
    pub blockheight: Option<u32>,
}

impl TryFrom<GetTransactionResult> for WalletInfo {
    type Error = QueryError;

    fn try_from(value: GetTransactionResult) -> Result<Self, Self::Error> {
        let amount = SignedAmount::from_btc(value.amount)
            .map_err(|e| QueryError::Decode(format!("invalid amount {}: {e}", value.amount)))?;
        let time_received = DateTime::from_timestamp(value.timereceived, 0).ok_or_else(|| {
            QueryError::Decode(format!("invalid timereceived {}", value.timereceived))
        })?;

        Ok(WalletInfo {
            height: value.blockheight.unwrap_or(UNCONFIRMED_HEIGHT),
            amount: amount.to_sat(),
            time_received,
        })
    }
}

/// Decodes the hex string returned by `getrawtransaction`.
pub fn decode_raw_transaction(raw: &str) -> Result<Transaction, QueryError> {
    let bytes = hex::decode(raw.trim()).map_err(|e| QueryError::Decode(e.to_string()))?;
    bitcoin::consensus::deserialize(&bytes).map_err(|e| QueryError::Decode(e.to_string()))
}

impl BitcoindClient {
    pub fn new(url: String, user: Option<String>, password: Option<String>) -> Self {
        let auth = user.map(|user| (user, password.unwrap_or_default()));
        Self {
            client: Client::new(),
            url,
            auth,
        }
    }

    pub fn from_config(rpc: &Rpc) -> Self {
        Self::new(rpc.url.clone(), rpc.user.clone(), rpc.password.clone())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, QueryError> {
        let body = RpcRequest {
            jsonrpc: "1.0",
            id: RPC_ID,
            method,
            params,
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(method, %status, "RPC call completed");

        // bitcoind reports RPC failures with a JSON body on non-2xx statuses
        match response.json::<RpcResponse<T>>().await {
            Ok(reply) => reply.into_result(method),
            Err(_) if !status.is_success() => Err(QueryError::Rpc {
                code: i64::from(status.as_u16()),
                message: status.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ChainQuery for BitcoindClient {
    async fn get_raw_transaction(&self, txid: &Txid) -> Result<Transaction, QueryError> {
        let raw: String = self
            .call("getrawtransaction", json!([txid.to_string()]))
            .await?;
        decode_raw_transaction(&raw)
    }

    async fn get_wallet_transaction(&self, txid: &Txid) -> Result<WalletInfo, QueryError> {
        let reply: GetTransactionResult = self
            .call("gettransaction", json!([txid.to_string(), false]))
            .await?;
        WalletInfo::try_from(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::{
        Amount, OutPoint, ScriptBuf, Sequence, TxIn, TxOut, Witness, absolute, transaction,
    };
    use std::str::FromStr;

    #[test]
    fn test_wallet_info_from_confirmed_reply() {
        let reply: GetTransactionResult = serde_json::from_value(json!({
            "amount": -0.015,
            "confirmations": 3,
            "blockheight": 840000,
            "blockindex": 12,
            "timereceived": 1713571767,
            "txid": "6a2e5a5e0f1c4b1e0b8b3d0f6a4b8c1e2d3f4a5b6c7d8e9f0a1b2c3d4e5f6a7b",
        }))
        .unwrap();

        let info = WalletInfo::try_from(reply).unwrap();
        assert_eq!(info.height, 840000);
        assert_eq!(info.amount, -1_500_000);
        assert_eq!(info.time_received.timestamp(), 1713571767);
    }

    #[test]
    fn test_wallet_info_from_unconfirmed_reply() {
        let reply: GetTransactionResult = serde_json::from_value(json!({
            "amount": 0.0005,
            "confirmations": 0,
            "timereceived": 1713571767,
        }))
        .unwrap();

        let info = WalletInfo::try_from(reply).unwrap();
        assert_eq!(info.height, UNCONFIRMED_HEIGHT);
        assert_eq!(info.amount, 50_000);
    }

    #[test]
    fn test_rpc_error_body_is_surfaced() {
        let reply: RpcResponse<String> = serde_json::from_value(json!({
            "result": null,
            "error": { "code": -5, "message": "No such mempool or blockchain transaction" },
            "id": RPC_ID,
        }))
        .unwrap();

        match reply.into_result("getrawtransaction") {
            Err(QueryError::Rpc { code, message }) => {
                assert_eq!(code, -5);
                assert!(message.contains("No such mempool"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_result_is_an_error() {
        let reply: RpcResponse<String> =
            serde_json::from_value(json!({ "result": null, "error": null })).unwrap();

        assert!(matches!(
            reply.into_result("gettransaction"),
            Err(QueryError::EmptyResult { method: "gettransaction" })
        ));
    }

    #[test]
    fn test_decode_raw_transaction() {
        let prev = Txid::from_str("0e3e2357e806b6cdb1f70b54c3a3a17b6714ee1f0e68bebb44a74b1efd512098")
            .unwrap();
        let tx = Transaction {
            version: transaction::Version::TWO,
            lock_time: absolute::LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint { txid: prev, vout: 1 },
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(2_000),
                script_pubkey: ScriptBuf::from_bytes(vec![0x51]),
            }],
        };
        let raw = format!("{}\n", hex::encode(bitcoin::consensus::serialize(&tx)));

        let decoded = decode_raw_transaction(&raw).unwrap();
        assert_eq!(decoded.compute_txid(), tx.compute_txid());
        assert_eq!(decoded.input[0].previous_output.vout, 1);
        assert_eq!(decoded.output[0].value.to_sat(), 2_000);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_raw_transaction("zz"),
            Err(QueryError::Decode(_))
        ));
        assert!(matches!(
            decode_raw_transaction("0200"),
            Err(QueryError::Decode(_))
        ));
    }
}
