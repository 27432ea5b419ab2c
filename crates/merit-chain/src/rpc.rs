use crate::{ChainConfig, ChainError, ChainResult, HoldingsSource, ReceiptSource, ReceiptView};
use alloy_primitives::{Address, Bytes, Log, LogData, B256, U256, U64};
use alloy_sol_types::{sol, SolCall};
use backoff::future::retry;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};

sol! {
    interface IERC1155 {
        function balanceOf(address account, uint256 id) external view returns (uint256);
    }
}

/// JSON-RPC client for the authoritative node. Implements both adapter
/// traits: receipts via `eth_getTransactionReceipt`, holdings via an
/// `eth_call` to the token contract.
pub struct RpcClient {
    http: reqwest::Client,
    config: ChainConfig,
}

impl RpcClient {
    pub fn new(config: ChainConfig) -> ChainResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ChainResult<T> {
        trace!(method, %params, "sending RPC request");
        let body = json!({ "jsonrpc": "2.0", "id": 1, "method": method, "params": params });
        let response = self
            .http
            .post(self.config.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Transport(format!("HTTP status {status}")));
        }
        let envelope: RpcEnvelope = response
            .json()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        if let Some(err) = envelope.error {
            return Err(ChainError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        serde_json::from_value(envelope.result.unwrap_or(serde_json::Value::Null))
            .map_err(|e| ChainError::Decode(e.to_string()))
    }

    async fn call_with_retry<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ChainResult<T> {
        retry(self.config.retry_backoff.clone(), || async {
            self.call(method, params.clone()).await.map_err(|e| {
                if e.is_transient() {
                    backoff::Error::Transient {
                        err: e,
                        retry_after: None,
                    }
                } else {
                    backoff::Error::Permanent(e)
                }
            })
        })
        .await
    }
}

#[async_trait::async_trait]
impl ReceiptSource for RpcClient {
    async fn transaction_receipt(&self, hash: B256) -> ChainResult<Option<ReceiptView>> {
        let body: Option<ReceiptBody> = self
            .call_with_retry("eth_getTransactionReceipt", json!([hash]))
            .await?;
        let Some(body) = body else {
            debug!(tx = %hash, "receipt not observable yet");
            return Ok(None);
        };
        Ok(Some(body.into_view()))
    }
}

#[async_trait::async_trait]
impl HoldingsSource for RpcClient {
    async fn erc1155_balance(
        &self,
        contract: Address,
        owner: Address,
        token_id: U256,
    ) -> ChainResult<U256> {
        let calldata = IERC1155::balanceOfCall {
            account: owner,
            id: token_id,
        }
        .abi_encode();
        let params = json!([{ "to": contract, "data": Bytes::from(calldata) }, "latest"]);
        let output: Bytes = self.call_with_retry("eth_call", params).await?;
        if output.len() < 32 {
            return Err(ChainError::Decode(format!(
                "balanceOf returned {} bytes, expected 32",
                output.len()
            )));
        }
        Ok(U256::from_be_slice(&output[..32]))
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptBody {
    #[serde(default)]
    status: Option<U64>,
    from: Address,
    to: Option<Address>,
    #[serde(default)]
    block_number: Option<U64>,
    logs: Vec<LogBody>,
}

#[derive(Debug, Deserialize)]
struct LogBody {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
}

impl ReceiptBody {
    fn into_view(self) -> ReceiptView {
        ReceiptView {
            status: self.status.is_some_and(|s| s == U64::from(1)),
            from: self.from,
            to: self.to,
            block_number: self.block_number.map(|n| n.to::<u64>()),
            logs: self
                .logs
                .into_iter()
                .map(|log| Log {
                    address: log.address,
                    data: LogData::new_unchecked(log.topics, log.data),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receipt_body_maps_to_view() {
        let value = json!({
            "status": "0x1",
            "from": "0x2222222222222222222222222222222222222222",
            "to": "0x3333333333333333333333333333333333333333",
            "blockNumber": "0x10",
            "logs": [{
                "address": "0x3333333333333333333333333333333333333333",
                "topics": ["0x0000000000000000000000000000000000000000000000000000000000000001"],
                "data": "0x00"
            }],
        });

        let body: ReceiptBody = serde_json::from_value(value).expect("receipt should parse");
        let view = body.into_view();

        assert!(view.status);
        assert_eq!(view.from, Address::repeat_byte(0x22));
        assert_eq!(view.block_number, Some(16));
        assert_eq!(view.logs.len(), 1);
        assert_eq!(view.logs[0].data.topics().len(), 1);
    }

    #[test]
    fn reverted_receipt_maps_to_failed_status() {
        let value = json!({
            "status": "0x0",
            "from": "0x2222222222222222222222222222222222222222",
            "to": null,
            "logs": [],
        });

        let body: ReceiptBody = serde_json::from_value(value).expect("receipt should parse");
        let view = body.into_view();

        assert!(!view.status);
        assert_eq!(view.to, None);
        assert_eq!(view.block_number, None);
    }

    #[test]
    fn balance_of_selector_matches_abi() {
        let expected = &alloy_primitives::keccak256(b"balanceOf(address,uint256)")[..4];
        assert_eq!(IERC1155::balanceOfCall::SELECTOR.as_slice(), expected);
    }
}
