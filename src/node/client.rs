//! JSON-RPC client for the chain node
//!
//! Speaks the platform chain's JSON-RPC 2.0 endpoint for alias lookup
//! and transaction issuance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::node::{AliasInfo, AliasResolver, NodeError, NodeGateway};

#[derive(Serialize)]
struct RpcRequest<P: Serialize> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Serialize)]
struct GetMultisigAliasParams<'a> {
    #[serde(rename = "Address")]
    address: &'a str,
}

#[derive(Serialize)]
struct IssueTxParams {
    tx: String,
    encoding: &'static str,
}

#[derive(Deserialize)]
struct IssueTxReply {
    #[serde(rename = "txID")]
    tx_id: String,
}

/// HTTP client for the chain node's platform endpoint
pub struct NodeClient {
    base_url: String,
    http: reqwest::Client,
}

impl NodeClient {
    /// Create a client for the node at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    async fn call<P: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        method: &'static str,
        params: P,
    ) -> Result<RpcResponse<R>, NodeError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .http
            .post(format!("{}/ext/bc/P", self.base_url))
            .json(&request)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl AliasResolver for NodeClient {
    async fn get_alias_info(&self, alias: &str) -> Result<AliasInfo, NodeError> {
        let response: RpcResponse<AliasInfo> = self
            .call(
                "platform.getMultisigAlias",
                GetMultisigAliasParams { address: alias },
            )
            .await?;

        if let Some(error) = response.error {
            log::debug!("alias lookup rejected by node: {}", error.message);
            return Err(NodeError::AliasNotFound);
        }
        response.result.ok_or(NodeError::AliasNotFound)
    }
}

#[async_trait]
impl NodeGateway for NodeClient {
    async fn issue_tx(&self, signed_tx_bytes: &[u8]) -> Result<String, NodeError> {
        let response: RpcResponse<IssueTxReply> = self
            .call(
                "platform.issueTx",
                IssueTxParams {
                    tx: format!("0x{}", hex::encode(signed_tx_bytes)),
                    encoding: "hex",
                },
            )
            .await?;

        if let Some(error) = response.error {
            return Err(NodeError::Rpc(error.message));
        }
        response
            .result
            .map(|reply| reply.tx_id)
            .ok_or_else(|| NodeError::Rpc("empty issueTx response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_info_response_parsing() {
        let body = r#"{
            "jsonrpc": "2.0",
            "result": {
                "memo": "0x",
                "addresses": ["test-addr-a", "test-addr-b"],
                "threshold": "2"
            },
            "id": 1
        }"#;

        let response: RpcResponse<AliasInfo> = serde_json::from_str(body).unwrap();
        let info = response.result.unwrap();
        assert_eq!(info.addresses.len(), 2);
        assert_eq!(info.threshold, "2");
    }

    #[test]
    fn test_error_response_parsing() {
        let body = r#"{
            "jsonrpc": "2.0",
            "error": {"code": -32600, "message": "alias not found"},
            "id": 1
        }"#;

        let response: RpcResponse<AliasInfo> = serde_json::from_str(body).unwrap();
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().message, "alias not found");
    }

    #[test]
    fn test_issue_tx_reply_parsing() {
        let body = r#"{"jsonrpc": "2.0", "result": {"txID": "2QouvFWUbjuySRxeX5xMbNCuAaKWfbk5FeEa2JmoF85RKLk2dD"}, "id": 1}"#;
        let response: RpcResponse<IssueTxReply> = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.result.unwrap().tx_id,
            "2QouvFWUbjuySRxeX5xMbNCuAaKWfbk5FeEa2JmoF85RKLk2dD"
        );
    }

    #[test]
    fn test_request_shape() {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "platform.getMultisigAlias",
            params: GetMultisigAliasParams {
                address: "test-alias",
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["method"], "platform.getMultisigAlias");
        assert_eq!(json["params"]["Address"], "test-alias");
    }
}
