// RPC client for making JSON-RPC requests
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CreateAccountError, CreatedAccount, NetworkClient};
use crate::account::AccountId;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateAccountParams {
    pub new_account_id: String,
    pub master_account_id: String,
    pub public_key: String,
    /// Smallest token unit, sent as a string to avoid JSON number precision loss
    pub amount: String,
}

pub struct RpcClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
    master_account: String,
    initial_balance: u128,
}

impl RpcClient {
    pub fn new(url: String, master_account: String, initial_balance: u128) -> Self {
        Self {
            url,
            client: Client::new(),
            request_id: AtomicU64::new(1),
            master_account,
            initial_balance,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, CreateAccountError> {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CreateAccountError::Transport(e.to_string()))?;
        Ok(self)
    }

    pub fn create_account_params(&self, account_id: &AccountId, public_key: &str) -> CreateAccountParams {
        CreateAccountParams {
            new_account_id: account_id.to_string(),
            master_account_id: self.master_account.clone(),
            public_key: public_key.to_string(),
            amount: self.initial_balance.to_string(),
        }
    }

    // Helper for sending requests
    async fn send_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, CreateAccountError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        debug!("RPC {} -> {} (id {})", method, self.url, id);
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CreateAccountError::Transport(e.to_string()))?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CreateAccountError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        interpret_response(json)
    }
}

/// Split a JSON-RPC envelope into its result or a classified error.
pub fn interpret_response(json: serde_json::Value) -> Result<serde_json::Value, CreateAccountError> {
    if let Some(error) = json.get("error") {
        let message = error["message"]
            .as_str()
            .map(str::to_string)
            .or_else(|| error.as_str().map(str::to_string))
            .unwrap_or_else(|| error.to_string());
        warn!("RPC error: {}", message);
        return Err(CreateAccountError::Rejected { message });
    }

    match json.get("result") {
        Some(result) => Ok(result.clone()),
        None => Err(CreateAccountError::InvalidResponse(
            "response has neither 'result' nor 'error'".to_string(),
        )),
    }
}

#[async_trait]
impl NetworkClient for RpcClient {
    async fn create_account(
        &self,
        account_id: &AccountId,
        public_key: &str,
    ) -> Result<CreatedAccount, CreateAccountError> {
        let params = self.create_account_params(account_id, public_key);
        let params = serde_json::to_value(params)
            .map_err(|e| CreateAccountError::InvalidResponse(e.to_string()))?;
        let res = self.send_request("createAccount", params).await?;
        Ok(CreatedAccount {
            tx_hash: res["tx_hash"].as_str().map(str::to_string),
        })
    }
}
