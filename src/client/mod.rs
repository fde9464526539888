// Client module
pub mod rpc_client;

use async_trait::async_trait;
use thiserror::Error;

use crate::account::AccountId;

pub use rpc_client::RpcClient;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateAccountError {
    /// The network refused the request (name taken, master account underfunded, ...)
    #[error("Rejected by network: {message}")]
    Rejected { message: String },
    #[error("RPC request failed: {0}")]
    Transport(String),
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccount {
    pub tx_hash: Option<String>,
}

/// Remote side of account creation. Implementations own signing, funding and retries.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn create_account(
        &self,
        account_id: &AccountId,
        public_key: &str,
    ) -> Result<CreatedAccount, CreateAccountError>;
}
