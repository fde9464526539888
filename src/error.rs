use thiserror::Error;

use crate::account::naming::{Advisory, Rejection};
use crate::account::AccountId;
use crate::client::CreateAccountError;
use crate::crypto::KeyPair;
use crate::keystore::KeyStoreError;

/// Caller contract violations, detected before any rule is evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("Account id must not be empty")]
    EmptyAccountId,
    #[error("Invalid initial balance '{value}': {reason}")]
    InvalidBalance { value: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
    #[error("{rejection}")]
    InvalidName { rejection: Rejection },
    #[error("Key store cannot take a key for {account_id}: {source}")]
    KeyStoreUnavailable {
        account_id: AccountId,
        warning: Option<Advisory>,
        #[source]
        source: KeyStoreError,
    },
    #[error("Account creation failed: {source}")]
    CreationFailed {
        warning: Option<Advisory>,
        #[source]
        source: CreateAccountError,
    },
    #[error(
        "Account {account_id} was created on \"{network_id}\" but its key {} could not be saved: {source}",
        .key_pair.public_key_string()
    )]
    PersistenceFailed {
        account_id: AccountId,
        network_id: String,
        key_pair: Box<KeyPair>,
        warning: Option<Advisory>,
        #[source]
        source: KeyStoreError,
    },
}

impl ProvisionError {
    /// The account exists remotely but the only copy of its secret key is in memory.
    pub fn is_critical(&self) -> bool {
        matches!(self, ProvisionError::PersistenceFailed { .. })
    }

    /// Advisory raised by a name that passed validation, kept on later failures.
    pub fn warning(&self) -> Option<&Advisory> {
        match self {
            ProvisionError::KeyStoreUnavailable { warning, .. }
            | ProvisionError::CreationFailed { warning, .. }
            | ProvisionError::PersistenceFailed { warning, .. } => warning.as_ref(),
            ProvisionError::InvalidArgument(_) | ProvisionError::InvalidName { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error reading config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Error parsing config '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
