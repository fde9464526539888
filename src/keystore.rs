//! Local persistence for generated account keys
//!
//! Keys live in one JSON file per account, grouped by network:
//! `<root>/<network_id>/<account_id>.json`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::account::AccountId;
use crate::crypto::KeyPair;

pub const DEFAULT_KEY_STORE_DIR: &str = ".provision-credentials";

#[derive(Error, Debug)]
pub enum KeyStoreError {
    #[error("Key file '{0}' already exists")]
    AlreadyExists(PathBuf),
    #[error("Invalid network id '{0}'")]
    InvalidNetworkId(String),
    #[error("Account id '{0}' cannot be used as a file name")]
    InvalidAccountId(String),
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Fails when `set_key` for this account could not succeed, so callers can
    /// stop before creating an account whose key would have nowhere to go.
    async fn ensure_vacant(
        &self,
        _network_id: &str,
        _account_id: &AccountId,
    ) -> Result<(), KeyStoreError> {
        Ok(())
    }

    async fn set_key(
        &self,
        network_id: &str,
        account_id: &AccountId,
        key_pair: &KeyPair,
    ) -> Result<(), KeyStoreError>;
}

#[derive(Serialize, Deserialize, Debug)]
struct StoredKey {
    account_id: AccountId,
    public_key: String,
    private_key: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct FileKeyStore {
    root: PathBuf,
}

impl FileKeyStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$HOME/.provision-credentials`, or the working directory when HOME is unset
    pub fn default_root() -> PathBuf {
        std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_default()
            .join(DEFAULT_KEY_STORE_DIR)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_path(&self, network_id: &str, account_id: &AccountId) -> Result<PathBuf, KeyStoreError> {
        if network_id.is_empty() || network_id.contains(['/', '\\']) || network_id == ".." {
            return Err(KeyStoreError::InvalidNetworkId(network_id.to_string()));
        }
        if account_id.as_str().contains(['/', '\\']) {
            return Err(KeyStoreError::InvalidAccountId(account_id.to_string()));
        }
        Ok(self
            .root
            .join(network_id)
            .join(format!("{}.json", account_id)))
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn ensure_vacant(
        &self,
        network_id: &str,
        account_id: &AccountId,
    ) -> Result<(), KeyStoreError> {
        let path = self.key_path(network_id, account_id)?;
        match tokio::fs::try_exists(&path).await {
            Ok(false) => Ok(()),
            Ok(true) => Err(KeyStoreError::AlreadyExists(path)),
            Err(e) => Err(KeyStoreError::Io {
                context: format!("checking {}", path.display()),
                source: e,
            }),
        }
    }

    async fn set_key(
        &self,
        network_id: &str,
        account_id: &AccountId,
        key_pair: &KeyPair,
    ) -> Result<(), KeyStoreError> {
        let path = self.key_path(network_id, account_id)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| KeyStoreError::Io {
                context: format!("creating {}", dir.display()),
                source: e,
            })?;
        }

        let stored = StoredKey {
            account_id: account_id.clone(),
            public_key: key_pair.public_key_string(),
            private_key: key_pair.secret_key_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&stored)?;

        debug!("Writing key for {} to {}", account_id, path.display());
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_new_file(&target, json.as_bytes()))
            .await
            .map_err(|e| KeyStoreError::Io {
                context: format!("writing {}", path.display()),
                source: std::io::Error::new(std::io::ErrorKind::Other, e),
            })??;
        info!("Key for {} on \"{}\" saved to {}", account_id, network_id, path.display());
        Ok(())
    }
}

/// Write to a temp file beside `path`, then link it in without clobbering.
/// A failed write leaves nothing behind: the temp file is removed on drop.
fn write_new_file(path: &Path, contents: &[u8]) -> Result<(), KeyStoreError> {
    use std::io::Write;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let io_error = |context: &str, source: std::io::Error| KeyStoreError::Io {
        context: format!("{} {}", context, path.display()),
        source,
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_error("creating temp file for", e))?;
    tmp.write_all(contents).map_err(|e| io_error("writing", e))?;
    tmp.as_file().sync_all().map_err(|e| io_error("syncing", e))?;

    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(KeyStoreError::AlreadyExists(path.to_path_buf()))
        }
        Err(e) => Err(io_error("persisting", e.error)),
    }
}
