//! Account provisioning: validate the name, resolve a key, create the account,
//! then persist the key if it was generated here.

use std::sync::Arc;

use super::naming::{Advisory, NamingValidator, ValidationOutcome};
use super::types::AccountId;
use crate::client::NetworkClient;
use crate::crypto::{KeyPair, KeyPairGenerator, OsKeyPairGenerator};
use crate::error::ProvisionError;
use crate::keystore::KeyStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub account_id: String,
    pub master_account_id: String,
    pub network_id: String,
    /// Caller-owned key; when absent a key pair is generated and stored locally
    pub public_key: Option<String>,
}

pub enum KeyMaterial {
    Supplied { public_key: String },
    Generated(KeyPair),
}

impl KeyMaterial {
    pub fn public_key(&self) -> String {
        match self {
            KeyMaterial::Supplied { public_key } => public_key.clone(),
            KeyMaterial::Generated(kp) => kp.public_key_string(),
        }
    }

    pub fn origin(&self) -> KeyOrigin {
        match self {
            KeyMaterial::Supplied { .. } => KeyOrigin::Supplied,
            KeyMaterial::Generated(_) => KeyOrigin::Generated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Supplied by the caller; nothing was stored locally
    Supplied,
    /// Generated here and written to the key store
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProvisionStage {
    Start,
    Validated,
    KeyResolved,
    AccountCreated,
    KeyPersisted,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub account_id: AccountId,
    pub network_id: String,
    pub public_key: String,
    pub key_origin: KeyOrigin,
    pub warning: Option<Advisory>,
    pub tx_hash: Option<String>,
    /// Stages passed through, in order
    pub stages: Vec<ProvisionStage>,
}

pub struct Provisioner {
    validator: NamingValidator,
    key_generator: Arc<dyn KeyPairGenerator>,
}

impl Provisioner {
    pub fn new(validator: NamingValidator) -> Self {
        Self {
            validator,
            key_generator: Arc::new(OsKeyPairGenerator),
        }
    }

    pub fn with_key_generator(mut self, key_generator: Arc<dyn KeyPairGenerator>) -> Self {
        self.key_generator = key_generator;
        self
    }

    /// Run a single account creation. At most one network call and one key
    /// store write are made, in that order; nothing is retried. A generated key
    /// is checked against the key store before the network is contacted.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
        network: &dyn NetworkClient,
        key_store: &dyn KeyStore,
    ) -> Result<Confirmation, ProvisionError> {
        let mut stages = vec![ProvisionStage::Start];

        let account_id = AccountId::parse(&request.account_id)?;
        let warning = match self.validator.validate_id(
            &account_id,
            &request.master_account_id,
            &request.network_id,
        ) {
            ValidationOutcome::Rejected(rejection) => {
                return Err(ProvisionError::InvalidName { rejection })
            }
            ValidationOutcome::Accepted { warning } => warning,
        };
        stages.push(ProvisionStage::Validated);

        let key = match &request.public_key {
            Some(public_key) => KeyMaterial::Supplied {
                public_key: public_key.clone(),
            },
            None => KeyMaterial::Generated(self.key_generator.generate()),
        };
        if let KeyMaterial::Generated(_) = key {
            if let Err(source) = key_store
                .ensure_vacant(&request.network_id, &account_id)
                .await
            {
                return Err(ProvisionError::KeyStoreUnavailable {
                    account_id,
                    warning,
                    source,
                });
            }
        }
        let public_key = key.public_key();
        stages.push(ProvisionStage::KeyResolved);

        let created = match network.create_account(&account_id, &public_key).await {
            Ok(created) => created,
            Err(source) => return Err(ProvisionError::CreationFailed { warning, source }),
        };
        stages.push(ProvisionStage::AccountCreated);

        let key_origin = key.origin();
        if let KeyMaterial::Generated(key_pair) = key {
            if let Err(source) = key_store
                .set_key(&request.network_id, &account_id, &key_pair)
                .await
            {
                return Err(ProvisionError::PersistenceFailed {
                    account_id,
                    network_id: request.network_id.clone(),
                    key_pair: Box::new(key_pair),
                    warning,
                    source,
                });
            }
            stages.push(ProvisionStage::KeyPersisted);
        }
        stages.push(ProvisionStage::Done);

        Ok(Confirmation {
            account_id,
            network_id: request.network_id.clone(),
            public_key,
            key_origin,
            warning,
            tx_hash: created.tx_hash,
            stages,
        })
    }
}

impl Default for Provisioner {
    fn default() -> Self {
        Self::new(NamingValidator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::naming::Rejection;
    use crate::client::{CreateAccountError, CreatedAccount};
    use crate::error::InvalidArgument;
    use crate::keystore::KeyStoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockNetwork {
        calls: Mutex<Vec<(String, String)>>,
        fail_with: Option<CreateAccountError>,
    }

    impl MockNetwork {
        fn ok() -> Self {
            Self { calls: Mutex::new(vec![]), fail_with: None }
        }

        fn failing(err: CreateAccountError) -> Self {
            Self { calls: Mutex::new(vec![]), fail_with: Some(err) }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NetworkClient for MockNetwork {
        async fn create_account(
            &self,
            account_id: &AccountId,
            public_key: &str,
        ) -> Result<CreatedAccount, CreateAccountError> {
            self.calls
                .lock()
                .unwrap()
                .push((account_id.to_string(), public_key.to_string()));
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(CreatedAccount { tx_hash: Some("tx1".to_string()) }),
            }
        }
    }

    #[derive(Default)]
    struct MockKeyStore {
        saved: Mutex<Vec<(String, String, String)>>,
        fail: bool,
        occupied: bool,
    }

    impl MockKeyStore {
        fn failing() -> Self {
            Self { fail: true, ..Default::default() }
        }

        fn occupied() -> Self {
            Self { occupied: true, ..Default::default() }
        }

        fn saved(&self) -> Vec<(String, String, String)> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl KeyStore for MockKeyStore {
        async fn ensure_vacant(
            &self,
            network_id: &str,
            account_id: &AccountId,
        ) -> Result<(), KeyStoreError> {
            if self.occupied {
                return Err(KeyStoreError::AlreadyExists(
                    format!("{}/{}.json", network_id, account_id).into(),
                ));
            }
            Ok(())
        }

        async fn set_key(
            &self,
            network_id: &str,
            account_id: &AccountId,
            key_pair: &KeyPair,
        ) -> Result<(), KeyStoreError> {
            self.saved.lock().unwrap().push((
                network_id.to_string(),
                account_id.to_string(),
                key_pair.public_key_string(),
            ));
            if self.fail {
                return Err(KeyStoreError::Io {
                    context: "disk full".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            Ok(())
        }
    }

    struct FixedKeys;

    impl KeyPairGenerator for FixedKeys {
        fn generate(&self) -> KeyPair {
            KeyPair::from_seed([42u8; 32])
        }
    }

    fn request(account: &str, master: &str, public_key: Option<&str>) -> ProvisionRequest {
        ProvisionRequest {
            account_id: account.to_string(),
            master_account_id: master.to_string(),
            network_id: "default".to_string(),
            public_key: public_key.map(str::to_string),
        }
    }

    fn provisioner() -> Provisioner {
        Provisioner::default().with_key_generator(Arc::new(FixedKeys))
    }

    #[tokio::test]
    async fn test_generated_key_is_created_then_stored_once() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::default();
        let expected_key = KeyPair::from_seed([42u8; 32]).public_key_string();

        let confirmation = provisioner()
            .provision(&request("app.alice.test", "alice.test", None), &network, &store)
            .await
            .unwrap();

        assert_eq!(network.calls(), vec![("app.alice.test".to_string(), expected_key.clone())]);
        assert_eq!(
            store.saved(),
            vec![("default".to_string(), "app.alice.test".to_string(), expected_key.clone())]
        );
        assert_eq!(confirmation.account_id.as_str(), "app.alice.test");
        assert_eq!(confirmation.network_id, "default");
        assert_eq!(confirmation.public_key, expected_key);
        assert_eq!(confirmation.key_origin, KeyOrigin::Generated);
        assert_eq!(confirmation.tx_hash.as_deref(), Some("tx1"));
        assert_eq!(
            confirmation.stages,
            vec![
                ProvisionStage::Start,
                ProvisionStage::Validated,
                ProvisionStage::KeyResolved,
                ProvisionStage::AccountCreated,
                ProvisionStage::KeyPersisted,
                ProvisionStage::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_creation_never_stores_key() {
        let network = MockNetwork::failing(CreateAccountError::Rejected {
            message: "already exists".to_string(),
        });
        let store = MockKeyStore::default();

        let err = provisioner()
            .provision(&request("app.alice.test", "alice.test", None), &network, &store)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::CreationFailed { source: CreateAccountError::Rejected { .. }, .. }
        ));
        assert!(!err.is_critical());
        assert_eq!(network.calls().len(), 1);
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let network = MockNetwork::failing(CreateAccountError::Transport("connection refused".to_string()));
        let store = MockKeyStore::default();

        let err = provisioner()
            .provision(&request("app.alice.test", "alice.test", None), &network, &store)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::CreationFailed { source: CreateAccountError::Transport(_), .. }
        ));
        assert_eq!(network.calls().len(), 1);
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn test_supplied_key_is_not_stored() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::default();

        let confirmation = provisioner()
            .provision(&request("app.alice.test", "alice.test", Some("ed25519:feed")), &network, &store)
            .await
            .unwrap();

        assert_eq!(network.calls(), vec![("app.alice.test".to_string(), "ed25519:feed".to_string())]);
        assert!(store.saved().is_empty());
        assert_eq!(confirmation.key_origin, KeyOrigin::Supplied);
        assert!(!confirmation.stages.contains(&ProvisionStage::KeyPersisted));
        assert_eq!(confirmation.stages.last(), Some(&ProvisionStage::Done));
    }

    #[tokio::test]
    async fn test_rejected_name_contacts_nothing() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::default();

        let err = provisioner()
            .provision(&request("sub.bob.near", "bob.test", None), &network, &store)
            .await
            .unwrap_err();

        match err {
            ProvisionError::InvalidName { rejection } => assert_eq!(
                rejection,
                Rejection::SuffixMismatch { master_account: "bob.test".to_string() }
            ),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(network.calls().is_empty());
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn test_empty_account_is_invalid_argument() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::default();

        let err = provisioner()
            .provision(&request("", "alice.test", None), &network, &store)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::InvalidArgument(InvalidArgument::EmptyAccountId)));
        assert!(network.calls().is_empty());
    }

    #[tokio::test]
    async fn test_warning_is_carried_through() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::default();

        let confirmation = provisioner()
            .provision(&request("x.carol.near", "carol.near", None), &network, &store)
            .await
            .unwrap();

        let warning = confirmation.warning.unwrap();
        assert_eq!(warning.expected_root, "test");
        assert_eq!(network.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_critical_and_keeps_key() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::failing();

        let err = provisioner()
            .provision(&request("app.alice.test", "alice.test", None), &network, &store)
            .await
            .unwrap_err();

        assert!(err.is_critical());
        match err {
            ProvisionError::PersistenceFailed { account_id, network_id, key_pair, warning, .. } => {
                assert_eq!(warning, None);
                assert_eq!(account_id.as_str(), "app.alice.test");
                assert_eq!(network_id, "default");
                assert_eq!(key_pair.secret_key_string(), KeyPair::from_seed([42u8; 32]).secret_key_string());
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(network.calls().len(), 1);
        assert_eq!(store.saved().len(), 1);
    }

    #[tokio::test]
    async fn test_warning_survives_failed_creation() {
        let network = MockNetwork::failing(CreateAccountError::Transport("down".to_string()));
        let store = MockKeyStore::default();

        let err = provisioner()
            .provision(&request("x.carol.near", "carol.near", None), &network, &store)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::CreationFailed { .. }));
        let warning = err.warning().unwrap();
        assert!(warning.to_string().starts_with("In most cases, when connected to \"default\""));
        assert_eq!(warning.expected_root, "test");
    }

    #[tokio::test]
    async fn test_warning_survives_failed_persistence() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::failing();

        let err = provisioner()
            .provision(&request("x.carol.near", "carol.near", None), &network, &store)
            .await
            .unwrap_err();

        assert!(err.is_critical());
        assert_eq!(err.warning().map(|w| w.expected_root.as_str()), Some("test"));
    }

    #[tokio::test]
    async fn test_occupied_key_slot_stops_before_creation() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::occupied();

        let err = provisioner()
            .provision(&request("x.carol.near", "carol.near", None), &network, &store)
            .await
            .unwrap_err();

        match &err {
            ProvisionError::KeyStoreUnavailable { account_id, source, .. } => {
                assert_eq!(account_id.as_str(), "x.carol.near");
                assert!(matches!(source, KeyStoreError::AlreadyExists(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.warning().is_some());
        assert!(!err.is_critical());
        assert!(network.calls().is_empty());
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn test_supplied_key_skips_key_store_check() {
        let network = MockNetwork::ok();
        let store = MockKeyStore::occupied();

        provisioner()
            .provision(&request("app.alice.test", "alice.test", Some("ed25519:feed")), &network, &store)
            .await
            .unwrap();

        assert_eq!(network.calls().len(), 1);
        assert!(store.saved().is_empty());
    }
}
