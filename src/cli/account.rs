use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error};

use crate::account::balance::{parse_initial_balance, DEFAULT_INITIAL_BALANCE};
use crate::account::{Confirmation, NamingValidator, ProvisionRequest, Provisioner};
use crate::client::RpcClient;
use crate::config::ProvisionConfig;
use crate::error::ProvisionError;
use crate::keystore::FileKeyStore;

#[derive(Args, Debug, Clone)]
pub struct CreateAccountArgs {
    /// Unique identifier for the newly created account
    pub account_id: String,

    /// Account used to create requested account
    #[arg(long)]
    pub master_account: String,

    /// Public key to initialize the account with
    #[arg(long)]
    pub public_key: Option<String>,

    /// Number of tokens to transfer to newly created account
    #[arg(long, default_value = DEFAULT_INITIAL_BALANCE)]
    pub initial_balance: String,
}

/// Process exit status for each terminal state of `create-account`.
pub fn exit_code(result: &Result<Confirmation, ProvisionError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(ProvisionError::InvalidName { .. }) | Err(ProvisionError::InvalidArgument(_)) => 2,
        Err(ProvisionError::KeyStoreUnavailable { .. }) | Err(ProvisionError::CreationFailed { .. }) => 1,
        Err(ProvisionError::PersistenceFailed { .. }) => 3,
    }
}

pub async fn handle_create_account_command(
    args: CreateAccountArgs,
    config: &ProvisionConfig,
    key_store_dir: Option<PathBuf>,
) -> ExitCode {
    let network_id = config.network.network_id.clone();

    let initial_balance = match parse_initial_balance(&args.initial_balance) {
        Ok(amount) => amount,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let client = RpcClient::new(
        config.network.node_url.clone(),
        args.master_account.clone(),
        initial_balance,
    );
    let client = match client.with_timeout(Duration::from_secs(config.network.request_timeout_secs)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    let key_store_dir = key_store_dir
        .or_else(|| config.network.key_store_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(FileKeyStore::default_root);
    let key_store = FileKeyStore::new(key_store_dir);
    debug!("Using key store at {}", key_store.root().display());

    let provisioner = Provisioner::new(NamingValidator::new(config.network_suffixes.clone()));
    let request = ProvisionRequest {
        account_id: args.account_id,
        master_account_id: args.master_account,
        network_id,
        public_key: args.public_key,
    };

    let result = provisioner.provision(&request, &client, &key_store).await;
    report(&result);
    ExitCode::from(exit_code(&result))
}

/// Advisory for a name that passed validation, whether or not provisioning finished.
pub fn advisory_note(result: &Result<Confirmation, ProvisionError>) -> Option<String> {
    let warning = match result {
        Ok(confirmation) => confirmation.warning.as_ref(),
        Err(e) => e.warning(),
    };
    warning.map(|w| format!("NOTE: {}", w))
}

fn report(result: &Result<Confirmation, ProvisionError>) {
    if let Some(note) = advisory_note(result) {
        eprintln!("{}", note);
    }
    match result {
        Ok(confirmation) => {
            println!(
                "Account {} for network \"{}\" was created.",
                confirmation.account_id, confirmation.network_id
            );
            if let Some(tx_hash) = &confirmation.tx_hash {
                println!("Transaction: {}", tx_hash);
            }
        }
        Err(ProvisionError::InvalidName { rejection }) => {
            eprintln!("{}", rejection);
        }
        Err(ProvisionError::PersistenceFailed { account_id, network_id, key_pair, source, .. }) => {
            error!("Key persistence failed after account creation: {}", source);
            eprintln!("\nCRITICAL: Account {} exists on \"{}\" but its key was NOT saved: {}", account_id, network_id, source);
            eprintln!("Record this key now. It is not stored anywhere else:");
            eprintln!("---------------------------------------------------------------");
            eprintln!("Public Key:  {}", key_pair.public_key_string());
            eprintln!("Private Key: {}", key_pair.secret_key_string());
            eprintln!("---------------------------------------------------------------");
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }
}
