pub mod account;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "provision")]
#[command(about = "Create named accounts on a hierarchical-namespace network", long_about = None)]
pub struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Network to connect to (overrides config)
    #[arg(long, global = true, env = "PROVISION_NETWORK")]
    pub network_id: Option<String>,

    /// JSON-RPC endpoint of the node (overrides config)
    #[arg(long, global = true, env = "PROVISION_NODE_URL")]
    pub node_url: Option<String>,

    /// Directory for generated keys (overrides config)
    #[arg(long, global = true)]
    pub key_store: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new account (subaccount of the master account, ex: app.alice.test)
    CreateAccount(account::CreateAccountArgs),
}
