use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use rust_provision::cli::{self, Cli, Commands};
use rust_provision::config::ProvisionConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match ProvisionConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };
    if let Some(network_id) = cli.network_id {
        config.network.network_id = network_id;
    }
    if let Some(node_url) = cli.node_url {
        config.network.node_url = node_url;
    }

    match cli.command {
        Commands::CreateAccount(args) => {
            cli::account::handle_create_account_command(args, &config, cli.key_store).await
        }
    }
}
