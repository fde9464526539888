pub mod account;
pub mod error;
pub mod client;
pub mod crypto;
pub mod keystore;
pub mod cli;
pub mod config;
