//! Account creation
//!
//! - Account identifiers in the dot-separated hierarchy
//! - Naming rules for top-level accounts and subaccounts
//! - Initial balance parsing
//! - Provisioning against a network client and key store

pub mod types;
pub mod naming;
pub mod balance;
pub mod provision;

pub use types::AccountId;
pub use naming::{Advisory, NamingValidator, NetworkConventionTable, Rejection, ValidationOutcome};
pub use provision::{Confirmation, KeyOrigin, ProvisionRequest, ProvisionStage, Provisioner};
