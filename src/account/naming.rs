//! Naming rules for new accounts
//!
//! Top-level names must be long; subaccounts must sit directly under the
//! master account. A root label that differs from the network's convention is
//! only advisory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::types::{root_label, AccountId};
use crate::error::InvalidArgument;

/// Minimum length of a top-level account name, counted in Unicode scalar
/// values (`chars()`). This differs from UTF-16 code unit counting for
/// characters outside the Basic Multilingual Plane: one emoji counts as 1 here,
/// not 2.
pub const TLA_MIN_LENGTH: usize = 32;

/// Network id -> conventional root label. Networks absent from the table
/// (local, ci, custom) are exempt from the convention check.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct NetworkConventionTable(BTreeMap<String, String>);

impl NetworkConventionTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    pub fn expected_root(&self, network_id: &str) -> Option<&str> {
        self.0.get(network_id).map(String::as_str)
    }
}

impl Default for NetworkConventionTable {
    fn default() -> Self {
        let entries = [
            ("production", "near"),
            ("default", "test"),
            ("development", "test"),
            ("devnet", "dev"),
            ("betanet", "beta"),
        ];
        Self(
            entries
                .iter()
                .map(|(net, tla)| (net.to_string(), tla.to_string()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NetworkConventionTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    TopLevelTooShort { min_length: usize },
    SuffixMismatch { master_account: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TopLevelTooShort { min_length } => write!(
                f,
                "Top-level accounts must be greater than {} characters.\n\
                 Note: this is for advanced usage only. Typical account names are of the form:\n\
                 app.alice.test, where the masterAccount shares the top-level account (.test).",
                min_length
            ),
            Rejection::SuffixMismatch { master_account } => write!(
                f,
                "New account doesn't share the same top-level account. Expecting account name to end in \".{}\".",
                master_account
            ),
        }
    }
}

/// Root label does not follow the network convention. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advisory {
    pub network_id: String,
    pub expected_root: String,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "In most cases, when connected to \"{}\" both account and masterAccount will end in \".{}\".",
            self.network_id, self.expected_root
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    Rejected(Rejection),
    Accepted { warning: Option<Advisory> },
}

impl ValidationOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ValidationOutcome::Rejected(_))
    }

    pub fn warning(&self) -> Option<&Advisory> {
        match self {
            ValidationOutcome::Accepted { warning } => warning.as_ref(),
            ValidationOutcome::Rejected(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NamingValidator {
    conventions: NetworkConventionTable,
}

impl NamingValidator {
    pub fn new(conventions: NetworkConventionTable) -> Self {
        Self { conventions }
    }

    /// Check a requested name against the master account and network.
    /// Only an empty `account_id` is an error; rule violations are outcomes.
    pub fn validate(
        &self,
        account_id: &str,
        master_account_id: &str,
        network_id: &str,
    ) -> Result<ValidationOutcome, InvalidArgument> {
        let account = AccountId::parse(account_id)?;
        Ok(self.validate_id(&account, master_account_id, network_id))
    }

    pub fn validate_id(
        &self,
        account: &AccountId,
        master_account_id: &str,
        network_id: &str,
    ) -> ValidationOutcome {
        let suffix = match account.parent_suffix() {
            None => {
                if account.as_str().chars().count() < TLA_MIN_LENGTH {
                    return ValidationOutcome::Rejected(Rejection::TopLevelTooShort {
                        min_length: TLA_MIN_LENGTH,
                    });
                }
                return ValidationOutcome::Accepted { warning: None };
            }
            Some(suffix) => suffix,
        };

        if suffix != master_account_id {
            return ValidationOutcome::Rejected(Rejection::SuffixMismatch {
                master_account: master_account_id.to_string(),
            });
        }

        let master_root = root_label(master_account_id);
        let account_root = account.root_label();
        let warning = match self.conventions.expected_root(network_id) {
            Some(expected) if expected != master_root || expected != account_root => {
                Some(Advisory {
                    network_id: network_id.to_string(),
                    expected_root: expected.to_string(),
                })
            }
            _ => None,
        };

        ValidationOutcome::Accepted { warning }
    }
}
