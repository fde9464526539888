//! Account identifier for the dot-separated account hierarchy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidArgument;

pub const LABEL_SEPARATOR: char = '.';

/// A non-empty account identifier such as `app.alice.test`.
///
/// Labels are opaque: no charset rules are applied here, and splitting is on
/// the exact separator with no trimming.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn parse(s: &str) -> Result<Self, InvalidArgument> {
        if s.is_empty() {
            return Err(InvalidArgument::EmptyAccountId);
        }
        Ok(AccountId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.split(LABEL_SEPARATOR)
    }

    /// True when the id has no separator
    pub fn is_top_level(&self) -> bool {
        !self.0.contains(LABEL_SEPARATOR)
    }

    /// Last label, conventionally tied to the network environment
    pub fn root_label(&self) -> &str {
        root_label(&self.0)
    }

    /// Everything after the leftmost label, e.g. `alice.test` for `app.alice.test`.
    pub fn parent_suffix(&self) -> Option<&str> {
        self.0
            .split_once(LABEL_SEPARATOR)
            .map(|(_, suffix)| suffix)
    }
}

/// Last label of any dotted name, the whole string when it has no separator.
pub fn root_label(name: &str) -> &str {
    name.rsplit(LABEL_SEPARATOR).next().unwrap_or(name)
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = InvalidArgument;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountId::parse(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidArgument;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Err(InvalidArgument::EmptyAccountId);
        }
        Ok(AccountId(s))
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
