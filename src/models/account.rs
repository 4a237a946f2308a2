use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::PollError;

const MIN_ACCOUNT_ID_LEN: usize = 2;
const MAX_ACCOUNT_ID_LEN: usize = 64;

lazy_static! {
    // Dot-separated parts of lowercase alphanumerics, '-' and '_' only between them
    static ref ACCOUNT_ID_RE: Regex =
        Regex::new(r"^(([a-z\d]+[-_])*[a-z\d]+\.)*([a-z\d]+[-_])*[a-z\d]+$").unwrap();
}

// Ledger account identifier, used both for people (poll owners, voters) and
// for contracts (the polling ledger, token collections).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = PollError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.len() < MIN_ACCOUNT_ID_LEN || value.len() > MAX_ACCOUNT_ID_LEN {
            return Err(PollError::InvalidInput(format!(
                "account id '{}' must be {}-{} characters long",
                value, MIN_ACCOUNT_ID_LEN, MAX_ACCOUNT_ID_LEN
            )));
        }
        if !ACCOUNT_ID_RE.is_match(&value) {
            return Err(PollError::InvalidInput(format!(
                "account id '{}' is malformed",
                value
            )));
        }
        Ok(Self(value))
    }
}

impl FromStr for AccountId {
    type Err = PollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_string())
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
