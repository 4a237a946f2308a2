pub mod account;
pub mod error;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub use account::AccountId;
pub use error::{PollError, Result};

pub type TokenId = String;
pub type AnswerIndex = u32;
pub type PollId = u64;

pub const DEFAULT_META: &str = "{}";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Poll {
    pub nft_contract_id: AccountId,
    pub owner_id: AccountId,
    pub name: String,
    pub description: String,
    #[serde(default = "default_meta")]
    pub meta: String,
    pub answers: Vec<String>,
    #[serde(default)]
    pub votes: BTreeMap<TokenId, AnswerIndex>,
    #[serde(default)]
    pub status: PollStatus,
}

fn default_meta() -> String {
    DEFAULT_META.to_string()
}

impl Poll {
    pub fn is_open(&self) -> bool {
        self.status == PollStatus::Open
    }

    pub fn has_answer(&self, index: AnswerIndex) -> bool {
        (index as usize) < self.answers.len()
    }
}

// On the wire the status is an integer: 0 for open, 1 for closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PollStatus {
    #[default]
    Open,
    Closed,
}

impl TryFrom<u8> for PollStatus {
    type Error = PollError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(PollStatus::Open),
            1 => Ok(PollStatus::Closed),
            other => Err(PollError::InvalidInput(format!("unknown poll status {}", other))),
        }
    }
}

impl From<PollStatus> for u8 {
    fn from(status: PollStatus) -> Self {
        match status {
            PollStatus::Open => 0,
            PollStatus::Closed => 1,
        }
    }
}

// A poll as submitted by its creator, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollDraft {
    pub nft_contract_id: AccountId,
    pub owner_id: AccountId,
    pub name: String,
    pub description: String,
    #[serde(default = "default_meta")]
    pub meta: String,
    pub answers: Vec<String>,
}

impl PollDraft {
    pub fn new(
        nft_contract_id: AccountId,
        owner_id: AccountId,
        name: impl Into<String>,
        description: impl Into<String>,
        answers: Vec<String>,
    ) -> Self {
        Self {
            nft_contract_id,
            owner_id,
            name: name.into(),
            description: description.into(),
            meta: default_meta(),
            answers,
        }
    }
}

// Tokens an account holds in the gating collection.
//
// Behaves as a set (duplicates are dropped) but keeps the order in which
// tokens were first seen, so token selection is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedTokens(Vec<TokenId>);

impl OwnedTokens {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TokenId> {
        self.0.iter()
    }
}

impl<T: Into<TokenId>> FromIterator<T> for OwnedTokens {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let tokens = iter
            .into_iter()
            .map(Into::into)
            .filter(|token: &TokenId| seen.insert(token.clone()))
            .collect();
        Self(tokens)
    }
}

impl<'a> IntoIterator for &'a OwnedTokens {
    type Item = &'a TokenId;
    type IntoIter = std::slice::Iter<'a, TokenId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
