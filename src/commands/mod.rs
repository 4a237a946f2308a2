pub mod poll;

use crate::models::{AccountId, AnswerIndex, PollDraft, PollId, TokenId};
use serde::{Deserialize, Serialize};

pub use poll::validate_creation;

// Write requests submitted to the ledger. Field names follow the ledger's API.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePollRequest {
    #[serde(flatten)]
    pub draft: PollDraft,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub contract_id: AccountId,
    pub index: PollId,
    pub answer: AnswerIndex,
    pub nft_token_id: TokenId,
    pub account_id: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosePollRequest {
    pub contract_id: AccountId,
    pub index: PollId,
    pub account_id: AccountId,
}
