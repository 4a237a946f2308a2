pub mod memory;

use crate::commands::{ClosePollRequest, CreatePollRequest, VoteRequest};
use crate::models::{AccountId, Poll, PollId, Result, TokenId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::{LedgerSnapshot, MemoryLedger};

// A poll as stored by the ledger, with the bookkeeping the ledger owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRecord {
    pub id: PollId,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub poll: Poll,
}

// Read and write API of the ledger holding polls and token ownership.
//
// Implementations must apply each write atomically. In particular `vote`
// has to check and insert `(poll id, token id)` as one step, otherwise two
// concurrent submissions can spend the same token.
#[async_trait]
pub trait Ledger: Send + Sync {
    // Polls of a collection in creation order, `limit` records from `offset`.
    async fn polls_by_contract(
        &self,
        contract_id: &AccountId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PollRecord>>;

    async fn poll(&self, contract_id: &AccountId, id: PollId) -> Result<PollRecord>;

    async fn tokens_for_owner(
        &self,
        contract_id: &AccountId,
        owner_id: &AccountId,
    ) -> Result<Vec<TokenId>>;

    // Stores a new poll and returns the id it was given.
    async fn create_poll(&self, request: CreatePollRequest) -> Result<PollId>;

    async fn vote(&self, request: VoteRequest) -> Result<()>;

    async fn close_poll(&self, request: ClosePollRequest) -> Result<()>;
}
