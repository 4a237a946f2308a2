use crate::commands::{validate_creation, ClosePollRequest, CreatePollRequest, VoteRequest};
use crate::ledger::{Ledger, PollRecord};
use crate::lifecycle;
use crate::models::{AccountId, OwnedTokens, Poll, PollError, PollId, Result, TokenId};
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

// Serialized ledger contents, as loaded by the binary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub contract_id: Option<AccountId>,
    #[serde(default)]
    pub polls: BTreeMap<AccountId, Vec<Poll>>,
    // collection -> token -> owner
    #[serde(default)]
    pub tokens: BTreeMap<AccountId, BTreeMap<TokenId, AccountId>>,
}

#[derive(Default)]
struct State {
    polls: HashMap<AccountId, Vec<PollRecord>>,
    owners: HashMap<AccountId, BTreeMap<TokenId, AccountId>>,
}

// Ledger kept in process memory.
//
// Every write takes the state lock for its whole duration, so checking a
// token's eligibility and recording its vote cannot interleave with another
// vote on the same poll.
pub struct MemoryLedger {
    contract_id: AccountId,
    state: RwLock<State>,
}

impl MemoryLedger {
    pub fn new(contract_id: AccountId) -> Self {
        Self {
            contract_id,
            state: RwLock::new(State::default()),
        }
    }

    pub fn from_snapshot(default_contract_id: AccountId, snapshot: LedgerSnapshot) -> Self {
        let contract_id = snapshot.contract_id.unwrap_or(default_contract_id);
        let now = Utc::now();

        let polls: HashMap<AccountId, Vec<PollRecord>> = snapshot
            .polls
            .into_iter()
            .map(|(collection, polls)| {
                // Snapshot order gives the poll ids
                let records: Vec<PollRecord> = polls
                    .into_iter()
                    .enumerate()
                    .map(|(i, poll)| PollRecord {
                        id: i as PollId,
                        created_at: now,
                        closed_at: None,
                        poll,
                    })
                    .collect();
                (collection, records)
            })
            .collect();

        info!("Loaded ledger snapshot for {}", contract_id);
        Self {
            contract_id,
            state: RwLock::new(State {
                polls,
                owners: snapshot.tokens.into_iter().collect(),
            }),
        }
    }

    pub fn contract_id(&self) -> &AccountId {
        &self.contract_id
    }

    // Assigns `token_id` of a collection to `owner_id`, replacing any previous owner.
    pub async fn mint(&self, contract_id: &AccountId, token_id: impl Into<TokenId>, owner_id: &AccountId) {
        let mut state = self.state.write().await;
        state
            .owners
            .entry(contract_id.clone())
            .or_default()
            .insert(token_id.into(), owner_id.clone());
    }

    // Collections that have at least one poll, in sorted order.
    pub async fn collections(&self) -> Vec<AccountId> {
        let state = self.state.read().await;
        let mut collections: Vec<AccountId> = state.polls.keys().cloned().collect();
        collections.sort();
        collections
    }
}

fn find_record<'a>(
    polls: &'a mut HashMap<AccountId, Vec<PollRecord>>,
    contract_id: &AccountId,
    id: PollId,
) -> Result<&'a mut PollRecord> {
    polls
        .get_mut(contract_id)
        .and_then(|records| records.get_mut(id as usize))
        .ok_or(PollError::PollNotFound(id))
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn polls_by_contract(
        &self,
        contract_id: &AccountId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PollRecord>> {
        let state = self.state.read().await;
        let page: Vec<PollRecord> = state
            .polls
            .get(contract_id)
            .map(|records| {
                records
                    .iter()
                    .skip(offset as usize)
                    .take(limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(page)
    }

    async fn poll(&self, contract_id: &AccountId, id: PollId) -> Result<PollRecord> {
        let state = self.state.read().await;
        state
            .polls
            .get(contract_id)
            .and_then(|records| records.get(id as usize))
            .cloned()
            .ok_or(PollError::PollNotFound(id))
    }

    async fn tokens_for_owner(
        &self,
        contract_id: &AccountId,
        owner_id: &AccountId,
    ) -> Result<Vec<TokenId>> {
        let state = self.state.read().await;
        let tokens: Vec<TokenId> = state
            .owners
            .get(contract_id)
            .map(|owners| {
                owners
                    .iter()
                    .filter(|(_, owner)| *owner == owner_id)
                    .map(|(token_id, _)| token_id.clone())
                    .collect()
            })
            .unwrap_or_default();
        Ok(tokens)
    }

    async fn create_poll(&self, request: CreatePollRequest) -> Result<PollId> {
        // Never store a draft the creation rules reject
        let poll = validate_creation(request.draft)?;
        let mut state = self.state.write().await;
        let records = state.polls.entry(poll.nft_contract_id.clone()).or_default();
        // Ids are positions in the collection's poll list
        let id = records.len() as PollId;

        info!(
            "Poll {} '{}' created for {} by {}",
            id, poll.name, poll.nft_contract_id, poll.owner_id
        );
        records.push(PollRecord {
            id,
            created_at: Utc::now(),
            closed_at: None,
            poll,
        });
        Ok(id)
    }

    async fn vote(&self, request: VoteRequest) -> Result<()> {
        // Hold the write lock until the vote is recorded
        let mut state = self.state.write().await;

        // Check the voter owns the token
        let owns_token = state
            .owners
            .get(&request.contract_id)
            .and_then(|owners| owners.get(&request.nft_token_id))
            .is_some_and(|owner| *owner == request.account_id);

        let record = find_record(&mut state.polls, &request.contract_id, request.index)?;
        if !owns_token {
            warn!(
                "{} voted on poll {} with token {} it does not own",
                request.account_id, request.index, request.nft_token_id
            );
            return Err(PollError::NotTokenOwner {
                token_id: request.nft_token_id,
                account_id: request.account_id.to_string(),
            });
        }

        // A single-token set: the token is either still unvoted or the vote is refused
        let token: OwnedTokens = std::iter::once(request.nft_token_id).collect();
        lifecycle::cast_vote(&mut record.poll, &request.account_id, &token, request.answer)?;
        Ok(())
    }

    async fn close_poll(&self, request: ClosePollRequest) -> Result<()> {
        let mut state = self.state.write().await;
        let record = find_record(&mut state.polls, &request.contract_id, request.index)?;

        // Close and stamp the time
        lifecycle::close_poll(&mut record.poll, &request.account_id)?;
        record.closed_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PollDraft, PollStatus};

    fn account(id: &str) -> AccountId {
        id.parse().unwrap()
    }

    fn draft(name: &str) -> CreatePollRequest {
        CreatePollRequest {
            draft: PollDraft::new(
                account("cool-cats.near"),
                account("alice.near"),
                name,
                "Pick one",
                vec!["Cat".to_string(), "Dog".to_string()],
            ),
        }
    }

    fn vote(token: &str, voter: &str, answer: u32) -> VoteRequest {
        VoteRequest {
            contract_id: account("cool-cats.near"),
            index: 0,
            answer,
            nft_token_id: token.to_string(),
            account_id: account(voter),
        }
    }

    async fn ledger_with_poll() -> MemoryLedger {
        let ledger = MemoryLedger::new(account("nft-vote.near"));
        ledger.create_poll(draft("Mascot")).await.unwrap();
        ledger.mint(&account("cool-cats.near"), "t1", &account("bob.near")).await;
        ledger.mint(&account("cool-cats.near"), "t2", &account("carol.near")).await;
        ledger
    }

    #[tokio::test]
    async fn ids_are_ordinals_per_collection() {
        let ledger = MemoryLedger::new(account("nft-vote.near"));
        assert_eq!(ledger.create_poll(draft("First")).await.unwrap(), 0);
        assert_eq!(ledger.create_poll(draft("Second")).await.unwrap(), 1);

        let record = ledger.poll(&account("cool-cats.near"), 1).await.unwrap();
        assert_eq!(record.poll.name, "Second");
        assert_eq!(
            ledger.poll(&account("cool-cats.near"), 2).await,
            Err(PollError::PollNotFound(2))
        );
        assert_eq!(
            ledger.poll(&account("other.near"), 0).await,
            Err(PollError::PollNotFound(0))
        );
    }

    #[tokio::test]
    async fn invalid_drafts_are_not_stored() {
        let ledger = MemoryLedger::new(account("nft-vote.near"));
        let mut request = draft("Mascot");
        request.draft.answers.pop();
        assert_eq!(ledger.create_poll(request).await, Err(PollError::TooFewOptions(1)));
        assert!(ledger.collections().await.is_empty());
    }

    #[tokio::test]
    async fn pagination_honors_limit_and_offset() {
        let ledger = MemoryLedger::new(account("nft-vote.near"));
        for name in ["P0", "P1", "P2", "P3", "P4"] {
            ledger.create_poll(draft(name)).await.unwrap();
        }
        let cats = account("cool-cats.near");

        let page = ledger.polls_by_contract(&cats, 2, 1).await.unwrap();
        let names: Vec<&str> = page.iter().map(|r| r.poll.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P2"]);
        assert_eq!(page[0].id, 1);

        assert_eq!(ledger.polls_by_contract(&cats, 10, 3).await.unwrap().len(), 2);
        assert!(ledger.polls_by_contract(&cats, 10, 9).await.unwrap().is_empty());
        assert!(ledger.polls_by_contract(&account("dogs.near"), 10, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tokens_are_listed_per_owner() {
        let ledger = ledger_with_poll().await;
        let cats = account("cool-cats.near");
        ledger.mint(&cats, "t0", &account("bob.near")).await;

        let bobs = ledger.tokens_for_owner(&cats, &account("bob.near")).await.unwrap();
        assert_eq!(bobs, vec!["t0", "t1"]);
        assert!(ledger.tokens_for_owner(&cats, &account("dave.near")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn vote_requires_token_ownership() {
        let ledger = ledger_with_poll().await;
        let err = ledger.vote(vote("t2", "bob.near", 0)).await.unwrap_err();
        assert_eq!(err.kind(), "NotTokenOwner");

        let err = ledger.vote(vote("t404", "bob.near", 0)).await.unwrap_err();
        assert_eq!(err.kind(), "NotTokenOwner");

        let record = ledger.poll(&account("cool-cats.near"), 0).await.unwrap();
        assert!(record.poll.votes.is_empty());
    }

    #[tokio::test]
    async fn token_cannot_vote_twice() {
        let ledger = ledger_with_poll().await;
        ledger.vote(vote("t1", "bob.near", 1)).await.unwrap();
        assert_eq!(
            ledger.vote(vote("t1", "bob.near", 0)).await,
            Err(PollError::NoEligibleTokens)
        );

        let record = ledger.poll(&account("cool-cats.near"), 0).await.unwrap();
        assert_eq!(record.poll.votes.get("t1"), Some(&1));
    }

    #[tokio::test]
    async fn close_stamps_time_and_blocks_votes() {
        let ledger = ledger_with_poll().await;
        let close = ClosePollRequest {
            contract_id: account("cool-cats.near"),
            index: 0,
            account_id: account("alice.near"),
        };
        ledger.close_poll(close.clone()).await.unwrap();

        let record = ledger.poll(&account("cool-cats.near"), 0).await.unwrap();
        assert_eq!(record.poll.status, PollStatus::Closed);
        assert!(record.closed_at.is_some());

        assert_eq!(ledger.close_poll(close).await, Err(PollError::AlreadyClosed));
        assert_eq!(
            ledger.vote(vote("t1", "bob.near", 0)).await,
            Err(PollError::PollClosed)
        );
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_json() {
        let json = r#"{
            "polls": {
                "cool-cats.near": [{
                    "nft_contract_id": "cool-cats.near",
                    "owner_id": "alice.near",
                    "name": "Mascot",
                    "description": "Pick one",
                    "answers": ["Cat", "Dog"],
                    "votes": {"t1": 0},
                    "status": 0
                }]
            },
            "tokens": {"cool-cats.near": {"t1": "bob.near", "t2": "bob.near"}}
        }"#;
        let snapshot: LedgerSnapshot = serde_json::from_str(json).unwrap();
        let ledger = MemoryLedger::from_snapshot(account("nft-vote.near"), snapshot);

        assert_eq!(ledger.contract_id().as_str(), "nft-vote.near");
        assert_eq!(ledger.collections().await, vec![account("cool-cats.near")]);
        ledger.vote(vote("t2", "bob.near", 1)).await.unwrap();

        let record = ledger.poll(&account("cool-cats.near"), 0).await.unwrap();
        assert_eq!(record.poll.votes.len(), 2);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], 0);
        assert_eq!(value["name"], "Mascot");
    }
}
