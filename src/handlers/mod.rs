use crate::commands::{validate_creation, ClosePollRequest, CreatePollRequest, VoteRequest};
use crate::ledger::{Ledger, PollRecord};
use crate::lifecycle;
use crate::models::{AccountId, AnswerIndex, OwnedTokens, PollDraft, PollError, PollId, Result, TokenId};
use crate::voting::{compute_tally, TallyResult};
use log::{debug, info, warn};
use std::sync::Arc;

const VOTE_RETRIES: u32 = 1;

// Entry point for a presentation layer showing the polls of one collection.
//
// Nothing is cached: every call reads a fresh snapshot from the ledger, so
// callers re-invoke `poll_view` after a write to see its effect.
pub struct PollHandler<L: Ledger> {
    ledger: Arc<L>,
    nft_contract: AccountId,
    page_limit: u64,
}

impl<L: Ledger> PollHandler<L> {
    pub fn new(ledger: Arc<L>, nft_contract: AccountId, page_limit: u64) -> Self {
        Self {
            ledger,
            nft_contract,
            page_limit,
        }
    }

    pub fn nft_contract(&self) -> &AccountId {
        &self.nft_contract
    }

    pub async fn list_polls(&self) -> Result<Vec<PollRecord>> {
        self.ledger
            .polls_by_contract(&self.nft_contract, self.page_limit, 0)
            .await
    }

    async fn owned_tokens(&self, account: &AccountId) -> Result<OwnedTokens> {
        let tokens = self
            .ledger
            .tokens_for_owner(&self.nft_contract, account)
            .await?;
        Ok(tokens.into_iter().collect())
    }

    pub async fn poll_view(&self, poll_id: PollId, account: &AccountId) -> Result<TallyResult> {
        // Fresh snapshot, then tally it
        let record = self.ledger.poll(&self.nft_contract, poll_id).await?;
        let owned = self.owned_tokens(account).await?;
        debug!("Computing view of poll {} for {}", poll_id, account);
        compute_tally(&record.poll, &owned)
    }

    // Holders of at least one token of the collection may create polls.
    pub async fn can_create_poll(&self, account: &AccountId) -> Result<bool> {
        Ok(!self.owned_tokens(account).await?.is_empty())
    }

    pub async fn create_poll(&self, draft: PollDraft) -> Result<PollId> {
        // The draft must target this handler's collection
        if draft.nft_contract_id != self.nft_contract {
            return Err(PollError::InvalidInput(format!(
                "draft targets {}, handler serves {}",
                draft.nft_contract_id, self.nft_contract
            )));
        }
        // Only token holders may create polls
        if !self.can_create_poll(&draft.owner_id).await? {
            return Err(PollError::NotTokenHolder(draft.owner_id.to_string()));
        }

        // Validate locally so an invalid draft is never submitted
        validate_creation(draft.clone())?;
        let id = self.ledger.create_poll(CreatePollRequest { draft }).await?;
        info!("Submitted poll {} for {}", id, self.nft_contract);
        Ok(id)
    }

    // Casts one vote for `answer` and returns the token it was attributed to.
    // The token is picked on a snapshot, so another vote from the same account
    // may spend it first; the ledger then refuses and the pick is redone.
    pub async fn vote(&self, poll_id: PollId, account: &AccountId, answer: AnswerIndex) -> Result<TokenId> {
        let mut retries = 0;
        loop {
            // Fresh snapshot of the poll and of the caller's tokens
            let record = self.ledger.poll(&self.nft_contract, poll_id).await?;
            let owned = self.owned_tokens(account).await?;

            // Run the state machine on the snapshot to pick the token and catch
            // rejections before anything is submitted
            let mut snapshot = record.poll;
            let token_id = lifecycle::cast_vote(&mut snapshot, account, &owned, answer)?;

            // Submit; the ledger refuses a token spent since the snapshot
            let submitted = self
                .ledger
                .vote(VoteRequest {
                    contract_id: self.nft_contract.clone(),
                    index: poll_id,
                    answer,
                    nft_token_id: token_id.clone(),
                    account_id: account.clone(),
                })
                .await;

            match submitted {
                Ok(()) => return Ok(token_id),
                Err(PollError::NoEligibleTokens) if retries < VOTE_RETRIES => {
                    retries += 1;
                    warn!(
                        "Token {} of {} was spent by another vote, picking again",
                        token_id, account
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn close_poll(&self, poll_id: PollId, account: &AccountId) -> Result<()> {
        let record = self.ledger.poll(&self.nft_contract, poll_id).await?;
        // Check on the snapshot first so a rejected close is never submitted
        let mut snapshot = record.poll;
        lifecycle::close_poll(&mut snapshot, account)?;

        self.ledger
            .close_poll(ClosePollRequest {
                contract_id: self.nft_contract.clone(),
                index: poll_id,
                account_id: account.clone(),
            })
            .await
    }
}
