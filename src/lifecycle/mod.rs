// Open -> Closed state machine of a poll.
//
// These functions only check preconditions against a snapshot and apply the
// change to it. Keeping one-token-one-vote intact when several submissions
// race is the job of whoever owns the authoritative poll (see Ledger::vote
// in the ledger module): the eligibility check and the insert must
// happen atomically per `(poll id, token id)`.

use crate::models::{AccountId, AnswerIndex, OwnedTokens, Poll, PollError, PollStatus, Result, TokenId};
use crate::voting::select_voting_token;
use log::{info, warn};

// Records one vote for `answer`, attributed to the voter's first unvoted token.
//
// Returns the token that was consumed. This is the only place `poll.votes`
// grows.
pub fn cast_vote(
    poll: &mut Poll,
    voter: &AccountId,
    voter_tokens: &OwnedTokens,
    answer: AnswerIndex,
) -> Result<TokenId> {
    // Closed polls take no votes, whatever the voter holds
    if !poll.is_open() {
        warn!("{} tried to vote on closed poll '{}'", voter, poll.name);
        return Err(PollError::PollClosed);
    }

    // Make sure the answer exists
    if !poll.has_answer(answer) {
        return Err(PollError::InvalidAnswer {
            index: answer,
            answers: poll.answers.len(),
        });
    }

    // Pick the token this vote is attributed to
    let token_id = select_voting_token(voter_tokens, &poll.votes).inspect_err(|e| {
        warn!("{} cannot vote on poll '{}': {}", voter, poll.name, e);
    })?;

    // Record the vote
    poll.votes.insert(token_id.clone(), answer);
    info!(
        "Vote {} counted on poll '{}' for {} with token {}",
        answer, poll.name, voter, token_id
    );

    Ok(token_id)
}

// Closes the poll for good. Only the owner may do it, and only once.
pub fn close_poll(poll: &mut Poll, requester: &AccountId) -> Result<()> {
    // Only the creator can close
    if *requester != poll.owner_id {
        warn!("{} is not the owner of poll '{}'", requester, poll.name);
        return Err(PollError::NotAuthorized);
    }

    // Closing is not idempotent
    if poll.status == PollStatus::Closed {
        return Err(PollError::AlreadyClosed);
    }

    poll.status = PollStatus::Closed;
    info!("Poll '{}' closed by {}", poll.name, requester);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_poll() -> Poll {
        Poll {
            nft_contract_id: "cool-cats.near".parse().unwrap(),
            owner_id: "alice.near".parse().unwrap(),
            name: "Mascot".to_string(),
            description: "Pick the mascot".to_string(),
            meta: "{}".to_string(),
            answers: vec!["Cat".to_string(), "Dog".to_string()],
            votes: Default::default(),
            status: PollStatus::Open,
        }
    }

    fn account(id: &str) -> AccountId {
        id.parse().unwrap()
    }

    fn tokens(ids: &[&str]) -> OwnedTokens {
        ids.iter().copied().collect()
    }

    #[test]
    fn single_token_votes_once() {
        let mut poll = open_poll();
        let bob = account("bob.near");
        let mine = tokens(&["t1"]);

        assert_eq!(cast_vote(&mut poll, &bob, &mine, 1).unwrap(), "t1");
        assert_eq!(cast_vote(&mut poll, &bob, &mine, 0), Err(PollError::NoEligibleTokens));
        assert_eq!(poll.votes.len(), 1);
        assert_eq!(poll.votes.get("t1"), Some(&1));
    }

    #[test]
    fn each_vote_consumes_next_token() {
        let mut poll = open_poll();
        let bob = account("bob.near");
        let mine = tokens(&["t5", "t2", "t8"]);

        let used: Vec<TokenId> = (0..3)
            .map(|_| cast_vote(&mut poll, &bob, &mine, 0).unwrap())
            .collect();
        assert_eq!(used, vec!["t5", "t2", "t8"]);
        assert_eq!(cast_vote(&mut poll, &bob, &mine, 0), Err(PollError::NoEligibleTokens));
    }

    #[test]
    fn closed_poll_rejects_votes_before_eligibility() {
        let mut poll = open_poll();
        poll.status = PollStatus::Closed;
        let bob = account("bob.near");

        assert_eq!(cast_vote(&mut poll, &bob, &tokens(&["t1"]), 0), Err(PollError::PollClosed));
        assert_eq!(cast_vote(&mut poll, &bob, &OwnedTokens::default(), 9), Err(PollError::PollClosed));
        assert!(poll.votes.is_empty());
    }

    #[test]
    fn answer_must_exist() {
        let mut poll = open_poll();
        let err = cast_vote(&mut poll, &account("bob.near"), &tokens(&["t1"]), 2).unwrap_err();
        assert_eq!(err, PollError::InvalidAnswer { index: 2, answers: 2 });
        assert!(poll.votes.is_empty());
    }

    #[test]
    fn voter_without_tokens() {
        let mut poll = open_poll();
        let err = cast_vote(&mut poll, &account("bob.near"), &OwnedTokens::default(), 0).unwrap_err();
        assert_eq!(err.kind(), "InvalidInput");
    }

    #[test]
    fn only_owner_closes() {
        let mut poll = open_poll();
        assert_eq!(close_poll(&mut poll, &account("bob.near")), Err(PollError::NotAuthorized));
        assert!(poll.is_open());

        close_poll(&mut poll, &account("alice.near")).unwrap();
        assert_eq!(poll.status, PollStatus::Closed);
    }

    #[test]
    fn closing_twice_is_an_error() {
        let mut poll = open_poll();
        let alice = account("alice.near");
        close_poll(&mut poll, &alice).unwrap();
        assert_eq!(close_poll(&mut poll, &alice), Err(PollError::AlreadyClosed));
        assert_eq!(close_poll(&mut poll, &account("bob.near")), Err(PollError::NotAuthorized));
    }
}
