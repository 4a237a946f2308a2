use crate::models::{AnswerIndex, OwnedTokens, PollError, Result, TokenId};
use std::collections::BTreeMap;

// Owned tokens that have not voted in the poll yet, in owned order.
pub fn unvoted_tokens<'a>(
    owned: &'a OwnedTokens,
    votes: &BTreeMap<TokenId, AnswerIndex>,
) -> Vec<&'a TokenId> {
    owned
        .iter()
        .filter(|token_id| !votes.contains_key(token_id.as_str()))
        .collect()
}

// Picks the token a new vote is attributed to: the first unvoted one.
//
// The caller never chooses the token, so a holder of many tokens still casts
// at most one vote per token.
pub fn select_voting_token(
    owned: &OwnedTokens,
    votes: &BTreeMap<TokenId, AnswerIndex>,
) -> Result<TokenId> {
    // No tokens at all means no voting rights to begin with
    if owned.is_empty() {
        return Err(PollError::InvalidInput(
            "no tokens of the collection are owned".to_string(),
        ));
    }

    // First token that has not voted yet
    unvoted_tokens(owned, votes)
        .first()
        .map(|token_id| (*token_id).clone())
        .ok_or(PollError::NoEligibleTokens)
}
