use crate::models::{Poll, PollDraft, PollError, PollStatus, Result};
use log::warn;
use std::collections::BTreeMap;

const MIN_ANSWERS: usize = 2;

// Checks a draft before it is submitted and turns it into a fresh, open poll.
//
// The poll id is not assigned here; the ledger does that on creation.
pub fn validate_creation(draft: PollDraft) -> Result<Poll> {
    // Reject the draft before anything is built from it
    check_draft(&draft).inspect_err(|e| {
        warn!("Rejected poll draft from {}: {}", draft.owner_id, e);
    })?;

    // New polls start open with no votes
    Ok(Poll {
        nft_contract_id: draft.nft_contract_id,
        owner_id: draft.owner_id,
        name: draft.name,
        description: draft.description,
        meta: draft.meta,
        answers: draft.answers,
        votes: BTreeMap::new(),
        status: PollStatus::Open,
    })
}

fn check_draft(draft: &PollDraft) -> Result<()> {
    if is_blank(&draft.name) {
        return Err(PollError::MissingTitle);
    }
    if is_blank(&draft.description) {
        return Err(PollError::MissingDescription);
    }
    // At least two choices, none of them blank
    if draft.answers.len() < MIN_ANSWERS {
        return Err(PollError::TooFewOptions(draft.answers.len()));
    }
    if let Some(position) = draft.answers.iter().position(|a| is_blank(a)) {
        return Err(PollError::EmptyOption(position));
    }
    Ok(())
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
