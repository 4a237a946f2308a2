use crate::models::{OwnedTokens, Poll, PollError, Result};
use crate::voting::{OptionStats, TallyResult};
use log::debug;

pub fn compute_tally(poll: &Poll, owned: &OwnedTokens) -> Result<TallyResult> {
    // Count every cast vote per answer
    let mut voted_totals = vec![0u64; poll.answers.len()];
    for (token_id, &index) in &poll.votes {
        let slot = voted_totals
            .get_mut(index as usize)
            .ok_or_else(|| PollError::UnknownAnswerIndex {
                token_id: token_id.clone(),
                index,
                answers: poll.answers.len(),
            })?;
        *slot += 1;
    }

    // The caller's share: owned tokens that appear among the votes
    let mut my_voted = vec![0u64; poll.answers.len()];
    let mut my_voted_tokens = Vec::new();
    for token_id in owned {
        if let Some(&index) = poll.votes.get(token_id) {
            my_voted[index as usize] += 1;
            my_voted_tokens.push(token_id.clone());
        }
    }

    let total_votes_cast = poll.votes.len() as u64;
    let my_votes_cast = my_voted_tokens.len() as u64;

    let options = poll
        .answers
        .iter()
        .zip(voted_totals.iter().zip(my_voted.iter()))
        .map(|(label, (&voted_total, &mine))| OptionStats {
            label: label.clone(),
            progress_percent: progress_percent(voted_total, total_votes_cast),
            voted_total,
            my_voted: mine,
        })
        .collect();

    debug!(
        "Tallied poll '{}': {} votes cast, {} by caller",
        poll.name, total_votes_cast, my_votes_cast
    );

    Ok(TallyResult {
        options,
        total_votes_cast,
        my_votes_cast,
        remaining_voting_rights: owned.len() as u64 - my_votes_cast,
        my_voted_tokens,
        description: poll.description.clone(),
        topic: poll.name.clone(),
        owner_id: poll.owner_id.clone(),
        status: poll.status,
    })
}

// Share of all cast votes as a whole percent, rounded the way the widgets
// always showed it: divide first, then scale, then round
fn progress_percent(voted: u64, total: u64) -> u32 {
    // Nothing cast yet, every option shows 0
    if total == 0 {
        return 0;
    }
    ((voted as f64 / total as f64) * 100.0).round() as u32
}
