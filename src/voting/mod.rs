pub mod eligibility;
pub mod tally;

use crate::models::{AccountId, PollStatus, TokenId};
use serde::{Deserialize, Serialize};

pub use eligibility::{select_voting_token, unvoted_tokens};
pub use tally::compute_tally;

// Per-option figures of a tally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionStats {
    pub label: String,
    pub progress_percent: u32,
    pub voted_total: u64,
    pub my_voted: u64,
}

// Aggregated view of one poll for one caller. Recomputed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyResult {
    pub options: Vec<OptionStats>,
    pub total_votes_cast: u64,
    pub my_votes_cast: u64,
    pub remaining_voting_rights: u64,
    pub my_voted_tokens: Vec<TokenId>,
    pub description: String,
    pub topic: String,
    pub owner_id: AccountId,
    pub status: PollStatus,
}
