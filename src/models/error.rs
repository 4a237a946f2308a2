use thiserror::Error;

use super::{AnswerIndex, PollId, TokenId};

pub type Result<T> = std::result::Result<T, PollError>;

// Every way a poll operation can be rejected.
//
// All variants are precondition failures detected locally; the core never retries
// them. Presentation code should match on the variant (or on PollError::kind)
// rather than on the display text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("vote by token {token_id} points at answer {index}, poll only has {answers} answers")]
    UnknownAnswerIndex {
        token_id: TokenId,
        index: AnswerIndex,
        answers: usize,
    },

    #[error("poll is closed")]
    PollClosed,

    #[error("answer {index} is out of range, poll has {answers} answers")]
    InvalidAnswer { index: AnswerIndex, answers: usize },

    #[error("no unvoted tokens left to vote with")]
    NoEligibleTokens,

    #[error("only the poll owner can do this")]
    NotAuthorized,

    #[error("poll is already closed")]
    AlreadyClosed,

    #[error("a poll needs at least two options, got {0}")]
    TooFewOptions(usize),

    #[error("poll title is empty")]
    MissingTitle,

    #[error("poll description is empty")]
    MissingDescription,

    #[error("option {0} is empty")]
    EmptyOption(usize),

    #[error("poll {0} not found")]
    PollNotFound(PollId),

    #[error("token {token_id} is not owned by {account_id}")]
    NotTokenOwner { token_id: TokenId, account_id: String },

    #[error("{0} holds no tokens of this collection")]
    NotTokenHolder(String),
}

impl PollError {
    // Stable identifier of the error kind, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            PollError::InvalidInput(_) => "InvalidInput",
            PollError::UnknownAnswerIndex { .. } => "UnknownAnswerIndex",
            PollError::PollClosed => "PollClosed",
            PollError::InvalidAnswer { .. } => "InvalidAnswer",
            PollError::NoEligibleTokens => "NoEligibleTokens",
            PollError::NotAuthorized => "NotAuthorized",
            PollError::AlreadyClosed => "AlreadyClosed",
            PollError::TooFewOptions(_) => "TooFewOptions",
            PollError::MissingTitle => "MissingTitle",
            PollError::MissingDescription => "MissingDescription",
            PollError::EmptyOption(_) => "EmptyOption",
            PollError::PollNotFound(_) => "PollNotFound",
            PollError::NotTokenOwner { .. } => "NotTokenOwner",
            PollError::NotTokenHolder(_) => "NotTokenHolder",
        }
    }
}
