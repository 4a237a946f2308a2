// Token-gated polls: holders of a collection's tokens create polls, vote
// once per token and read aggregated results.

pub mod commands;
pub mod config;
pub mod handlers;
pub mod ledger;
pub mod lifecycle;
pub mod models;
pub mod voting;

pub use models::{PollError, Result};
