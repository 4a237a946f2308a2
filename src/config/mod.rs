use crate::models::AccountId;
use std::env;
use thiserror::Error;

const DEFAULT_CONTRACT: &str = "nft-vote.near";
const DEFAULT_PAGE_LIMIT: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid account id: {source}")]
    InvalidAccount {
        name: &'static str,
        source: crate::models::PollError,
    },

    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    // Account of the polling ledger
    pub contract_id: AccountId,
    // Token collection that gates voting, if pinned
    pub nft_contract: Option<AccountId>,
    // Page size used when enumerating polls
    pub page_limit: u64,
}

impl Config {
    // Reads POLL_CONTRACT, NFT_CONTRACT and POLL_PAGE_LIMIT.
    // Call dotenvy::dotenv() first if a .env file should be honored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Polling ledger, defaulting to the public one
        let contract_id = parse_account(
            "POLL_CONTRACT",
            lookup("POLL_CONTRACT").unwrap_or_else(|| DEFAULT_CONTRACT.to_string()),
        )?;

        // Empty NFT_CONTRACT counts as unset
        let nft_contract = lookup("NFT_CONTRACT")
            .filter(|value| !value.is_empty())
            .map(|value| parse_account("NFT_CONTRACT", value))
            .transpose()?;

        // Page size must be a positive integer
        let page_limit = match lookup("POLL_PAGE_LIMIT") {
            Some(value) => match value.parse::<u64>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "POLL_PAGE_LIMIT",
                        value,
                    })
                }
            },
            None => DEFAULT_PAGE_LIMIT,
        };

        Ok(Self {
            contract_id,
            nft_contract,
            page_limit,
        })
    }
}

fn parse_account(name: &'static str, value: String) -> Result<AccountId, ConfigError> {
    AccountId::try_from(value).map_err(|source| ConfigError::InvalidAccount { name, source })
}
