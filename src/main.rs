use log::{error, info};
use serde_json::{json, Value};
use std::env;
use std::fs;
use std::sync::Arc;
use token_poll::config::Config;
use token_poll::handlers::PollHandler;
use token_poll::ledger::{LedgerSnapshot, MemoryLedger};
use token_poll::models::{AccountId, PollId};
use token_poll::voting::TallyResult;

const USAGE: &str = "usage: token-poll <snapshot.json> <account-id>";

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = Config::from_env()?;

    let mut args = env::args().skip(1);
    let (snapshot_path, account) = match (args.next(), args.next()) {
        (Some(path), Some(account)) => (path, account),
        _ => return Err(USAGE.into()),
    };
    let account: AccountId = account.parse()?;

    let snapshot: LedgerSnapshot = serde_json::from_str(&fs::read_to_string(&snapshot_path)?)?;
    let ledger = Arc::new(MemoryLedger::from_snapshot(config.contract_id.clone(), snapshot));
    info!("Reading polls of {} for {}", ledger.contract_id(), account);

    let collections = match config.nft_contract {
        Some(collection) => vec![collection],
        None => ledger.collections().await,
    };

    let mut failed = 0;
    for collection in collections {
        let handler = PollHandler::new(Arc::clone(&ledger), collection, config.page_limit);
        for record in handler.list_polls().await? {
            // A poll that cannot be tallied still gets a line, with its error
            let view = handler.poll_view(record.id, &account).await;
            if let Err(e) = &view {
                error!("Poll {} of {} cannot be tallied: {}", record.id, handler.nft_contract(), e);
                failed += 1;
            }
            let line = poll_line(handler.nft_contract(), record.id, view);
            println!("{}", serde_json::to_string(&line)?);
        }
    }

    if failed > 0 {
        return Err(format!("{} poll(s) could not be tallied", failed).into());
    }
    Ok(())
}

// One output line per poll: its tally, or the kind and text of the error
fn poll_line(collection: &AccountId, id: PollId, view: token_poll::Result<TallyResult>) -> Value {
    match view {
        Ok(tally) => json!({
            "nft_contract_id": collection,
            "id": id,
            "tally": tally,
        }),
        Err(e) => json!({
            "nft_contract_id": collection,
            "id": id,
            "error": e.kind(),
            "message": e.to_string(),
        }),
    }
}
