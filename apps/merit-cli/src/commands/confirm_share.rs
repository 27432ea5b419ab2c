use crate::backend;
use crate::error::CliResult;
use merit_engine::EngineConfig;
use std::path::PathBuf;

pub async fn execute(
    claim: i64,
    db: PathBuf,
    hub_url: String,
    hub_api_key: Option<String>,
) -> CliResult<()> {
    // Only the hub is consulted here; the chain side stays on defaults.
    let engine = backend::open_engine(
        &db,
        "http://127.0.0.1:8545",
        None,
        &hub_url,
        hub_api_key,
        backend::throwaway_issuer(),
        EngineConfig::default(),
    )
    .await?;

    println!("Confirming share for claim {}...", claim);
    let record = engine.confirm_share(claim).await?;

    println!("Claim {} is now '{}'", record.id, record.state);
    Ok(())
}
