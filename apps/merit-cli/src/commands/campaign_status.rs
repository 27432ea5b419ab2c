use crate::backend;
use crate::error::CliResult;
use std::path::PathBuf;

pub async fn execute(campaign: String, db: PathBuf) -> CliResult<()> {
    let engine = backend::open_ledger_engine(&db).await?;
    let status = engine.campaign_status(&campaign).await?;

    println!("{}", serde_json::to_string_pretty(&status)?);

    if status.counter_drift {
        eprintln!(
            "Warning: counter is at {} units but the ledger sums to {}; run reconcile-counters",
            status.counter_units, status.consumed_supply
        );
    }

    Ok(())
}
