use crate::backend;
use crate::error::CliResult;
use std::path::PathBuf;

pub async fn execute(campaign: String, db: PathBuf) -> CliResult<()> {
    let engine = backend::open_ledger_engine(&db).await?;
    let campaign = engine.set_campaign_active(&campaign, false).await?;

    println!("Campaign '{}' paused", campaign.slug);
    Ok(())
}
