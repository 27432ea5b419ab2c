use crate::backend;
use crate::error::CliResult;
use std::path::PathBuf;

pub async fn execute(campaign: String, db: PathBuf) -> CliResult<()> {
    let engine = backend::open_ledger_engine(&db).await?;
    let campaign = engine.set_campaign_active(&campaign, true).await?;

    println!("Campaign '{}' active again", campaign.slug);
    if let Some(ends_at) = campaign.ends_at {
        println!("  Window closes at {}", ends_at);
    }
    Ok(())
}
