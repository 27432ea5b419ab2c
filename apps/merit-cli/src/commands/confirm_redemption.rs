use crate::backend;
use crate::error::CliResult;
use std::path::PathBuf;

pub async fn execute(claim: i64, tx_hash: String, db: PathBuf) -> CliResult<()> {
    let tx_hash = backend::parse_tx_hash(&tx_hash)?;

    let engine = backend::open_ledger_engine(&db).await?;
    let record = engine.confirm_redemption(claim, tx_hash).await?;

    println!("Claim {} redeemed", record.id);
    if let Some(hash) = &record.redemption_tx_hash {
        println!("  Transaction: {}", hash);
    }
    println!("  Reward: {}", record.reward_amount);
    Ok(())
}
