use crate::backend;
use crate::error::CliResult;
use alloy_primitives::Address;
use std::path::PathBuf;

pub async fn execute(campaign: String, claimant: String, db: PathBuf) -> CliResult<()> {
    // Wallets normalize to the ledger's lower-hex form; anything else is
    // taken verbatim (engagement campaigns identify claimants by fid).
    let claimant = match claimant.parse::<Address>() {
        Ok(wallet) => format!("{wallet:#x}"),
        Err(_) => claimant,
    };

    let engine = backend::open_ledger_engine(&db).await?;
    let eligibility = engine.check_eligibility(&campaign, &claimant).await?;

    println!("{}", serde_json::to_string_pretty(&eligibility)?);
    Ok(())
}
