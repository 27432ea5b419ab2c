use crate::backend;
use crate::error::CliResult;
use std::path::PathBuf;

pub async fn execute(campaign: Option<String>, db: PathBuf) -> CliResult<()> {
    let engine = backend::open_ledger_engine(&db).await?;

    match &campaign {
        Some(slug) => println!("Reconciling counters for campaign '{}'...", slug),
        None => println!("Reconciling counters for all campaigns..."),
    }
    let corrections = engine.reconcile_counters(campaign.as_deref()).await?;

    if corrections.is_empty() {
        println!("Counters already agree with the ledger");
        return Ok(());
    }

    println!("Repaired {} campaign counter(s):", corrections.len());
    println!("{}", serde_json::to_string_pretty(&corrections)?);
    Ok(())
}
