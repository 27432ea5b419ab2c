use crate::backend;
use crate::error::{CliError, CliResult};
use chrono::Duration;
use merit_engine::EngineConfig;
use std::path::PathBuf;

pub async fn execute(
    claim: i64,
    signer_key: String,
    chain_id: u64,
    airdrop_contract: String,
    validity_days: i64,
    db: PathBuf,
) -> CliResult<()> {
    if validity_days <= 0 {
        return Err(CliError::InvalidArgument(
            "--validity-days must be positive".into(),
        ));
    }
    let airdrop_contract = backend::parse_address("airdrop contract", &airdrop_contract)?;
    let issuer = backend::parse_issuer(&signer_key, chain_id, airdrop_contract)?;

    let config = EngineConfig {
        voucher_validity: Duration::days(validity_days),
        ..Default::default()
    };
    let engine = backend::open_ledger_engine_with(&db, issuer, config).await?;

    println!("Signing voucher for claim {}...", claim);
    let voucher = engine.issue_voucher(claim).await?;

    println!("{}", serde_json::to_string_pretty(&voucher)?);
    println!("Issuer address: {}", engine.issuer_address());

    Ok(())
}
