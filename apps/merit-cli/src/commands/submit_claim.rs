use crate::backend;
use crate::error::{CliError, CliResult};
use merit_engine::{ClaimSubmission, EngineConfig, ProofReference, SubmitReceipt};
use std::path::PathBuf;

pub async fn execute(
    campaign: String,
    recipient: String,
    tx_hash: Option<String>,
    fid: Option<u64>,
    quantity: u64,
    db: PathBuf,
    rpc_url: String,
    indexer_url: Option<String>,
    hub_url: String,
    hub_api_key: Option<String>,
) -> CliResult<()> {
    let recipient = backend::parse_address("recipient", &recipient)?;
    let proof = match tx_hash {
        Some(hash) => ProofReference::Transaction(backend::parse_tx_hash(&hash)?),
        None => ProofReference::Engagement,
    };
    if matches!(proof, ProofReference::Engagement) && fid.is_none() {
        return Err(CliError::InvalidArgument(
            "either --tx-hash or --fid is required".into(),
        ));
    }

    // Submission never signs; the issuer slot is filled with a throwaway key.
    let engine = backend::open_engine(
        &db,
        &rpc_url,
        indexer_url.as_deref(),
        &hub_url,
        hub_api_key,
        backend::throwaway_issuer(),
        EngineConfig::default(),
    )
    .await?;

    println!("Submitting claim against campaign '{}'...", campaign);
    let outcome = engine
        .submit_claim(ClaimSubmission {
            campaign,
            recipient,
            fid,
            proof,
            declared_quantity: quantity,
        })
        .await?;

    if outcome.deduplicated() {
        println!("Already recorded; returning the surviving claim");
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&SubmitReceipt::from(&outcome))?
    );

    Ok(())
}
