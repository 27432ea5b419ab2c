use crate::backend;
use crate::error::CliResult;
use merit_engine::{CampaignConfig, Target};
use std::fs::File;
use std::path::PathBuf;

pub async fn execute(config: PathBuf, db: PathBuf) -> CliResult<()> {
    println!("Loading campaign definition: {}", config.display());
    let file = File::open(&config)?;
    let definition: CampaignConfig = serde_yaml::from_reader(file)?;

    let engine = backend::open_ledger_engine(&db).await?;
    let campaign = engine.create_campaign(definition).await?;

    println!("Campaign '{}' created", campaign.slug);
    println!("  Kind: {}", campaign.kind());
    println!("  Active: {}", campaign.active);
    match &campaign.target {
        Target::Mint { contract, token_id } => {
            println!("  Target: token {} on {}", token_id, contract);
        }
        Target::Engagement {
            cast_hash,
            required,
        } => {
            let required: Vec<String> = required.iter().map(|e| e.to_string()).collect();
            println!("  Target: cast {} ({})", cast_hash, required.join(", "));
        }
    }
    if let Some(cap) = campaign.supply_cap {
        println!("  Supply cap: {} units", cap);
    }
    if let Some(cap) = campaign.per_user_cap {
        println!("  Per-user cap: {} units", cap);
    }
    println!(
        "  Reward: {} per unit, paid in {}",
        campaign.reward_per_unit, campaign.reward_token
    );
    if campaign.gate.is_some() {
        println!("  Holding gate: enabled");
    }
    if let Some(share) = &campaign.share {
        match &share.cast_hash {
            Some(cast) => println!("  Share step: verified recast of {}", cast),
            None => println!("  Share step: confirmation on trust"),
        }
    }

    Ok(())
}
