use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod backend;
mod commands;
mod error;

use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "merit")]
#[command(about = "Merit - action verification and signed reward vouchers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a campaign from a YAML definition
    CreateCampaign {
        /// Campaign definition file
        config: PathBuf,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,
    },

    /// Show supply, counter drift, and redemption progress for a campaign
    CampaignStatus {
        /// Campaign slug
        campaign: String,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,
    },

    /// Check whether a claimant can still claim from a campaign
    CheckEligibility {
        /// Campaign slug
        campaign: String,

        /// Wallet address (mint campaigns) or fid (engagement campaigns)
        claimant: String,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,
    },

    /// Submit a claimed action for verification against its source of truth
    SubmitClaim {
        /// Campaign slug
        campaign: String,

        /// Wallet the reward voucher pays out to
        #[arg(short, long)]
        recipient: String,

        /// Hash of the mint transaction (mint campaigns)
        #[arg(short, long)]
        tx_hash: Option<String>,

        /// Claimant fid (engagement campaigns and verified shares)
        #[arg(short, long)]
        fid: Option<u64>,

        /// Declared quantity of claimed units
        #[arg(short, long, default_value = "1")]
        quantity: u64,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,

        /// JSON-RPC endpoint of the chain node
        #[arg(long, default_value = "http://127.0.0.1:8545")]
        rpc_url: String,

        /// Indexer fallback for holdings queries
        #[arg(long)]
        indexer_url: Option<String>,

        /// Social-graph hub HTTP endpoint
        #[arg(long, default_value = "http://127.0.0.1:2281")]
        hub_url: String,

        /// Hub API key, sent as x-api-key
        #[arg(long, env = "MERIT_HUB_API_KEY")]
        hub_api_key: Option<String>,
    },

    /// Sign an expiring redemption voucher for a verified claim
    IssueVoucher {
        /// Claim id
        claim: i64,

        /// Issuer private key, hex encoded
        #[arg(long, env = "MERIT_SIGNER_KEY", hide_env_values = true)]
        signer_key: String,

        /// Chain id the voucher is bound to
        #[arg(long, default_value = "8453")]
        chain_id: u64,

        /// Airdrop contract that redeems the voucher
        #[arg(long)]
        airdrop_contract: String,

        /// Days until the voucher expires
        #[arg(long, default_value = "30")]
        validity_days: i64,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,
    },

    /// Confirm the share step that gates a share-required claim
    ConfirmShare {
        /// Claim id
        claim: i64,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,

        /// Social-graph hub HTTP endpoint
        #[arg(long, default_value = "http://127.0.0.1:2281")]
        hub_url: String,

        /// Hub API key, sent as x-api-key
        #[arg(long, env = "MERIT_HUB_API_KEY")]
        hub_api_key: Option<String>,
    },

    /// Record the transaction that redeemed a signed claim
    ConfirmRedemption {
        /// Claim id
        claim: i64,

        /// Hash of the redemption transaction
        tx_hash: String,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,
    },

    /// Stop accepting submissions for a campaign
    PauseCampaign {
        /// Campaign slug
        campaign: String,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,
    },

    /// Re-open a paused campaign
    ResumeCampaign {
        /// Campaign slug
        campaign: String,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,
    },

    /// Recompute denormalized counters from the claims ledger
    ReconcileCounters {
        /// Restrict the repair to one campaign
        #[arg(short, long)]
        campaign: Option<String>,

        /// Claims ledger database
        #[arg(short, long, default_value = "merit.db")]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        report(&e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::CreateCampaign { config, db } => {
            commands::create_campaign::execute(config, db).await
        }

        Commands::CampaignStatus { campaign, db } => {
            commands::campaign_status::execute(campaign, db).await
        }

        Commands::CheckEligibility {
            campaign,
            claimant,
            db,
        } => commands::check_eligibility::execute(campaign, claimant, db).await,

        Commands::SubmitClaim {
            campaign,
            recipient,
            tx_hash,
            fid,
            quantity,
            db,
            rpc_url,
            indexer_url,
            hub_url,
            hub_api_key,
        } => {
            commands::submit_claim::execute(
                campaign,
                recipient,
                tx_hash,
                fid,
                quantity,
                db,
                rpc_url,
                indexer_url,
                hub_url,
                hub_api_key,
            )
            .await
        }

        Commands::IssueVoucher {
            claim,
            signer_key,
            chain_id,
            airdrop_contract,
            validity_days,
            db,
        } => {
            commands::issue_voucher::execute(
                claim,
                signer_key,
                chain_id,
                airdrop_contract,
                validity_days,
                db,
            )
            .await
        }

        Commands::ConfirmShare {
            claim,
            db,
            hub_url,
            hub_api_key,
        } => commands::confirm_share::execute(claim, db, hub_url, hub_api_key).await,

        Commands::ConfirmRedemption { claim, tx_hash, db } => {
            commands::confirm_redemption::execute(claim, tx_hash, db).await
        }

        Commands::PauseCampaign { campaign, db } => {
            commands::pause_campaign::execute(campaign, db).await
        }

        Commands::ResumeCampaign { campaign, db } => {
            commands::resume_campaign::execute(campaign, db).await
        }

        Commands::ReconcileCounters { campaign, db } => {
            commands::reconcile_counters::execute(campaign, db).await
        }
    }
}

fn report(error: &CliError) {
    match error {
        // Rejections go out as the same JSON shape API clients receive.
        CliError::Engine(engine) => match serde_json::to_string_pretty(&engine.to_rejection()) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("Error: {}", engine),
        },
        other => eprintln!("Error: {}", other),
    }
}

fn exit_code(error: &CliError) -> i32 {
    // 75 is EX_TEMPFAIL, the conventional exit code for retry-safe failures.
    match error {
        CliError::Engine(engine) if engine.retryable() => 75,
        _ => 1,
    }
}
