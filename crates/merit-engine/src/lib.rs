/*!
# Merit Claim Engine

Verification, quota enforcement and signed-voucher issuance for reward
campaigns. Claimants point at an action they already performed (an on-chain
mint, an engagement with a cast); the engine checks the claim against the
authoritative source, records it once in a sqlite ledger, and signs a
voucher the reward contract pays out against.

The claims ledger is the single source of truth: quotas, duplicate
suppression and redemption exclusivity all rest on its unique indexes, not
on the denormalized counters kept alongside for reporting.

## Quick Start

```rust
use merit_engine::{open_ledger_db, ClaimEngine, EngineConfig};
use merit_chain::{ChainConfig, FallbackHoldings, IndexerHoldings, RpcClient};
use merit_social::{HubClient, HubConfig};
use merit_voucher::LocalVoucherSigner;
use std::sync::Arc;
use std::time::Duration;

# async fn example() -> Result<(), Box<dyn std::error::Error>> {
let db = open_ledger_db("merit.db").await?;

let rpc = Arc::new(RpcClient::new(ChainConfig {
    rpc_url: "https://mainnet.base.org".parse()?,
    ..Default::default()
})?);
let holdings = Arc::new(FallbackHoldings::new(
    rpc.clone(),
    Arc::new(IndexerHoldings::new(
        "https://indexer.example.com".parse()?,
        Duration::from_secs(10),
    )?),
));
let social = Arc::new(HubClient::new(HubConfig::default())?);

let key = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d".parse()?;
let airdrop_contract = "0x4200000000000000000000000000000000000042".parse()?;
let issuer = Arc::new(LocalVoucherSigner::new(key, 8453, airdrop_contract));

let engine = ClaimEngine::new(db, rpc, holdings, social, issuer, EngineConfig::default());
let status = engine.campaign_status("launch-mint").await?;
println!("{} units granted", status.consumed_supply);
# Ok(())
# }
```

## Submitting a Claim

```rust
# use merit_engine::{ClaimEngine, ClaimSubmission, ProofReference};
# async fn example(engine: &ClaimEngine) -> Result<(), Box<dyn std::error::Error>> {
let outcome = engine
    .submit_claim(ClaimSubmission {
        campaign: "launch-mint".into(),
        recipient: "0x1111111111111111111111111111111111111111".parse()?,
        fid: None,
        proof: ProofReference::Transaction("0x2222222222222222222222222222222222222222222222222222222222222222".parse()?),
        declared_quantity: 1,
    })
    .await?;

// A resubmission of the same transaction lands here too, resolved to the
// original claim instead of a second row.
let voucher = engine.issue_voucher(outcome.record().id).await?;
println!("voucher {} expires at {}", voucher.uid, voucher.expiration_timestamp);
# Ok(())
# }
```
*/

mod campaign;
mod claim;
mod config;
mod counters;
mod database;
mod engine;
mod error;
mod ledger;
mod quota;
mod verifier;

pub use campaign::{
    Campaign, CampaignConfig, GateConfig, HoldingGate, ShareConfig, ShareGate, Target, TargetConfig,
};
pub use claim::{
    ClaimRecord, ClaimSubmission, ProofReference, StoredVoucher, SubmitOutcome, SubmitReceipt,
};
pub use config::EngineConfig;
pub use counters::CounterDrift;
pub use database::{open_ledger_db, open_ledger_db_readonly};
pub use engine::{CampaignStatus, ClaimEngine, Eligibility, IssuedVoucher, VoucherContent};
pub use error::{ClosedReason, EngineError, EngineResult, QuotaScope, Rejection};
pub use quota::QuotaUsage;

// Vocabulary types that travel with the engine API, re-exported for
// convenience.
pub use merit_entities::{CampaignKind, ClaimState};
pub use merit_social::Engagement;
