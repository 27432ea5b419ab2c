use crate::claim::{ClaimRecord, ClaimSubmission, ProofReference, StoredVoucher, SubmitOutcome};
use crate::counters::{self, CounterDrift};
use crate::ledger::{self, InsertOutcome, RedeemOutcome};
use crate::quota::{self, QuotaUsage};
use crate::{
    verifier, Campaign, CampaignConfig, EngineConfig, EngineError, EngineResult, Target,
};
use alloy_primitives::{Address, B256};
use chrono::{SubsecRound, Utc};
use merit_chain::{HoldingsSource, ReceiptSource};
use merit_entities::{campaigns, claims, ClaimState};
use merit_social::{Engagement, SocialGraph};
use merit_voucher::{single_recipient_request, voucher_uid, VoucherIssuer};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The claim engine: campaign administration, claim verification, voucher
/// issuance and redemption tracking over one ledger database.
///
/// All verification runs against pluggable sources ([`ReceiptSource`],
/// [`HoldingsSource`], [`SocialGraph`]) and all signing behind a
/// [`VoucherIssuer`], so deployments choose transports and custody while the
/// claim lifecycle stays identical.
pub struct ClaimEngine {
    db: DatabaseConnection,
    receipts: Arc<dyn ReceiptSource>,
    holdings: Arc<dyn HoldingsSource>,
    social: Arc<dyn SocialGraph>,
    issuer: Arc<dyn VoucherIssuer>,
    config: EngineConfig,
}

/// Reporting view of one campaign: the authoritative figures next to the
/// denormalized counter, so drift is visible without a repair pass.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignStatus {
    pub slug: String,
    pub kind: String,
    pub active: bool,
    pub supply_cap: Option<u64>,
    /// Units granted so far, summed from the claims ledger.
    pub consumed_supply: u64,
    pub remaining_supply: Option<u64>,
    /// The denormalized campaign counter, which may lag the ledger.
    pub counter_units: i64,
    pub counter_drift: bool,
    pub total_claims: u64,
    pub redeemed_claims: u64,
}

/// Answer to "could this claimant still claim here", computed without
/// touching any external source.
#[derive(Debug, Clone, Serialize)]
pub struct Eligibility {
    pub campaign: String,
    pub claimant: String,
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_reason: Option<String>,
    pub user_consumed: u64,
    /// `None` means uncapped.
    pub remaining_supply: Option<u64>,
    pub remaining_user_quota: Option<u64>,
}

/// A signed voucher in the shape clients hand to the redemption contract:
/// the ABI-encoded request plus the issuer signature, with the decoded
/// fields alongside for display.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedVoucher {
    pub claim_id: i64,
    pub state: String,
    pub uid: String,
    pub token_address: Address,
    pub expiration_timestamp: u64,
    pub contents: Vec<VoucherContent>,
    pub payload: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoucherContent {
    pub recipient: Address,
    pub amount: String,
}

impl IssuedVoucher {
    fn from_stored(record: &ClaimRecord, stored: &StoredVoucher) -> EngineResult<Self> {
        let request = merit_voucher::decode_payload(&stored.payload)?;
        let expiration_timestamp = u64::try_from(request.expirationTimestamp).map_err(|_| {
            EngineError::CorruptClaim(format!(
                "claim {}: voucher expiration out of range",
                record.id
            ))
        })?;
        Ok(IssuedVoucher {
            claim_id: record.id,
            state: record.state.to_string(),
            uid: stored.uid.clone(),
            token_address: request.tokenAddress,
            expiration_timestamp,
            contents: request
                .contents
                .iter()
                .map(|content| VoucherContent {
                    recipient: content.recipient,
                    amount: content.amount.to_string(),
                })
                .collect(),
            payload: format!("0x{}", hex::encode(&stored.payload)),
            signature: format!("0x{}", hex::encode(&stored.signature)),
        })
    }
}

impl ClaimEngine {
    pub fn new(
        db: DatabaseConnection,
        receipts: Arc<dyn ReceiptSource>,
        holdings: Arc<dyn HoldingsSource>,
        social: Arc<dyn SocialGraph>,
        issuer: Arc<dyn VoucherIssuer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            db,
            receipts,
            holdings,
            social,
            issuer,
            config,
        }
    }

    pub fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Address redeemed vouchers recover to; the contract must trust it.
    pub fn issuer_address(&self) -> Address {
        self.issuer.issuer_address()
    }

    /// Persist a new campaign from its validated config.
    pub async fn create_campaign(&self, config: CampaignConfig) -> EngineResult<Campaign> {
        let slug = config.slug.clone();
        let row = config.into_active_model(Utc::now())?;
        let model = match campaigns::Entity::insert(row).exec_with_returning(&self.db).await {
            Ok(model) => model,
            Err(err) if ledger::is_unique_violation(&err) => {
                return Err(EngineError::InvalidConfig(format!(
                    "campaign `{slug}` already exists"
                )));
            }
            Err(err) => return Err(err.into()),
        };
        info!(campaign = %model.slug, kind = %model.kind, "campaign created");
        Campaign::from_model(model)
    }

    pub async fn campaign(&self, slug: &str) -> EngineResult<Campaign> {
        let model = campaigns::Entity::find_by_id(slug.to_owned())
            .one(&self.db)
            .await?
            .ok_or_else(|| EngineError::CampaignNotFound(slug.to_owned()))?;
        Campaign::from_model(model)
    }

    /// Pause (`active = false`) or resume a campaign. Already-issued
    /// vouchers are unaffected; only new submissions are gated.
    pub async fn set_campaign_active(&self, slug: &str, active: bool) -> EngineResult<Campaign> {
        let model = campaigns::Entity::find_by_id(slug.to_owned())
            .one(&self.db)
            .await?
            .ok_or_else(|| EngineError::CampaignNotFound(slug.to_owned()))?;
        if model.active == active {
            return Campaign::from_model(model);
        }
        let mut row: campaigns::ActiveModel = model.into();
        row.active = Set(active);
        let updated = campaigns::Entity::update(row).exec(&self.db).await?;
        info!(campaign = slug, active, "campaign activity changed");
        Campaign::from_model(updated)
    }

    pub async fn campaign_status(&self, slug: &str) -> EngineResult<CampaignStatus> {
        let campaign = self.campaign(slug).await?;
        let consumed = ledger::consumed_units(&self.db, slug, None).await?;
        let total_claims = claims::Entity::find()
            .filter(claims::Column::CampaignSlug.eq(slug))
            .count(&self.db)
            .await?;
        let redeemed_claims = claims::Entity::find()
            .filter(claims::Column::CampaignSlug.eq(slug))
            .filter(claims::Column::State.eq(ClaimState::Redeemed))
            .count(&self.db)
            .await?;

        Ok(CampaignStatus {
            slug: campaign.slug.clone(),
            kind: campaign.kind().to_string(),
            active: campaign.active,
            supply_cap: campaign.supply_cap,
            consumed_supply: consumed,
            remaining_supply: campaign.supply_cap.map(|cap| cap.saturating_sub(consumed)),
            counter_units: campaign.claimed_units,
            counter_drift: campaign.claimed_units != consumed as i64,
            total_claims,
            redeemed_claims,
        })
    }

    /// Report remaining allowances for one claimant without running any
    /// verification. Advisory only: `submit_claim` re-derives everything.
    pub async fn check_eligibility(&self, slug: &str, claimant: &str) -> EngineResult<Eligibility> {
        let campaign = self.campaign(slug).await?;
        let usage = self.quota_usage(slug, claimant).await?;
        let (remaining_supply, remaining_user) = quota::remaining(&campaign, usage);

        let window = quota::check_window(&campaign, Utc::now());
        let closed_reason = match &window {
            Ok(()) => None,
            Err(err) => Some(err.to_string()),
        };
        let quota_open = remaining_supply.map_or(true, |r| r > 0)
            && remaining_user.map_or(true, |r| r > 0);

        Ok(Eligibility {
            campaign: campaign.slug.clone(),
            claimant: claimant.to_owned(),
            open: window.is_ok() && quota_open,
            closed_reason,
            user_consumed: usage.user_consumed,
            remaining_supply,
            remaining_user_quota: remaining_user,
        })
    }

    pub async fn claim(&self, claim_id: i64) -> EngineResult<ClaimRecord> {
        ClaimRecord::from_model(ledger::claim_by_id(&self.db, claim_id).await?)
    }

    /// Verify a claimed action and persist it as a ledger row.
    ///
    /// The pipeline: campaign window, quota against the declared quantity,
    /// holding gate, verification against the authoritative source, quota
    /// again against the verified quantity, then the insert. The declared
    /// quantity never reaches the ledger; what is persisted is what the
    /// source proved. Submitting the same action twice resolves to the
    /// surviving row via [`SubmitOutcome::Existing`].
    pub async fn submit_claim(&self, submission: ClaimSubmission) -> EngineResult<SubmitOutcome> {
        if submission.declared_quantity == 0 {
            return Err(EngineError::InvalidProof(
                "declared quantity must be at least 1".into(),
            ));
        }

        let campaign = self.campaign(&submission.campaign).await?;
        let now = Utc::now();
        quota::check_window(&campaign, now)?;

        let claimant = match &campaign.target {
            Target::Mint { .. } => format!("{:#x}", submission.recipient),
            Target::Engagement { .. } => submission
                .fid
                .ok_or_else(|| {
                    EngineError::InvalidProof(
                        "engagement campaigns require the claimant fid".into(),
                    )
                })?
                .to_string(),
        };

        let usage = self.quota_usage(&campaign.slug, &claimant).await?;
        quota::check_quota(&campaign, usage, submission.declared_quantity)?;

        if let Some(gate) = &campaign.gate {
            let held = self
                .holdings
                .erc1155_balance(gate.contract, submission.recipient, gate.token_id)
                .await?;
            if held < gate.min_balance {
                return Err(EngineError::GateNotMet {
                    contract: gate.contract,
                    token_id: gate.token_id,
                    required: gate.min_balance,
                    held,
                });
            }
        }

        let verified = match (&campaign.target, submission.proof) {
            (Target::Mint { contract, token_id }, ProofReference::Transaction(tx_hash)) => {
                verifier::verify_onchain(
                    self.receipts.as_ref(),
                    *contract,
                    *token_id,
                    submission.recipient,
                    tx_hash,
                    submission.declared_quantity,
                )
                .await?
            }
            (Target::Mint { .. }, ProofReference::Engagement) => {
                return Err(EngineError::InvalidProof(
                    "mint campaigns are proven by a transaction hash".into(),
                ));
            }
            (
                Target::Engagement {
                    cast_hash,
                    required,
                },
                ProofReference::Engagement,
            ) => {
                let fid = submission.fid.ok_or_else(|| {
                    EngineError::InvalidProof(
                        "engagement campaigns require the claimant fid".into(),
                    )
                })?;
                verifier::verify_engagement(
                    self.social.as_ref(),
                    cast_hash,
                    required,
                    fid,
                    self.config.engagement_scan_limit,
                    self.config.reply_scan_depth,
                )
                .await?
            }
            (Target::Engagement { .. }, ProofReference::Transaction(_)) => {
                return Err(EngineError::InvalidProof(
                    "engagement campaigns are proven by graph membership, not a transaction"
                        .into(),
                ));
            }
        };

        if verified.quantity != submission.declared_quantity {
            debug!(
                declared = submission.declared_quantity,
                verified = verified.quantity,
                "declared quantity differs from what the source proved"
            );
        }

        // Quota again, now against the proven quantity; only this check
        // gates what is persisted.
        let usage = self.quota_usage(&campaign.slug, &claimant).await?;
        quota::check_quota(&campaign, usage, verified.quantity)?;
        let reward = campaign.reward_for(verified.quantity)?;

        match ledger::insert_verified_claim(
            &self.db,
            &campaign,
            &claimant,
            submission.recipient,
            submission.fid,
            &verified.idempotency_key,
            verified.quantity,
            reward,
            now,
        )
        .await?
        {
            InsertOutcome::Inserted(model) => {
                if let Err(err) =
                    counters::record_claim(&self.db, &campaign.slug, &claimant, verified.quantity, now)
                        .await
                {
                    warn!(
                        campaign = %campaign.slug,
                        error = %err,
                        "aggregate counter update failed; ledger remains authoritative"
                    );
                }
                info!(
                    campaign = %campaign.slug,
                    claim = model.id,
                    quantity = verified.quantity,
                    "claim verified"
                );
                Ok(SubmitOutcome::Created(ClaimRecord::from_model(model)?))
            }
            InsertOutcome::Duplicate(model) => {
                debug!(
                    campaign = %campaign.slug,
                    claim = model.id,
                    "duplicate submission resolved to the surviving claim"
                );
                Ok(SubmitOutcome::Existing(ClaimRecord::from_model(model)?))
            }
        }
    }

    /// Sign a voucher for a verified claim.
    ///
    /// Re-issuing returns the stored voucher unchanged: the uid derives from
    /// the claim's idempotency key and ECDSA signing is deterministic, so
    /// there is exactly one voucher per claim, ever. A signer failure leaves
    /// the claim `verified` and is safe to retry.
    pub async fn issue_voucher(&self, claim_id: i64) -> EngineResult<IssuedVoucher> {
        let model = ledger::claim_by_id(&self.db, claim_id).await?;
        let record = ClaimRecord::from_model(model.clone())?;

        if let Some(stored) = &record.voucher {
            debug!(claim = claim_id, "voucher already issued; returning the stored one");
            return IssuedVoucher::from_stored(&record, stored);
        }
        if record.state != ClaimState::Verified {
            return Err(EngineError::InvalidState {
                id: claim_id,
                state: record.state.to_string(),
                expected: "`verified`",
            });
        }

        let campaign = self.campaign(&record.campaign).await?;
        let uid = voucher_uid(&campaign.slug, &record.idempotency_key);
        // Whole seconds, so the stored timestamp equals the one the
        // contract enforces.
        let expires_at = (Utc::now() + self.config.voucher_validity).trunc_subsecs(0);
        let request = single_recipient_request(
            uid,
            campaign.reward_token,
            expires_at.timestamp() as u64,
            record.recipient,
            record.reward_amount,
        );
        let signed = self.issuer.sign_request(&request).await?;

        let next_state = if campaign.share.is_some() {
            ClaimState::ShareRequired
        } else {
            ClaimState::Signed
        };
        let updated = ledger::attach_voucher(
            &self.db,
            model,
            uid,
            hex::encode(&signed.payload),
            hex::encode(&signed.signature),
            expires_at,
            next_state,
            Utc::now(),
        )
        .await?;
        info!(claim = claim_id, uid = %uid, state = %updated.state, "voucher issued");

        let record = ClaimRecord::from_model(updated)?;
        let stored = record.voucher.as_ref().ok_or_else(|| {
            EngineError::CorruptClaim(format!("claim {claim_id}: voucher columns missing after issuance"))
        })?;
        IssuedVoucher::from_stored(&record, stored)
    }

    /// Record that the claimant completed the share step, verifying it as a
    /// recast when the campaign names a cast to share. Idempotent once the
    /// claim has moved on.
    pub async fn confirm_share(&self, claim_id: i64) -> EngineResult<ClaimRecord> {
        let model = ledger::claim_by_id(&self.db, claim_id).await?;
        match model.state {
            ClaimState::Signed | ClaimState::Redeemed => {
                debug!(claim = claim_id, "share already confirmed");
                return ClaimRecord::from_model(model);
            }
            ClaimState::Verified => {
                return Err(EngineError::InvalidState {
                    id: claim_id,
                    state: model.state.to_string(),
                    expected: "`share_required` (issue the voucher first)",
                });
            }
            ClaimState::ShareRequired => {}
        }

        let campaign = self.campaign(&model.campaign_slug).await?;
        let verified_cast = campaign.share.as_ref().and_then(|s| s.cast_hash.as_deref());
        if let Some(cast_hash) = verified_cast {
            let fid = model.fid.map(|f| f as u64).ok_or_else(|| {
                EngineError::InvalidProof("verified shares require the claimant fid".into())
            })?;
            let recasts = self
                .social
                .reactions(cast_hash, Engagement::Recast, self.config.engagement_scan_limit)
                .await?;
            if !recasts.iter().any(|recast| recast.fid == fid) {
                return Err(EngineError::MissingEngagements(vec![Engagement::Recast]));
            }
        }

        let updated = ledger::mark_share_confirmed(&self.db, model).await?;
        info!(claim = claim_id, "share confirmed");
        ClaimRecord::from_model(updated)
    }

    /// Record the on-chain redemption of a signed claim.
    ///
    /// One transaction hash settles exactly one claim; reporting the same
    /// (claim, hash) pair again is a no-op, any other reuse of the hash is
    /// rejected.
    pub async fn confirm_redemption(
        &self,
        claim_id: i64,
        tx_hash: B256,
    ) -> EngineResult<ClaimRecord> {
        let model = ledger::claim_by_id(&self.db, claim_id).await?;
        let hash = format!("{tx_hash:#x}");

        match model.state {
            ClaimState::Redeemed => {
                return if model.redemption_tx_hash.as_deref() == Some(hash.as_str()) {
                    debug!(claim = claim_id, "redemption already recorded");
                    ClaimRecord::from_model(model)
                } else {
                    Err(EngineError::InvalidState {
                        id: claim_id,
                        state: model.state.to_string(),
                        expected: "a single redemption transaction per claim",
                    })
                };
            }
            ClaimState::Verified => {
                return Err(EngineError::InvalidState {
                    id: claim_id,
                    state: model.state.to_string(),
                    expected: "`signed` (issue the voucher first)",
                });
            }
            ClaimState::ShareRequired => {
                return Err(EngineError::InvalidState {
                    id: claim_id,
                    state: model.state.to_string(),
                    expected: "`signed` (confirm the share first)",
                });
            }
            ClaimState::Signed => {}
        }

        // Fast-path rejection; under a race the unique index decides.
        if let Some(other) = ledger::find_by_redemption_hash(&self.db, &hash).await? {
            if other.id != claim_id {
                return Err(EngineError::RedemptionHashReused);
            }
        }

        match ledger::mark_redeemed(&self.db, model, &hash, Utc::now()).await? {
            RedeemOutcome::Redeemed(updated) => {
                info!(claim = claim_id, tx = %tx_hash, "redemption recorded");
                ClaimRecord::from_model(updated)
            }
            RedeemOutcome::HashTaken => Err(EngineError::RedemptionHashReused),
        }
    }

    /// Recompute the denormalized counters from the claims ledger, returning
    /// the campaign-level corrections that were applied.
    pub async fn reconcile_counters(
        &self,
        campaign: Option<&str>,
    ) -> EngineResult<Vec<CounterDrift>> {
        counters::reconcile(&self.db, campaign).await
    }

    async fn quota_usage(&self, slug: &str, claimant: &str) -> EngineResult<QuotaUsage> {
        let campaign_consumed = ledger::consumed_units(&self.db, slug, None).await?;
        let user_consumed = ledger::consumed_units(&self.db, slug, Some(claimant)).await?;
        Ok(QuotaUsage {
            campaign_consumed,
            user_consumed,
        })
    }
}
