use crate::{Campaign, EngineError, EngineResult};
use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use merit_entities::{claims, ClaimState};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QuerySelect, Set, SqlErr,
};

/// Result of attempting to persist a verified claim.
pub(crate) enum InsertOutcome {
    Inserted(claims::Model),
    /// The unique (campaign, idempotency key) index fired; this is the row
    /// that won.
    Duplicate(claims::Model),
}

/// Result of attempting to finalize a redemption.
pub(crate) enum RedeemOutcome {
    Redeemed(claims::Model),
    /// The unique redemption hash index fired: the transaction already
    /// settled some other claim.
    HashTaken,
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Insert a freshly verified claim, relying on the unique index (not a
/// read-then-write) to resolve duplicate submissions. Losing the race is
/// not an error; the surviving row is fetched and returned.
pub(crate) async fn insert_verified_claim(
    db: &DatabaseConnection,
    campaign: &Campaign,
    claimant: &str,
    recipient: Address,
    fid: Option<u64>,
    idempotency_key: &str,
    quantity: u64,
    reward_amount: U256,
    now: DateTime<Utc>,
) -> EngineResult<InsertOutcome> {
    let row = claims::ActiveModel {
        campaign_slug: Set(campaign.slug.clone()),
        claimant: Set(claimant.to_owned()),
        recipient: Set(format!("{recipient:#x}")),
        fid: Set(fid.map(|f| f as i64)),
        idempotency_key: Set(idempotency_key.to_owned()),
        verified_quantity: Set(quantity_to_i64(quantity)?),
        reward_amount: Set(reward_amount.to_string()),
        state: Set(ClaimState::Verified),
        created_at: Set(now),
        ..Default::default()
    };

    match claims::Entity::insert(row).exec_with_returning(db).await {
        Ok(model) => Ok(InsertOutcome::Inserted(model)),
        Err(err) if is_unique_violation(&err) => {
            let existing = find_by_idempotency_key(db, &campaign.slug, idempotency_key)
                .await?
                .ok_or(EngineError::Db(err))?;
            Ok(InsertOutcome::Duplicate(existing))
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn claim_by_id(db: &DatabaseConnection, id: i64) -> EngineResult<claims::Model> {
    claims::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(EngineError::ClaimNotFound(id))
}

pub(crate) async fn find_by_idempotency_key(
    db: &DatabaseConnection,
    campaign_slug: &str,
    idempotency_key: &str,
) -> Result<Option<claims::Model>, DbErr> {
    claims::Entity::find()
        .filter(claims::Column::CampaignSlug.eq(campaign_slug))
        .filter(claims::Column::IdempotencyKey.eq(idempotency_key))
        .one(db)
        .await
}

pub(crate) async fn find_by_redemption_hash(
    db: &DatabaseConnection,
    tx_hash: &str,
) -> Result<Option<claims::Model>, DbErr> {
    claims::Entity::find()
        .filter(claims::Column::RedemptionTxHash.eq(tx_hash))
        .one(db)
        .await
}

/// Sum of verified quantities, campaign-wide or for one claimant. This is
/// the authoritative consumption figure behind every quota decision.
pub(crate) async fn consumed_units(
    db: &DatabaseConnection,
    campaign_slug: &str,
    claimant: Option<&str>,
) -> EngineResult<u64> {
    let mut query = claims::Entity::find()
        .select_only()
        .column_as(claims::Column::VerifiedQuantity.sum(), "consumed")
        .filter(claims::Column::CampaignSlug.eq(campaign_slug));
    if let Some(claimant) = claimant {
        query = query.filter(claims::Column::Claimant.eq(claimant));
    }
    let consumed: Option<i64> = query.into_tuple().one(db).await?.flatten();
    Ok(consumed.unwrap_or(0).max(0) as u64)
}

/// Attach a signed voucher and advance the claim's state, atomically from
/// the caller's point of view: either all voucher columns land or none do.
pub(crate) async fn attach_voucher(
    db: &DatabaseConnection,
    claim: claims::Model,
    uid: B256,
    payload_hex: String,
    signature_hex: String,
    expires_at: DateTime<Utc>,
    next_state: ClaimState,
    now: DateTime<Utc>,
) -> EngineResult<claims::Model> {
    let mut active: claims::ActiveModel = claim.into();
    active.voucher_uid = Set(Some(format!("{uid:#x}")));
    active.voucher_payload = Set(Some(payload_hex));
    active.voucher_signature = Set(Some(signature_hex));
    active.voucher_expires_at = Set(Some(expires_at));
    active.state = Set(next_state);
    active.signed_at = Set(Some(now));
    Ok(claims::Entity::update(active).exec(db).await?)
}

pub(crate) async fn mark_share_confirmed(
    db: &DatabaseConnection,
    claim: claims::Model,
) -> EngineResult<claims::Model> {
    let mut active: claims::ActiveModel = claim.into();
    active.state = Set(ClaimState::Signed);
    Ok(claims::Entity::update(active).exec(db).await?)
}

/// Record a redemption. Exclusivity across claims is enforced by the
/// unique index on the hash column, so a lost race surfaces here as
/// [`RedeemOutcome::HashTaken`] rather than a second redeemed row.
pub(crate) async fn mark_redeemed(
    db: &DatabaseConnection,
    claim: claims::Model,
    tx_hash: &str,
    now: DateTime<Utc>,
) -> EngineResult<RedeemOutcome> {
    let mut active: claims::ActiveModel = claim.into();
    active.redemption_tx_hash = Set(Some(tx_hash.to_owned()));
    active.state = Set(ClaimState::Redeemed);
    active.redeemed_at = Set(Some(now));
    match claims::Entity::update(active).exec(db).await {
        Ok(model) => Ok(RedeemOutcome::Redeemed(model)),
        Err(err) if is_unique_violation(&err) => Ok(RedeemOutcome::HashTaken),
        Err(err) => Err(err.into()),
    }
}

fn quantity_to_i64(quantity: u64) -> EngineResult<i64> {
    i64::try_from(quantity)
        .map_err(|_| EngineError::InvalidProof("quantity exceeds the ledger range".into()))
}
