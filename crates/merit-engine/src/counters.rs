use crate::ledger;
use crate::EngineResult;
use chrono::{DateTime, Utc};
use merit_entities::{campaigns, claims, participant_stats};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter, QuerySelect,
    Set,
};
use serde::Serialize;
use tracing::info;

/// Bump the denormalized counters after an accepted claim. Called outside
/// the claim's success path: a failure here leaves the counters stale (the
/// caller logs it) and `reconcile` repairs them later.
pub(crate) async fn record_claim(
    db: &DatabaseConnection,
    campaign_slug: &str,
    claimant: &str,
    quantity: u64,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    let quantity = quantity.min(i64::MAX as u64) as i64;

    campaigns::Entity::update_many()
        .col_expr(
            campaigns::Column::ClaimedUnits,
            Expr::col(campaigns::Column::ClaimedUnits).add(quantity),
        )
        .filter(campaigns::Column::Slug.eq(campaign_slug))
        .exec(db)
        .await?;

    let stats = participant_stats::ActiveModel {
        campaign_slug: Set(campaign_slug.to_owned()),
        claimant: Set(claimant.to_owned()),
        units_claimed: Set(quantity),
        claims_count: Set(1),
        updated_at: Set(now),
    };
    participant_stats::Entity::insert(stats)
        .on_conflict(
            OnConflict::columns([
                participant_stats::Column::CampaignSlug,
                participant_stats::Column::Claimant,
            ])
            .value(
                participant_stats::Column::UnitsClaimed,
                Expr::col(participant_stats::Column::UnitsClaimed).add(quantity),
            )
            .value(
                participant_stats::Column::ClaimsCount,
                Expr::col(participant_stats::Column::ClaimsCount).add(1),
            )
            .value(participant_stats::Column::UpdatedAt, now)
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(())
}

/// One repaired campaign counter.
#[derive(Debug, Clone, Serialize)]
pub struct CounterDrift {
    pub campaign: String,
    pub recorded_units: i64,
    pub ledger_units: i64,
}

#[derive(Debug, FromQueryResult)]
struct PerClaimantUsage {
    claimant: String,
    units: Option<i64>,
    claims: i64,
}

/// Recompute every counter from the claims ledger and overwrite what
/// drifted. Returns the campaign-level corrections for reporting.
pub(crate) async fn reconcile(
    db: &DatabaseConnection,
    campaign_slug: Option<&str>,
) -> EngineResult<Vec<CounterDrift>> {
    let mut query = campaigns::Entity::find();
    if let Some(slug) = campaign_slug {
        query = query.filter(campaigns::Column::Slug.eq(slug));
    }
    let campaigns_to_check = query.all(db).await?;

    let mut drifts = Vec::new();
    for campaign in campaigns_to_check {
        let slug = campaign.slug.clone();
        let ledger_units = ledger::consumed_units(db, &slug, None).await? as i64;

        if campaign.claimed_units != ledger_units {
            info!(
                campaign = %slug,
                recorded = campaign.claimed_units,
                ledger = ledger_units,
                "repairing drifted campaign counter"
            );
            drifts.push(CounterDrift {
                campaign: slug.clone(),
                recorded_units: campaign.claimed_units,
                ledger_units,
            });
            let mut active: campaigns::ActiveModel = campaign.into();
            active.claimed_units = Set(ledger_units);
            campaigns::Entity::update(active).exec(db).await?;
        }

        rebuild_participant_stats(db, &slug).await?;
    }
    Ok(drifts)
}

async fn rebuild_participant_stats(db: &DatabaseConnection, campaign_slug: &str) -> EngineResult<()> {
    let usages: Vec<PerClaimantUsage> = claims::Entity::find()
        .select_only()
        .column(claims::Column::Claimant)
        .column_as(claims::Column::VerifiedQuantity.sum(), "units")
        .column_as(claims::Column::Id.count(), "claims")
        .filter(claims::Column::CampaignSlug.eq(campaign_slug))
        .group_by(claims::Column::Claimant)
        .into_model()
        .all(db)
        .await?;

    let now = Utc::now();
    for usage in usages {
        let stats = participant_stats::ActiveModel {
            campaign_slug: Set(campaign_slug.to_owned()),
            claimant: Set(usage.claimant),
            units_claimed: Set(usage.units.unwrap_or(0)),
            claims_count: Set(usage.claims),
            updated_at: Set(now),
        };
        participant_stats::Entity::insert(stats)
            .on_conflict(
                OnConflict::columns([
                    participant_stats::Column::CampaignSlug,
                    participant_stats::Column::Claimant,
                ])
                .update_columns([
                    participant_stats::Column::UnitsClaimed,
                    participant_stats::Column::ClaimsCount,
                    participant_stats::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }
    Ok(())
}
