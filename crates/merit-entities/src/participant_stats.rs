use sea_orm::entity::prelude::*;

/// Per-claimant rollup, maintained best-effort after each accepted claim.
/// Quota decisions never read this table; `reconcile` rebuilds it from the
/// claims ledger when it drifts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "participant_stats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub campaign_slug: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub claimant: String,
    pub units_claimed: i64,
    pub claims_count: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
