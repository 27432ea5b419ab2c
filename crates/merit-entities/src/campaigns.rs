use sea_orm::entity::prelude::*;

/// Which verification strategy a campaign runs.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CampaignKind {
    /// Rewards an on-chain token mint, proven by a transaction hash.
    #[sea_orm(string_value = "token_mint")]
    TokenMint,
    /// Rewards social engagement with a cast, proven by graph membership.
    #[sea_orm(string_value = "engagement")]
    Engagement,
}

impl std::fmt::Display for CampaignKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignKind::TokenMint => f.write_str("token_mint"),
            CampaignKind::Engagement => f.write_str("engagement"),
        }
    }
}

/// Campaign definition plus its denormalized `claimed_units` counter.
///
/// Address and uint256 columns are stored as strings: lower-hex for
/// addresses, decimal for amounts. `target_*` columns apply per `kind`;
/// the `gate_*` columns are an optional holding requirement checked on
/// every submission regardless of kind.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub slug: String,
    pub kind: CampaignKind,
    pub active: bool,
    pub starts_at: Option<DateTimeUtc>,
    pub ends_at: Option<DateTimeUtc>,
    pub supply_cap: Option<i64>,
    pub per_user_cap: Option<i64>,
    pub reward_token: String,
    pub reward_per_unit: String,
    pub target_contract: Option<String>,
    pub target_token_id: Option<String>,
    pub target_cast_hash: Option<String>,
    pub required_engagements: Option<String>,
    pub gate_contract: Option<String>,
    pub gate_token_id: Option<String>,
    pub gate_min_balance: Option<String>,
    pub requires_share: bool,
    pub share_cast_hash: Option<String>,
    pub claimed_units: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::claims::Entity")]
    Claims,
}

impl Related<super::claims::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Claims.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
