use sea_orm::entity::prelude::*;

/// Claim lifecycle. Rows only move forward; a submission that fails
/// verification never produces a row at all.
///
/// `verified -> [share_required ->] signed -> redeemed`
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ClaimState {
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "share_required")]
    ShareRequired,
    #[sea_orm(string_value = "signed")]
    Signed,
    #[sea_orm(string_value = "redeemed")]
    Redeemed,
}

impl std::fmt::Display for ClaimState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimState::Verified => f.write_str("verified"),
            ClaimState::ShareRequired => f.write_str("share_required"),
            ClaimState::Signed => f.write_str("signed"),
            ClaimState::Redeemed => f.write_str("redeemed"),
        }
    }
}

/// One verified claim. `(campaign_slug, idempotency_key)` is unique, which
/// is what makes duplicate submissions collapse onto the first row, and
/// `redemption_tx_hash` is unique so a redemption transaction can settle at
/// most one claim.
///
/// Voucher columns are populated atomically when signing succeeds:
/// `voucher_payload` holds the hex ABI encoding the airdrop contract
/// consumes and `voucher_signature` the hex 65-byte signature over it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "claims")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub campaign_slug: String,
    pub claimant: String,
    pub recipient: String,
    pub fid: Option<i64>,
    pub idempotency_key: String,
    pub verified_quantity: i64,
    pub reward_amount: String,
    pub state: ClaimState,
    pub voucher_uid: Option<String>,
    pub voucher_payload: Option<String>,
    pub voucher_signature: Option<String>,
    pub voucher_expires_at: Option<DateTimeUtc>,
    pub redemption_tx_hash: Option<String>,
    pub created_at: DateTimeUtc,
    pub signed_at: Option<DateTimeUtc>,
    pub redeemed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::campaigns::Entity",
        from = "Column::CampaignSlug",
        to = "super::campaigns::Column::Slug"
    )]
    Campaigns,
}

impl Related<super::campaigns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campaigns.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
