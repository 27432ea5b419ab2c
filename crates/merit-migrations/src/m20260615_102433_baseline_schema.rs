use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(string(Campaigns::Slug).primary_key())
                    .col(string(Campaigns::Kind))
                    .col(boolean(Campaigns::Active))
                    .col(timestamp_null(Campaigns::StartsAt))
                    .col(timestamp_null(Campaigns::EndsAt))
                    .col(big_integer_null(Campaigns::SupplyCap))
                    .col(big_integer_null(Campaigns::PerUserCap))
                    .col(string(Campaigns::RewardToken))
                    .col(string(Campaigns::RewardPerUnit)) // u256 (decimal string)
                    .col(string_null(Campaigns::TargetContract))
                    .col(string_null(Campaigns::TargetTokenId)) // u256 (decimal string)
                    .col(string_null(Campaigns::TargetCastHash))
                    .col(string_null(Campaigns::RequiredEngagements))
                    .col(string_null(Campaigns::GateContract))
                    .col(string_null(Campaigns::GateTokenId)) // u256 (decimal string)
                    .col(string_null(Campaigns::GateMinBalance)) // u256 (decimal string)
                    .col(boolean(Campaigns::RequiresShare))
                    .col(string_null(Campaigns::ShareCastHash))
                    .col(big_integer(Campaigns::ClaimedUnits).default(0))
                    .col(timestamp(Campaigns::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Claims::Table)
                    .if_not_exists()
                    .col(big_integer(Claims::Id).primary_key().auto_increment())
                    .col(string(Claims::CampaignSlug))
                    .col(string(Claims::Claimant))
                    .col(string(Claims::Recipient))
                    .col(big_integer_null(Claims::Fid))
                    .col(string(Claims::IdempotencyKey))
                    .col(big_integer(Claims::VerifiedQuantity))
                    .col(string(Claims::RewardAmount)) // u256 (decimal string)
                    .col(string(Claims::State))
                    .col(string_null(Claims::VoucherUid))
                    .col(string_null(Claims::VoucherPayload))
                    .col(string_null(Claims::VoucherSignature))
                    .col(timestamp_null(Claims::VoucherExpiresAt))
                    .col(string_null(Claims::RedemptionTxHash))
                    .col(timestamp(Claims::CreatedAt))
                    .col(timestamp_null(Claims::SignedAt))
                    .col(timestamp_null(Claims::RedeemedAt))
                    .index(
                        // one ledger row per proof, no matter how often it is submitted
                        Index::create()
                            .col(Claims::CampaignSlug)
                            .col(Claims::IdempotencyKey)
                            .unique(),
                    )
                    .index(
                        // a redemption transaction settles at most one claim;
                        // NULLs (unredeemed rows) do not collide
                        Index::create().col(Claims::RedemptionTxHash).unique(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Claims::Table, Claims::CampaignSlug)
                            .to(Campaigns::Table, Campaigns::Slug)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-claims-campaign-claimant")
                    .table(Claims::Table)
                    .col(Claims::CampaignSlug)
                    .col(Claims::Claimant)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ParticipantStats::Table)
                    .if_not_exists()
                    .col(string(ParticipantStats::CampaignSlug))
                    .col(string(ParticipantStats::Claimant))
                    .col(big_integer(ParticipantStats::UnitsClaimed))
                    .col(big_integer(ParticipantStats::ClaimsCount))
                    .col(timestamp(ParticipantStats::UpdatedAt))
                    .index(
                        Index::create()
                            .col(ParticipantStats::CampaignSlug)
                            .col(ParticipantStats::Claimant)
                            .primary(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ParticipantStats::Table, ParticipantStats::CampaignSlug)
                            .to(Campaigns::Table, Campaigns::Slug)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ParticipantStats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Claims::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Campaigns::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Campaigns {
    Table,
    Slug,
    Kind, // token_mint | engagement
    Active,
    StartsAt,
    EndsAt,
    SupplyCap,   // campaign-wide unit cap, NULL = uncapped
    PerUserCap,  // per-claimant unit cap, NULL = uncapped
    RewardToken, // ERC-20 the vouchers pay out
    RewardPerUnit,
    TargetContract,
    TargetTokenId,
    TargetCastHash,
    RequiredEngagements, // comma-separated: like,recast,reply
    GateContract,
    GateTokenId,
    GateMinBalance,
    RequiresShare,
    ShareCastHash,
    ClaimedUnits, // denormalized counter; the claims table is authoritative
    CreatedAt,
}

#[derive(DeriveIden)]
enum Claims {
    Table,
    Id,
    CampaignSlug,
    Claimant, // wallet (lower-hex) for mint campaigns, fid for engagement campaigns
    Recipient,
    Fid,
    IdempotencyKey,
    VerifiedQuantity,
    RewardAmount,
    State, // verified | share_required | signed | redeemed
    VoucherUid,
    VoucherPayload,   // hex ABI encoding of the signed request
    VoucherSignature, // hex 65-byte r||s||v
    VoucherExpiresAt,
    RedemptionTxHash,
    CreatedAt,
    SignedAt,
    RedeemedAt,
}

#[derive(DeriveIden)]
enum ParticipantStats {
    Table,
    CampaignSlug,
    Claimant,
    UnitsClaimed,
    ClaimsCount,
    UpdatedAt,
}
