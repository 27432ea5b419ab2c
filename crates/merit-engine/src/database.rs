/*!
# Ledger Database Operations

One sqlite file holds campaigns, claims and counters. `open_ledger_db`
creates the file on first use and applies migrations, so deploying the
engine is "point it at a path". Reporting tools that must not take write
locks use `open_ledger_db_readonly`.
*/

use crate::EngineResult;
use merit_migrations::{Migrator, MigratorTrait as _};
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;
use url::Url;

/// Open (or create) the ledger database at `path` and bring its schema up
/// to date.
pub async fn open_ledger_db<P: AsRef<Path>>(path: P) -> EngineResult<DatabaseConnection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut url = Url::parse("sqlite:///").expect("sqlite:/// is a valid URL base");
    url.set_path(&path.to_string_lossy());
    url.set_query(Some("mode=rwc"));

    let conn = Database::connect(url.as_str()).await?;
    Migrator::up(&conn, None).await?;
    Ok(conn)
}

/// Open an existing ledger database in read-only mode.
pub async fn open_ledger_db_readonly<P: AsRef<Path>>(path: P) -> EngineResult<DatabaseConnection> {
    let path = path.as_ref();

    let mut url = Url::parse("sqlite:///").expect("sqlite:/// is a valid URL base");
    url.set_path(&path.to_string_lossy());
    url.set_query(Some("mode=ro"));

    let conn = Database::connect(url.as_str()).await?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use merit_entities::campaigns;
    use sea_orm::{EntityTrait, Set};

    #[tokio::test]
    async fn open_migrate_reopen_workflow() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("nested").join("ledger.db");

        let conn = open_ledger_db(&db_path).await.expect("creates and migrates");
        let row = campaigns::ActiveModel {
            slug: Set("launch-mint".into()),
            kind: Set(merit_entities::CampaignKind::TokenMint),
            active: Set(true),
            starts_at: Set(None),
            ends_at: Set(None),
            supply_cap: Set(None),
            per_user_cap: Set(None),
            reward_token: Set("0x1111111111111111111111111111111111111111".into()),
            reward_per_unit: Set("1".into()),
            target_contract: Set(Some(
                "0x2222222222222222222222222222222222222222".into(),
            )),
            target_token_id: Set(Some("7".into())),
            target_cast_hash: Set(None),
            required_engagements: Set(None),
            gate_contract: Set(None),
            gate_token_id: Set(None),
            gate_min_balance: Set(None),
            requires_share: Set(false),
            share_cast_hash: Set(None),
            claimed_units: Set(0),
            created_at: Set(chrono::Utc::now()),
        };
        campaigns::Entity::insert(row)
            .exec(&conn)
            .await
            .expect("insert campaign");
        drop(conn);

        let readonly = open_ledger_db_readonly(&db_path)
            .await
            .expect("reopens existing file");
        let found = campaigns::Entity::find_by_id("launch-mint".to_string())
            .one(&readonly)
            .await
            .expect("query succeeds");
        assert!(found.is_some());
    }
}
