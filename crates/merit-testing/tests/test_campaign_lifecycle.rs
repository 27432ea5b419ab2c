use chrono::{Duration, Utc};
use merit_testing::{mint_campaign, mint_submission, tx, wallet, TestFixture};

/// Test campaign windows, pausing and resuming
///
/// A paused or ended campaign rejects permanently (an operator has to act);
/// a campaign that has not opened yet rejects retryably. Pausing never
/// touches existing claims or their vouchers.
///
/// **Test flow:**
/// 1. Pause rejects new submissions, resume reopens
/// 2. Eligibility reports the closed state without verifying anything
/// 3. A future window rejects retryably
/// 4. An ended window rejects permanently
/// 5. Creating over an existing slug is rejected
#[tokio::test]
async fn test_campaign_lifecycle() {
    let test = TestFixture::new().await;
    test.engine
        .create_campaign(mint_campaign("launch-mint"))
        .await
        .expect("campaign should be created");
    test.receipts.insert_mint(tx(0x01), wallet(0x11), 1);

    // 1. Pause
    let paused = test
        .engine
        .set_campaign_active("launch-mint", false)
        .await
        .expect("pause should apply");
    assert!(!paused.active);

    let err = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x11), tx(0x01), 1))
        .await
        .expect_err("paused campaigns accept nothing");
    assert_eq!(err.reason(), "campaign_closed");
    assert!(!err.retryable());

    // 2. Eligibility agrees, and names the reason
    let eligibility = test
        .engine
        .check_eligibility("launch-mint", &format!("{:#x}", wallet(0x11)))
        .await
        .expect("eligibility should load");
    assert!(!eligibility.open);
    assert!(eligibility
        .closed_reason
        .as_deref()
        .is_some_and(|reason| reason.contains("paused")));

    // Resume and the same submission goes through
    test.engine
        .set_campaign_active("launch-mint", true)
        .await
        .expect("resume should apply");
    test.engine
        .submit_claim(mint_submission("launch-mint", wallet(0x11), tx(0x01), 1))
        .await
        .expect("resumed campaigns accept claims");

    // 3. Opens in an hour: retry later
    let mut config = mint_campaign("future");
    config.starts_at = Some(Utc::now() + Duration::hours(1));
    test.engine
        .create_campaign(config)
        .await
        .expect("campaign should be created");
    test.receipts.insert_mint(tx(0x02), wallet(0x12), 1);
    let err = test
        .engine
        .submit_claim(mint_submission("future", wallet(0x12), tx(0x02), 1))
        .await
        .expect_err("the window has not opened");
    assert_eq!(err.reason(), "campaign_closed");
    assert!(err.retryable());

    // 4. Closed an hour ago: permanent
    let mut config = mint_campaign("past");
    config.starts_at = Some(Utc::now() - Duration::hours(2));
    config.ends_at = Some(Utc::now() - Duration::hours(1));
    test.engine
        .create_campaign(config)
        .await
        .expect("campaign should be created");
    let err = test
        .engine
        .submit_claim(mint_submission("past", wallet(0x12), tx(0x02), 1))
        .await
        .expect_err("the window has closed");
    assert_eq!(err.reason(), "campaign_closed");
    assert!(!err.retryable());

    // 5. Slugs are unique
    let err = test
        .engine
        .create_campaign(mint_campaign("launch-mint"))
        .await
        .expect_err("the slug is taken");
    assert_eq!(err.reason(), "invalid_config");
    assert!(err.to_string().contains("already exists"));

    // Unknown campaigns are a distinct rejection
    let err = test
        .engine
        .campaign("no-such-campaign")
        .await
        .expect_err("nothing was created under this slug");
    assert_eq!(err.reason(), "campaign_not_found");
}
