use merit_engine::{ClaimState, Engagement, EngineError, ShareConfig};
use merit_testing::{engagement_campaign, engagement_submission, tx, wallet, TestFixture};

const CAST: &str = "0xfeed01";
const SHARE_CAST: &str = "0xc0de02";

/// Test the share step between signing and redemption
///
/// When a campaign requires a share, issuance parks the claim in
/// `share_required`. The voucher exists from that moment, but redemption
/// confirmation refuses until the share is confirmed. A campaign that names
/// a share cast gets the share verified as a recast of that cast.
///
/// **Test flow:**
/// 1. Campaign with a verified share step
/// 2. Issuance lands the claim in `share_required`
/// 3. Redemption before the share is rejected
/// 4. Confirming without the recast lists the missing engagement
/// 5. After recasting, confirmation moves the claim to `signed`
/// 6. Reconfirming is a no-op, redemption now proceeds
#[tokio::test]
async fn test_share_gate_flow() {
    let test = TestFixture::new().await;

    // 1. Like the cast to claim, recast the announcement to redeem
    let mut config = engagement_campaign("share-drop", CAST, vec![Engagement::Like]);
    config.share = Some(ShareConfig {
        cast_hash: Some(SHARE_CAST.to_owned()),
    });
    test.engine
        .create_campaign(config)
        .await
        .expect("campaign should be created");

    test.social.add_like(CAST, 7001);
    let outcome = test
        .engine
        .submit_claim(engagement_submission("share-drop", wallet(0x21), 7001))
        .await
        .expect("the like is present");
    let claim_id = outcome.record().id;

    // 2. The voucher is signed but gated
    let voucher = test
        .engine
        .issue_voucher(claim_id)
        .await
        .expect("voucher should be issued");
    assert_eq!(voucher.state, "share_required");

    // 3. Redemption refuses until the share is done
    let err = test
        .engine
        .confirm_redemption(claim_id, tx(0xE1))
        .await
        .expect_err("the share comes first");
    assert_eq!(err.reason(), "invalid_state");

    // 4. No recast yet
    let err = test
        .engine
        .confirm_share(claim_id)
        .await
        .expect_err("nothing was shared");
    assert!(matches!(
        err,
        EngineError::MissingEngagements(missing) if missing == vec![Engagement::Recast]
    ));

    // 5. Recast and confirm
    test.social.add_recast(SHARE_CAST, 7001);
    let record = test
        .engine
        .confirm_share(claim_id)
        .await
        .expect("the recast is verifiable");
    assert_eq!(record.state, ClaimState::Signed);

    // 6. Reconfirming is harmless, then redemption goes through
    let again = test
        .engine
        .confirm_share(claim_id)
        .await
        .expect("confirmation is idempotent");
    assert_eq!(again.state, ClaimState::Signed);

    let redeemed = test
        .engine
        .confirm_redemption(claim_id, tx(0xE1))
        .await
        .expect("redeemable after the share");
    assert_eq!(redeemed.state, ClaimState::Redeemed);

    // The share step only exists after issuance
    test.social.add_like(CAST, 7002);
    let second = test
        .engine
        .submit_claim(engagement_submission("share-drop", wallet(0x22), 7002))
        .await
        .expect("second claim should verify");
    let err = test
        .engine
        .confirm_share(second.record().id)
        .await
        .expect_err("no voucher, no share step");
    assert_eq!(err.reason(), "invalid_state");
}

/// Test the trust-based share step: a campaign that requires sharing but
/// names no cast takes the confirmation at face value.
#[tokio::test]
async fn test_share_gate_unverified() {
    let test = TestFixture::new().await;

    let mut config = engagement_campaign("trust-drop", CAST, vec![Engagement::Like]);
    config.share = Some(ShareConfig::default());
    test.engine
        .create_campaign(config)
        .await
        .expect("campaign should be created");

    test.social.add_like(CAST, 7001);
    let outcome = test
        .engine
        .submit_claim(engagement_submission("trust-drop", wallet(0x21), 7001))
        .await
        .expect("the like is present");
    let claim_id = outcome.record().id;

    let voucher = test
        .engine
        .issue_voucher(claim_id)
        .await
        .expect("voucher should be issued");
    assert_eq!(voucher.state, "share_required");

    // No recast anywhere, but no cast to check either
    let record = test
        .engine
        .confirm_share(claim_id)
        .await
        .expect("unverified shares are taken on trust");
    assert_eq!(record.state, ClaimState::Signed);
}
