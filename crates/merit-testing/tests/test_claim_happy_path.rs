use merit_engine::{ClaimState, SubmitReceipt};
use merit_testing::{mint_campaign, mint_submission, tx, wallet, TestFixture};

/// Test the full mint claim lifecycle end to end
///
/// **Test flow:**
/// 1. Create the campaign
/// 2. A chain outage defers the submission retryably
/// 3. The retry verifies and persists the claim
/// 4. Voucher issuance moves it to `signed`
/// 5. Redemption confirmation closes it out
/// 6. The status view reflects every step
#[tokio::test]
async fn test_claim_happy_path() {
    let test = TestFixture::new().await;

    // 1. Campaign
    test.engine
        .create_campaign(mint_campaign("launch-mint"))
        .await
        .expect("campaign should be created");
    test.receipts.insert_mint(tx(0x01), wallet(0x11), 3);

    // 2. The RPC node is down: nothing persists, retry advised
    test.receipts.set_failing(true);
    let err = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x11), tx(0x01), 3))
        .await
        .expect_err("the receipt source is offline");
    assert_eq!(err.reason(), "downstream_unavailable");
    assert!(err.retryable());

    // 3. Retry once the node is back
    test.receipts.set_failing(false);
    let outcome = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x11), tx(0x01), 3))
        .await
        .expect("the retry should verify");
    let record = outcome.record();
    assert_eq!(record.state, ClaimState::Verified);
    assert_eq!(record.verified_quantity, 3);

    let receipt = SubmitReceipt::from(&outcome);
    assert!(!receipt.deduplicated);
    assert_eq!(receipt.reward_amount, "3000000");

    // 4. Issue
    let voucher = test
        .engine
        .issue_voucher(record.id)
        .await
        .expect("voucher should be issued");
    assert_eq!(voucher.state, "signed");
    assert_eq!(voucher.contents[0].amount, "3000000");

    // 5. Redeem
    let redeemed = test
        .engine
        .confirm_redemption(record.id, tx(0xE1))
        .await
        .expect("redemption should be recorded");
    assert_eq!(redeemed.state, ClaimState::Redeemed);

    // 6. The books agree
    let status = test
        .engine
        .campaign_status("launch-mint")
        .await
        .expect("status should load");
    assert_eq!(status.total_claims, 1);
    assert_eq!(status.redeemed_claims, 1);
    assert_eq!(status.consumed_supply, 3);
    assert_eq!(status.counter_units, 3);
    assert!(!status.counter_drift);
}
