use merit_engine::ClaimState;
use merit_testing::{mint_campaign, mint_submission, tx, wallet, TestFixture};

/// Test redemption confirmation and transaction-hash exclusivity
///
/// On-chain, one redemption transaction consumes one voucher uid. The
/// ledger mirrors that: a transaction hash settles exactly one claim,
/// enforced by the unique index on the hash column.
///
/// **Test flow:**
/// 1. Two signed claims
/// 2. Claim A redeems with hash H
/// 3. Claim B reporting the same H is rejected
/// 4. Claim A re-reporting H is a no-op
/// 5. Claim A reporting a different hash is rejected
/// 6. Unsigned claims cannot redeem at all
#[tokio::test]
async fn test_redemption_exclusivity() {
    let test = TestFixture::new().await;
    test.engine
        .create_campaign(mint_campaign("launch-mint"))
        .await
        .expect("campaign should be created");

    // 1. Two claims, both signed
    test.receipts.insert_mint(tx(0x01), wallet(0x11), 1);
    test.receipts.insert_mint(tx(0x02), wallet(0x12), 1);
    let claim_a = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x11), tx(0x01), 1))
        .await
        .expect("claim A should verify")
        .record()
        .id;
    let claim_b = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x12), tx(0x02), 1))
        .await
        .expect("claim B should verify")
        .record()
        .id;
    test.engine
        .issue_voucher(claim_a)
        .await
        .expect("voucher A should be issued");
    test.engine
        .issue_voucher(claim_b)
        .await
        .expect("voucher B should be issued");

    // 2. A redeems
    let redeemed = test
        .engine
        .confirm_redemption(claim_a, tx(0xE1))
        .await
        .expect("first redemption should be recorded");
    assert_eq!(redeemed.state, ClaimState::Redeemed);
    assert_eq!(
        redeemed.redemption_tx_hash.as_deref(),
        Some(format!("{:#x}", tx(0xE1)).as_str())
    );

    // 3. The same transaction cannot settle B too
    let err = test
        .engine
        .confirm_redemption(claim_b, tx(0xE1))
        .await
        .expect_err("the hash already settled claim A");
    assert_eq!(err.reason(), "redemption_hash_reused");
    let untouched = test.engine.claim(claim_b).await.expect("claim should load");
    assert_eq!(untouched.state, ClaimState::Signed);

    // 4. Re-reporting the recorded pair is a no-op
    let again = test
        .engine
        .confirm_redemption(claim_a, tx(0xE1))
        .await
        .expect("identical confirmation is idempotent");
    assert_eq!(again.state, ClaimState::Redeemed);

    // 5. A redeemed claim cannot acquire a second hash
    let err = test
        .engine
        .confirm_redemption(claim_a, tx(0xE2))
        .await
        .expect_err("one redemption transaction per claim");
    assert_eq!(err.reason(), "invalid_state");

    // 6. A merely verified claim cannot redeem
    test.receipts.insert_mint(tx(0x03), wallet(0x13), 1);
    let claim_c = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x13), tx(0x03), 1))
        .await
        .expect("claim C should verify")
        .record()
        .id;
    let err = test
        .engine
        .confirm_redemption(claim_c, tx(0xE3))
        .await
        .expect_err("the voucher comes first");
    assert_eq!(err.reason(), "invalid_state");

    // B still redeems with its own transaction
    test.engine
        .confirm_redemption(claim_b, tx(0xE4))
        .await
        .expect("claim B redeems with its own hash");

    let status = test
        .engine
        .campaign_status("launch-mint")
        .await
        .expect("status should load");
    assert_eq!(status.redeemed_claims, 2);
    assert_eq!(status.total_claims, 3);
}
