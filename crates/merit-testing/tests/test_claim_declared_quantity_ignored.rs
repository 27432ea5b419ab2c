use alloy_primitives::U256;
use merit_testing::{mint_campaign, mint_submission, tx, wallet, TestFixture};

/// Test that the persisted quantity comes from the receipt, not the client
///
/// The declared quantity is only a hint for the cheap pre-verification
/// quota check. What lands in the ledger, and what the reward is computed
/// from, is the quantity the chain proved.
///
/// **Test flow:**
/// 1. Fund a receipt proving a 2-unit mint
/// 2. Submit it declaring 10 units
/// 3. The stored claim carries 2 units and 2x the per-unit reward
#[tokio::test]
async fn test_claim_declared_quantity_ignored() {
    let test = TestFixture::new().await;

    test.engine
        .create_campaign(mint_campaign("launch-mint"))
        .await
        .expect("campaign should be created");

    // 1. The receipt proves 2 units
    test.receipts.insert_mint(tx(0x01), wallet(0x11), 2);

    // 2. The claimant declares 10
    let outcome = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x11), tx(0x01), 10))
        .await
        .expect("overclaiming the quantity is not an error, it is corrected");

    // 3. Only the proven 2 units were granted
    let record = outcome.record();
    assert_eq!(record.verified_quantity, 2);
    assert_eq!(record.reward_amount, U256::from(2_000_000u64));

    let status = test
        .engine
        .campaign_status("launch-mint")
        .await
        .expect("status should load");
    assert_eq!(status.consumed_supply, 2);

    // A zero declaration is rejected outright
    test.receipts.insert_mint(tx(0x02), wallet(0x12), 1);
    let err = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x12), tx(0x02), 0))
        .await
        .expect_err("zero-quantity claims are meaningless");
    assert_eq!(err.reason(), "invalid_proof");
}
