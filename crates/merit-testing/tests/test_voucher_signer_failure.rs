use alloy_signer_local::PrivateKeySigner;
use merit_engine::ClaimState;
use merit_testing::{
    mint_campaign, mint_submission, tx, wallet, FlakyIssuer, TestFixture, AIRDROP_CONTRACT,
    TEST_CHAIN_ID,
};
use merit_voucher::LocalVoucherSigner;
use std::sync::Arc;

/// Test that a signer outage leaves the claim issuable
///
/// Issuance is the only step that touches the custodial key. When it fails
/// the claim must stay `verified` with no voucher columns set, and the
/// rejection must be retryable, because retrying after the signer recovers
/// is exactly the right move.
///
/// **Test flow:**
/// 1. Fixture whose issuer fails its first signing attempt
/// 2. Verification succeeds, issuance fails retryably
/// 3. The claim is still `verified`, no voucher stored
/// 4. The retry succeeds once the signer is back
#[tokio::test]
async fn test_voucher_signer_failure_leaves_claim_verified() {
    // 1. Signer that fails exactly once
    let key = PrivateKeySigner::random();
    let issuer = FlakyIssuer::new(
        LocalVoucherSigner::new(key, TEST_CHAIN_ID, AIRDROP_CONTRACT),
        1,
    );
    let test = TestFixture::with_issuer(Arc::new(issuer)).await;

    test.engine
        .create_campaign(mint_campaign("launch-mint"))
        .await
        .expect("campaign should be created");
    test.receipts.insert_mint(tx(0x01), wallet(0x11), 1);
    let outcome = test
        .engine
        .submit_claim(mint_submission("launch-mint", wallet(0x11), tx(0x01), 1))
        .await
        .expect("verification does not involve the signer");
    let claim_id = outcome.record().id;

    // 2. Issuance hits the outage
    let err = test
        .engine
        .issue_voucher(claim_id)
        .await
        .expect_err("the signer is down");
    assert_eq!(err.reason(), "signing_failure");
    assert!(err.retryable());

    // 3. Nothing was committed
    let record = test.engine.claim(claim_id).await.expect("claim should load");
    assert_eq!(record.state, ClaimState::Verified);
    assert!(record.voucher.is_none());

    // 4. Retry succeeds and recovers to the same issuer address
    let voucher = test
        .engine
        .issue_voucher(claim_id)
        .await
        .expect("the signer recovered");
    assert_eq!(voucher.state, "signed");

    let payload = hex::decode(voucher.payload.trim_start_matches("0x")).expect("payload hex");
    let signature =
        hex::decode(voucher.signature.trim_start_matches("0x")).expect("signature hex");
    let recovered = merit_voucher::recover_issuer(
        &payload,
        &signature,
        &merit_voucher::signing_domain(TEST_CHAIN_ID, AIRDROP_CONTRACT),
    )
    .expect("signature should recover");
    assert_eq!(recovered, test.issuer_address);
}
