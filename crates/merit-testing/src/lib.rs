use alloy_primitives::{Address, Log, B256, U256};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{sol, SolEvent};
use merit_chain::{ChainError, ChainResult, HoldingsSource, ReceiptSource, ReceiptView};
use merit_engine::{
    open_ledger_db, CampaignConfig, ClaimEngine, ClaimSubmission, EngineConfig, ProofReference,
    TargetConfig,
};
use merit_social::{Engagement, Reaction, Reply, SocialError, SocialGraph, SocialResult};
use merit_voucher::{
    AirdropRequestERC20, LocalVoucherSigner, SignedVoucher, VoucherError, VoucherIssuer,
    VoucherResult,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

sol! {
    event TransferSingle(
        address indexed operator,
        address indexed from,
        address indexed to,
        uint256 id,
        uint256 value
    );

    event TransferBatch(
        address indexed operator,
        address indexed from,
        address indexed to,
        uint256[] ids,
        uint256[] values
    );
}

/// Chain id vouchers are signed for in tests
pub const TEST_CHAIN_ID: u64 = 8453;

/// Token id every test campaign targets
pub const TEST_TOKEN_ID: u64 = 7;

/// Contract the mint campaigns watch
pub const MINT_CONTRACT: Address = Address::repeat_byte(0xAA);

/// Contract holding gates check balances on
pub const GATE_CONTRACT: Address = Address::repeat_byte(0x6A);

/// Redemption contract vouchers are bound to
pub const AIRDROP_CONTRACT: Address = Address::repeat_byte(0xAD);

/// ERC-20 the campaigns pay rewards in
pub const REWARD_TOKEN: Address = Address::repeat_byte(0xE0);

/// Deterministic wallet address for claimant `n`
pub fn wallet(n: u8) -> Address {
    Address::repeat_byte(n)
}

/// Deterministic transaction hash `n`
pub fn tx(n: u8) -> B256 {
    B256::repeat_byte(n)
}

/// Test fixture wiring a [`ClaimEngine`] to in-memory sources and a
/// throwaway ledger database.
pub struct TestFixture {
    pub engine: ClaimEngine,
    pub receipts: Arc<MockReceiptSource>,
    pub holdings: Arc<MockHoldings>,
    pub social: Arc<MockSocialGraph>,
    /// Address every issued voucher must recover to.
    pub issuer_address: Address,
    _dir: TempDir,
}

impl TestFixture {
    /// Create a fixture with a fresh database and a random signing key.
    pub async fn new() -> Self {
        let key = PrivateKeySigner::random();
        let issuer = Arc::new(LocalVoucherSigner::new(key, TEST_CHAIN_ID, AIRDROP_CONTRACT));
        Self::with_issuer(issuer).await
    }

    /// Create a fixture around a caller-supplied issuer, for exercising
    /// signer failure paths.
    pub async fn with_issuer(issuer: Arc<dyn VoucherIssuer>) -> Self {
        let dir = tempfile::tempdir().expect("temp dir should be creatable");
        let db = open_ledger_db(dir.path().join("merit.db"))
            .await
            .expect("ledger db should open and migrate");

        let receipts = Arc::new(MockReceiptSource::default());
        let holdings = Arc::new(MockHoldings::default());
        let social = Arc::new(MockSocialGraph::default());
        let issuer_address = issuer.issuer_address();

        let engine = ClaimEngine::new(
            db,
            receipts.clone(),
            holdings.clone(),
            social.clone(),
            issuer,
            EngineConfig::default(),
        );

        Self {
            engine,
            receipts,
            holdings,
            social,
            issuer_address,
            _dir: dir,
        }
    }
}

/// Campaign config rewarding mints of [`TEST_TOKEN_ID`] on [`MINT_CONTRACT`].
pub fn mint_campaign(slug: &str) -> CampaignConfig {
    CampaignConfig {
        slug: slug.to_owned(),
        active: true,
        starts_at: None,
        ends_at: None,
        supply_cap: None,
        per_user_cap: None,
        reward_token: REWARD_TOKEN,
        reward_per_unit: "1000000".to_owned(),
        target: TargetConfig::TokenMint {
            contract: MINT_CONTRACT,
            token_id: TEST_TOKEN_ID.to_string(),
        },
        gate: None,
        share: None,
    }
}

/// Campaign config rewarding engagement with `cast_hash`.
pub fn engagement_campaign(
    slug: &str,
    cast_hash: &str,
    required: Vec<Engagement>,
) -> CampaignConfig {
    CampaignConfig {
        slug: slug.to_owned(),
        active: true,
        starts_at: None,
        ends_at: None,
        supply_cap: None,
        per_user_cap: None,
        reward_token: REWARD_TOKEN,
        reward_per_unit: "500000".to_owned(),
        target: TargetConfig::Engagement {
            cast_hash: cast_hash.to_owned(),
            required,
        },
        gate: None,
        share: None,
    }
}

/// Submission of a mint claim proven by `tx_hash`.
pub fn mint_submission(
    campaign: &str,
    wallet: Address,
    tx_hash: B256,
    quantity: u64,
) -> ClaimSubmission {
    ClaimSubmission {
        campaign: campaign.to_owned(),
        recipient: wallet,
        fid: None,
        proof: ProofReference::Transaction(tx_hash),
        declared_quantity: quantity,
    }
}

/// Submission of an engagement claim by `fid`, paying out to `wallet`.
pub fn engagement_submission(campaign: &str, wallet: Address, fid: u64) -> ClaimSubmission {
    ClaimSubmission {
        campaign: campaign.to_owned(),
        recipient: wallet,
        fid: Some(fid),
        proof: ProofReference::Engagement,
        declared_quantity: 1,
    }
}

/// A successful mint receipt: `wallet` bought `quantity` of `token_id` from
/// [`MINT_CONTRACT`], evidenced by a `TransferSingle` from the zero address.
pub fn mint_receipt(wallet: Address, token_id: u64, quantity: u64) -> ReceiptView {
    ReceiptView {
        status: true,
        from: wallet,
        to: Some(MINT_CONTRACT),
        block_number: Some(1),
        logs: vec![mint_log(MINT_CONTRACT, wallet, token_id, quantity)],
    }
}

/// A `TransferSingle` mint event as `contract` would emit it.
pub fn mint_log(contract: Address, to: Address, token_id: u64, value: u64) -> Log {
    let event = TransferSingle {
        operator: contract,
        from: Address::ZERO,
        to,
        id: U256::from(token_id),
        value: U256::from(value),
    };
    Log {
        address: contract,
        data: event.encode_log_data(),
    }
}

/// Receipt source backed by a hash map.
#[derive(Default)]
pub struct MockReceiptSource {
    receipts: Mutex<HashMap<B256, ReceiptView>>,
    fail: AtomicBool,
}

impl MockReceiptSource {
    pub fn insert(&self, hash: B256, view: ReceiptView) {
        self.receipts
            .lock()
            .expect("mock receipts lock")
            .insert(hash, view);
    }

    /// Shorthand: `hash` is a successful mint of `quantity` units of
    /// [`TEST_TOKEN_ID`] to `wallet`.
    pub fn insert_mint(&self, hash: B256, wallet: Address, quantity: u64) {
        self.insert(hash, mint_receipt(wallet, TEST_TOKEN_ID, quantity));
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ReceiptSource for MockReceiptSource {
    async fn transaction_receipt(&self, hash: B256) -> ChainResult<Option<ReceiptView>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChainError::Transport("mock receipt source offline".into()));
        }
        Ok(self
            .receipts
            .lock()
            .expect("mock receipts lock")
            .get(&hash)
            .cloned())
    }
}

/// Holdings source backed by a hash map, with a call counter so fallback
/// behavior can be asserted.
#[derive(Default)]
pub struct MockHoldings {
    balances: Mutex<HashMap<(Address, Address, U256), U256>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockHoldings {
    pub fn set_balance(&self, contract: Address, owner: Address, token_id: U256, balance: U256) {
        self.balances
            .lock()
            .expect("mock balances lock")
            .insert((contract, owner, token_id), balance);
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HoldingsSource for MockHoldings {
    async fn erc1155_balance(
        &self,
        contract: Address,
        owner: Address,
        token_id: U256,
    ) -> ChainResult<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ChainError::Transport("mock holdings source offline".into()));
        }
        Ok(self
            .balances
            .lock()
            .expect("mock balances lock")
            .get(&(contract, owner, token_id))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

/// Social graph backed by per-cast sets of fids.
#[derive(Default)]
pub struct MockSocialGraph {
    likes: Mutex<HashMap<String, HashSet<u64>>>,
    recasts: Mutex<HashMap<String, HashSet<u64>>>,
    replies: Mutex<HashMap<String, Vec<Reply>>>,
    fail: AtomicBool,
}

impl MockSocialGraph {
    pub fn add_like(&self, cast_hash: &str, fid: u64) {
        self.likes
            .lock()
            .expect("mock likes lock")
            .entry(cast_hash.to_owned())
            .or_default()
            .insert(fid);
    }

    pub fn add_recast(&self, cast_hash: &str, fid: u64) {
        self.recasts
            .lock()
            .expect("mock recasts lock")
            .entry(cast_hash.to_owned())
            .or_default()
            .insert(fid);
    }

    pub fn add_reply(&self, cast_hash: &str, author_fid: u64, text: &str) {
        self.replies
            .lock()
            .expect("mock replies lock")
            .entry(cast_hash.to_owned())
            .or_default()
            .push(Reply {
                author_fid,
                text: text.to_owned(),
            });
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl SocialGraph for MockSocialGraph {
    async fn reactions(
        &self,
        cast_hash: &str,
        kind: Engagement,
        limit: usize,
    ) -> SocialResult<Vec<Reaction>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SocialError::Http("mock hub offline".into()));
        }
        let map = match kind {
            Engagement::Like => &self.likes,
            Engagement::Recast => &self.recasts,
            Engagement::Reply => {
                return Err(SocialError::UnsupportedQuery(
                    "replies are not reactions".into(),
                ));
            }
        };
        let mut reactions: Vec<Reaction> = map
            .lock()
            .expect("mock reactions lock")
            .get(cast_hash)
            .map(|fids| fids.iter().map(|&fid| Reaction { fid }).collect())
            .unwrap_or_default();
        reactions.truncate(limit);
        Ok(reactions)
    }

    async fn replies(&self, cast_hash: &str, _depth: u8, limit: usize) -> SocialResult<Vec<Reply>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SocialError::Http("mock hub offline".into()));
        }
        let mut replies = self
            .replies
            .lock()
            .expect("mock replies lock")
            .get(cast_hash)
            .cloned()
            .unwrap_or_default();
        replies.truncate(limit);
        Ok(replies)
    }
}

/// Issuer that fails its first `failures` signing attempts, then delegates.
/// Models a custodial signer coming back after an outage.
pub struct FlakyIssuer {
    inner: LocalVoucherSigner,
    failures_remaining: AtomicUsize,
}

impl FlakyIssuer {
    pub fn new(inner: LocalVoucherSigner, failures: usize) -> Self {
        Self {
            inner,
            failures_remaining: AtomicUsize::new(failures),
        }
    }
}

#[async_trait::async_trait]
impl VoucherIssuer for FlakyIssuer {
    fn issuer_address(&self) -> Address {
        self.inner.issuer_address()
    }

    async fn sign_request(&self, request: &AirdropRequestERC20) -> VoucherResult<SignedVoucher> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(VoucherError::Sign("signer unavailable".into()));
        }
        self.inner.sign_request(request).await
    }
}
