/*!
# Merit Voucher

Builds and signs the expiring reward vouchers that the airdrop contract
redeems. A voucher is the ABI encoding of an `AirdropRequestERC20` plus a
65-byte EIP-712 signature over it; the contract recovers the signer, checks
the expiry, and consumes the request's `uid` exactly once.

The type names, field order and domain parameters here must match the
contract byte-for-byte. A voucher that hashes differently is not rejected
loudly anywhere in this codebase; it simply never redeems. The typehash
constants below pin the encoding, and the unit tests recompute them from
the generated types so a drift fails fast.
*/

use alloy_primitives::{b256, keccak256, Address, Bytes, Signature, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{sol, Eip712Domain, SolStruct, SolValue};

sol! {
    /// One (recipient, amount) pair inside a voucher.
    #[derive(Debug, PartialEq, Eq)]
    struct AirdropContentERC20 {
        address recipient;
        uint256 amount;
    }

    /// The typed request the airdrop contract verifies and executes.
    #[derive(Debug, PartialEq, Eq)]
    struct AirdropRequestERC20 {
        bytes32 uid;
        address tokenAddress;
        uint256 expirationTimestamp;
        AirdropContentERC20[] contents;
    }
}

/// keccak256("AirdropContentERC20(address recipient,uint256 amount)")
pub const CONTENT_TYPEHASH_ERC20: B256 =
    b256!("f6c72d100e33735bf51e80c28612aa8502ae41efe0a50e53461ab22ae8aa6def");

/// keccak256("AirdropRequestERC20(bytes32 uid,address tokenAddress,uint256 expirationTimestamp,AirdropContentERC20[] contents)AirdropContentERC20(address recipient,uint256 amount)")
pub const REQUEST_TYPEHASH_ERC20: B256 =
    b256!("32847426538f79017eb3c162a7d70952a635f4a2b0cf164b45d6399e76e2b4d3");

/// Length of the `r || s || v` signature the contract expects, `v` in {27, 28}.
pub const SIGNATURE_LEN: usize = 65;

const UID_DOMAIN_TAG: &[u8] = b"merit/voucher-uid/v1";

pub type VoucherResult<T> = Result<T, VoucherError>;

#[derive(Debug, thiserror::Error)]
pub enum VoucherError {
    #[error("Signer rejected the voucher digest: {0}")]
    Sign(String),

    #[error("Voucher payload does not decode: {0}")]
    Payload(String),

    #[error("Voucher signature is malformed: {0}")]
    Signature(String),
}

/// The EIP-712 domain the redemption contract reconstructs on-chain:
/// name "Airdrop", version "1", plus the deployment's chain and address.
pub fn signing_domain(chain_id: u64, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some("Airdrop".into()),
        Some("1".into()),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    )
}

/// Deterministic voucher id for a claim.
///
/// Derived from the claim's identity rather than drawn at random, so a
/// retried signing of the same claim reproduces the same uid and can never
/// mint a second redeemable voucher. Distinct claims (different campaign or
/// different proof) always land on distinct uids.
pub fn voucher_uid(campaign_slug: &str, idempotency_key: &str) -> B256 {
    let mut preimage =
        Vec::with_capacity(UID_DOMAIN_TAG.len() + campaign_slug.len() + idempotency_key.len() + 2);
    preimage.extend_from_slice(UID_DOMAIN_TAG);
    preimage.push(0);
    preimage.extend_from_slice(campaign_slug.as_bytes());
    preimage.push(0);
    preimage.extend_from_slice(idempotency_key.as_bytes());
    keccak256(&preimage)
}

/// Assemble the typed request for a single-recipient reward.
pub fn single_recipient_request(
    uid: B256,
    token: Address,
    expiration_timestamp: u64,
    recipient: Address,
    amount: U256,
) -> AirdropRequestERC20 {
    AirdropRequestERC20 {
        uid,
        tokenAddress: token,
        expirationTimestamp: U256::from(expiration_timestamp),
        contents: vec![AirdropContentERC20 { recipient, amount }],
    }
}

/// A signed voucher exactly as the contract consumes it: `payload` is the
/// ABI encoding of `request`, `signature` the 65-byte `r || s || v` signature
/// over its EIP-712 digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedVoucher {
    pub request: AirdropRequestERC20,
    pub payload: Bytes,
    pub signature: Bytes,
}

/// Seam in front of the custodial signing key.
///
/// The engine only ever asks for a signature over a fully-assembled request;
/// keeping the key behind this trait lets a remote signer stand in for the
/// local one, and lets tests inject a signer that refuses.
#[async_trait::async_trait]
pub trait VoucherIssuer: Send + Sync {
    /// The address redeemed vouchers must recover to.
    fn issuer_address(&self) -> Address;

    async fn sign_request(&self, request: &AirdropRequestERC20) -> VoucherResult<SignedVoucher>;
}

/// In-process issuer over a raw secp256k1 key.
///
/// ECDSA here is deterministic (RFC 6979), so signing the same request twice
/// yields byte-identical vouchers.
pub struct LocalVoucherSigner {
    key: PrivateKeySigner,
    domain: Eip712Domain,
}

impl LocalVoucherSigner {
    pub fn new(key: PrivateKeySigner, chain_id: u64, verifying_contract: Address) -> Self {
        let domain = signing_domain(chain_id, verifying_contract);
        Self { key, domain }
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }
}

#[async_trait::async_trait]
impl VoucherIssuer for LocalVoucherSigner {
    fn issuer_address(&self) -> Address {
        self.key.address()
    }

    async fn sign_request(&self, request: &AirdropRequestERC20) -> VoucherResult<SignedVoucher> {
        let digest = request.eip712_signing_hash(&self.domain);
        let signature = self
            .key
            .sign_hash_sync(&digest)
            .map_err(|e| VoucherError::Sign(e.to_string()))?;
        Ok(SignedVoucher {
            request: request.clone(),
            payload: request.abi_encode().into(),
            signature: signature.as_bytes().to_vec().into(),
        })
    }
}

/// Decode a persisted payload back into the typed request.
pub fn decode_payload(payload: &[u8]) -> VoucherResult<AirdropRequestERC20> {
    AirdropRequestERC20::abi_decode(payload).map_err(|e| VoucherError::Payload(e.to_string()))
}

/// Recover the signer address of a persisted (payload, signature) pair.
pub fn recover_issuer(
    payload: &[u8],
    signature: &[u8],
    domain: &Eip712Domain,
) -> VoucherResult<Address> {
    let request = decode_payload(payload)?;
    let signature =
        Signature::try_from(signature).map_err(|e| VoucherError::Signature(e.to_string()))?;
    let digest = request.eip712_signing_hash(domain);
    signature
        .recover_address_from_prehash(&digest)
        .map_err(|e| VoucherError::Signature(e.to_string()))
}
