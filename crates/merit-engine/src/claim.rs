use crate::{EngineError, EngineResult};
use alloy_primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use merit_entities::claims;
use merit_entities::ClaimState;
use serde::Serialize;

/// A claimed action submitted for verification.
#[derive(Debug, Clone)]
pub struct ClaimSubmission {
    pub campaign: String,
    /// Wallet the reward voucher will pay out to.
    pub recipient: Address,
    /// Social account id; required for engagement campaigns and for
    /// verified shares.
    pub fid: Option<u64>,
    pub proof: ProofReference,
    /// Client-declared quantity. A hint only: quotas are pre-checked
    /// against it, but the persisted quantity always comes out of
    /// verification.
    pub declared_quantity: u64,
}

/// What the claimant points at as evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofReference {
    /// Hash of the transaction that performed the on-chain action.
    Transaction(B256),
    /// Engagement claims carry no reference; the proof is graph membership.
    Engagement,
}

/// Voucher columns of a signed claim, decoded from the ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVoucher {
    pub uid: String,
    pub payload: Vec<u8>,
    pub signature: Vec<u8>,
    pub expires_at: DateTime<Utc>,
}

/// One ledger row, projected into domain types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRecord {
    pub id: i64,
    pub campaign: String,
    pub claimant: String,
    pub recipient: Address,
    pub fid: Option<u64>,
    pub idempotency_key: String,
    pub verified_quantity: u64,
    pub reward_amount: U256,
    pub state: ClaimState,
    pub voucher: Option<StoredVoucher>,
    pub redemption_tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClaimRecord {
    pub(crate) fn from_model(model: claims::Model) -> EngineResult<Self> {
        let id = model.id;
        let corrupt = |detail: String| EngineError::CorruptClaim(format!("claim {id}: {detail}"));

        let recipient = model
            .recipient
            .parse::<Address>()
            .map_err(|e| corrupt(format!("bad recipient `{}`: {e}", model.recipient)))?;
        let reward_amount = model
            .reward_amount
            .parse::<U256>()
            .map_err(|e| corrupt(format!("bad reward amount `{}`: {e}", model.reward_amount)))?;

        let voucher = match (
            model.voucher_uid,
            model.voucher_payload,
            model.voucher_signature,
            model.voucher_expires_at,
        ) {
            (None, None, None, None) => None,
            (Some(uid), Some(payload), Some(signature), Some(expires_at)) => Some(StoredVoucher {
                uid,
                payload: hex::decode(&payload)
                    .map_err(|e| corrupt(format!("bad voucher payload hex: {e}")))?,
                signature: hex::decode(&signature)
                    .map_err(|e| corrupt(format!("bad voucher signature hex: {e}")))?,
                expires_at,
            }),
            _ => return Err(corrupt("voucher columns are only partially set".into())),
        };

        Ok(ClaimRecord {
            id,
            campaign: model.campaign_slug,
            claimant: model.claimant,
            recipient,
            fid: model.fid.map(|f| f as u64),
            idempotency_key: model.idempotency_key,
            verified_quantity: model.verified_quantity.max(0) as u64,
            reward_amount,
            state: model.state,
            voucher,
            redemption_tx_hash: model.redemption_tx_hash,
            created_at: model.created_at,
        })
    }
}

/// Submission result: a fresh row, or the surviving row from an earlier
/// submission of the same proof.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Created(ClaimRecord),
    Existing(ClaimRecord),
}

impl SubmitOutcome {
    pub fn record(&self) -> &ClaimRecord {
        match self {
            SubmitOutcome::Created(record) | SubmitOutcome::Existing(record) => record,
        }
    }

    pub fn into_record(self) -> ClaimRecord {
        match self {
            SubmitOutcome::Created(record) | SubmitOutcome::Existing(record) => record,
        }
    }

    /// True when the submission collapsed onto an earlier claim.
    pub fn deduplicated(&self) -> bool {
        matches!(self, SubmitOutcome::Existing(_))
    }
}

/// Wire shape handed to clients after a submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitReceipt {
    pub claim_id: i64,
    pub state: String,
    pub verified_quantity: u64,
    pub reward_amount: String,
    pub deduplicated: bool,
}

impl From<&SubmitOutcome> for SubmitReceipt {
    fn from(outcome: &SubmitOutcome) -> Self {
        let record = outcome.record();
        SubmitReceipt {
            claim_id: record.id,
            state: record.state.to_string(),
            verified_quantity: record.verified_quantity,
            reward_amount: record.reward_amount.to_string(),
            deduplicated: outcome.deduplicated(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_model() -> claims::Model {
        claims::Model {
            id: 11,
            campaign_slug: "launch-mint".into(),
            claimant: format!("{:#x}", Address::repeat_byte(0x22)),
            recipient: format!("{:#x}", Address::repeat_byte(0x22)),
            fid: None,
            idempotency_key: "0xabc".into(),
            verified_quantity: 2,
            reward_amount: "3000000".into(),
            state: ClaimState::Verified,
            voucher_uid: None,
            voucher_payload: None,
            voucher_signature: None,
            voucher_expires_at: None,
            redemption_tx_hash: None,
            created_at: Utc::now(),
            signed_at: None,
            redeemed_at: None,
        }
    }

    #[test]
    fn model_projects_into_domain() {
        let record = ClaimRecord::from_model(base_model()).expect("well-formed row");

        assert_eq!(record.recipient, Address::repeat_byte(0x22));
        assert_eq!(record.reward_amount, U256::from(3_000_000u64));
        assert_eq!(record.verified_quantity, 2);
        assert!(record.voucher.is_none());
    }

    #[test]
    fn partially_set_voucher_columns_are_corrupt() {
        let mut model = base_model();
        model.voucher_uid = Some("0x01".into());

        assert!(matches!(
            ClaimRecord::from_model(model),
            Err(EngineError::CorruptClaim(_))
        ));
    }

    #[test]
    fn submit_receipt_reflects_dedup_flag() {
        let record = ClaimRecord::from_model(base_model()).expect("well-formed row");
        let outcome = SubmitOutcome::Existing(record);

        let receipt = SubmitReceipt::from(&outcome);
        assert!(receipt.deduplicated);
        assert_eq!(receipt.claim_id, 11);
        assert_eq!(receipt.state, "verified");
        assert_eq!(receipt.reward_amount, "3000000");
    }
}
