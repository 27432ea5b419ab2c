use alloy_primitives::{Address, U256};
use merit_chain::ChainError;
use merit_social::{Engagement, SocialError};
use merit_voucher::VoucherError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Everything that can stop a claim from progressing.
///
/// Every variant maps to a stable rejection reason and a retryability flag
/// (see [`EngineError::to_rejection`]); clients act on those two fields, not
/// on message text. A duplicate submission is deliberately NOT an error:
/// it resolves to the surviving claim.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Campaign `{0}` not found")]
    CampaignNotFound(String),

    #[error("Claim {0} not found")]
    ClaimNotFound(i64),

    #[error("Campaign `{slug}` is not accepting claims: {reason}")]
    CampaignClosed { slug: String, reason: ClosedReason },

    #[error("Proof not observable yet: {0}")]
    NotYetAvailable(String),

    #[error("Invalid proof: {0}")]
    InvalidProof(String),

    #[error("Missing required engagements: {}", join_engagements(.0))]
    MissingEngagements(Vec<Engagement>),

    #[error(
        "Holding gate not met: requires balance {required} of token {token_id} on {contract}, wallet holds {held}"
    )]
    GateNotMet {
        contract: Address,
        token_id: U256,
        required: U256,
        held: U256,
    },

    #[error("{scope} quota exceeded: requested {requested} unit(s), {remaining} remaining")]
    QuotaExceeded {
        scope: QuotaScope,
        requested: u64,
        remaining: u64,
    },

    #[error("Reward amount calculation overflowed")]
    NumericOverflow,

    #[error("Claim {id} is `{state}`, expected {expected}")]
    InvalidState {
        id: i64,
        state: String,
        expected: &'static str,
    },

    #[error("Redemption transaction is already attached to a different claim")]
    RedemptionHashReused,

    #[error("Invalid campaign config: {0}")]
    InvalidConfig(String),

    #[error("Stored campaign row is corrupt: {0}")]
    CorruptCampaign(String),

    #[error("Stored claim row is corrupt: {0}")]
    CorruptClaim(String),

    #[error("Voucher signing failed: {0}")]
    Signing(#[from] VoucherError),

    #[error("Chain source error: {0}")]
    Chain(#[from] ChainError),

    #[error("Social graph error: {0}")]
    Social(#[from] SocialError),

    #[error("Ledger error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a campaign window rejected a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedReason {
    Paused,
    NotStarted,
    Ended,
}

impl fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClosedReason::Paused => f.write_str("paused"),
            ClosedReason::NotStarted => f.write_str("not started yet"),
            ClosedReason::Ended => f.write_str("ended"),
        }
    }
}

/// Which allowance a rejected submission ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaScope {
    CampaignSupply,
    PerUser,
}

impl fmt::Display for QuotaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaScope::CampaignSupply => f.write_str("Campaign supply"),
            QuotaScope::PerUser => f.write_str("Per-user"),
        }
    }
}

/// Serializable rejection surface handed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub reason: &'static str,
    pub message: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_quota: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_engagements: Option<Vec<String>>,
}

impl EngineError {
    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            EngineError::CampaignNotFound(_) => "campaign_not_found",
            EngineError::ClaimNotFound(_) => "claim_not_found",
            EngineError::CampaignClosed { .. } => "campaign_closed",
            EngineError::NotYetAvailable(_) => "not_yet_available",
            EngineError::InvalidProof(_) => "invalid_proof",
            EngineError::MissingEngagements(_) => "missing_engagements",
            EngineError::GateNotMet { .. } => "holding_gate_not_met",
            EngineError::QuotaExceeded { .. } => "quota_exceeded",
            EngineError::NumericOverflow => "numeric_overflow",
            EngineError::InvalidState { .. } => "invalid_state",
            EngineError::RedemptionHashReused => "redemption_hash_reused",
            EngineError::InvalidConfig(_) => "invalid_config",
            EngineError::CorruptCampaign(_) | EngineError::CorruptClaim(_) => "corrupt_record",
            EngineError::Signing(_) => "signing_failure",
            EngineError::Chain(_) | EngineError::Social(_) => "downstream_unavailable",
            EngineError::Db(_) => "ledger_error",
            EngineError::Io(_) => "io_error",
        }
    }

    /// Whether resubmitting the same request later can plausibly succeed.
    ///
    /// `CampaignClosed` is retryable only before the window opens; a paused
    /// or ended campaign stays closed until an operator acts. Downstream
    /// failures (chain, social, signer, ledger) are always worth retrying.
    pub fn retryable(&self) -> bool {
        match self {
            EngineError::NotYetAvailable(_) => true,
            EngineError::CampaignClosed { reason, .. } => *reason == ClosedReason::NotStarted,
            EngineError::Signing(_)
            | EngineError::Chain(_)
            | EngineError::Social(_)
            | EngineError::Db(_)
            | EngineError::Io(_) => true,
            _ => false,
        }
    }

    pub fn to_rejection(&self) -> Rejection {
        let remaining_quota = match self {
            EngineError::QuotaExceeded { remaining, .. } => Some(*remaining),
            _ => None,
        };
        let missing_engagements = match self {
            EngineError::MissingEngagements(missing) => {
                Some(missing.iter().map(|k| k.to_string()).collect())
            }
            _ => None,
        };
        Rejection {
            reason: self.reason(),
            message: self.to_string(),
            retryable: self.retryable(),
            remaining_quota,
            missing_engagements,
        }
    }
}

fn join_engagements(missing: &[Engagement]) -> String {
    missing
        .iter()
        .map(Engagement::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_rejection_reports_remaining_allowance() {
        let err = EngineError::QuotaExceeded {
            scope: QuotaScope::PerUser,
            requested: 3,
            remaining: 1,
        };

        let rejection = err.to_rejection();
        assert_eq!(rejection.reason, "quota_exceeded");
        assert_eq!(rejection.remaining_quota, Some(1));
        assert!(!rejection.retryable);
        assert!(rejection.message.contains("1 remaining"));
    }

    #[test]
    fn missing_engagements_are_listed() {
        let err = EngineError::MissingEngagements(vec![Engagement::Like, Engagement::Reply]);

        let rejection = err.to_rejection();
        assert_eq!(rejection.reason, "missing_engagements");
        assert_eq!(
            rejection.missing_engagements,
            Some(vec!["like".to_string(), "reply".to_string()])
        );
        assert!(err.to_string().contains("like, reply"));
    }

    #[test]
    fn closed_campaign_retryability_depends_on_reason() {
        let not_started = EngineError::CampaignClosed {
            slug: "s".into(),
            reason: ClosedReason::NotStarted,
        };
        let paused = EngineError::CampaignClosed {
            slug: "s".into(),
            reason: ClosedReason::Paused,
        };
        let ended = EngineError::CampaignClosed {
            slug: "s".into(),
            reason: ClosedReason::Ended,
        };

        assert!(not_started.retryable());
        assert!(!paused.retryable());
        assert!(!ended.retryable());
    }

    #[test]
    fn not_yet_available_is_retryable_invalid_proof_is_not() {
        assert!(EngineError::NotYetAvailable("pending".into()).retryable());
        assert!(!EngineError::InvalidProof("reverted".into()).retryable());
    }

    #[test]
    fn rejection_omits_fields_that_do_not_apply() {
        let rejection = EngineError::CampaignNotFound("launch-mint".into()).to_rejection();

        let json = serde_json::to_value(&rejection).expect("rejection serializes");
        assert_eq!(json["reason"], "campaign_not_found");
        assert!(json.get("remaining_quota").is_none());
        assert!(json.get("missing_engagements").is_none());
    }
}
