use crate::{Campaign, ClosedReason, EngineError, EngineResult, QuotaScope};
use chrono::{DateTime, Utc};

/// Ledger-derived consumption for one (campaign, claimant) pair. Always
/// computed by summing verified quantities in the claims table; the
/// denormalized counters play no part here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaUsage {
    pub campaign_consumed: u64,
    pub user_consumed: u64,
}

/// Reject submissions outside the campaign's window or while it is paused.
pub(crate) fn check_window(campaign: &Campaign, now: DateTime<Utc>) -> EngineResult<()> {
    let closed = |reason| EngineError::CampaignClosed {
        slug: campaign.slug.clone(),
        reason,
    };

    if !campaign.active {
        return Err(closed(ClosedReason::Paused));
    }
    if let Some(starts_at) = campaign.starts_at {
        if now < starts_at {
            return Err(closed(ClosedReason::NotStarted));
        }
    }
    if let Some(ends_at) = campaign.ends_at {
        if now >= ends_at {
            return Err(closed(ClosedReason::Ended));
        }
    }
    Ok(())
}

/// Would granting `quantity` more units breach either cap?
///
/// Runs twice per submission: once against the declared quantity before any
/// expensive verification, and again against the verified quantity before
/// the row is written. Only the second check gates what is persisted.
pub(crate) fn check_quota(campaign: &Campaign, usage: QuotaUsage, quantity: u64) -> EngineResult<()> {
    if let Some(cap) = campaign.supply_cap {
        let remaining = cap.saturating_sub(usage.campaign_consumed);
        if quantity > remaining {
            return Err(EngineError::QuotaExceeded {
                scope: QuotaScope::CampaignSupply,
                requested: quantity,
                remaining,
            });
        }
    }
    if let Some(cap) = campaign.per_user_cap {
        let remaining = cap.saturating_sub(usage.user_consumed);
        if quantity > remaining {
            return Err(EngineError::QuotaExceeded {
                scope: QuotaScope::PerUser,
                requested: quantity,
                remaining,
            });
        }
    }
    Ok(())
}

/// Remaining allowances for eligibility reporting. `None` means uncapped.
pub(crate) fn remaining(campaign: &Campaign, usage: QuotaUsage) -> (Option<u64>, Option<u64>) {
    let supply = campaign
        .supply_cap
        .map(|cap| cap.saturating_sub(usage.campaign_consumed));
    let user = campaign
        .per_user_cap
        .map(|cap| cap.saturating_sub(usage.user_consumed));
    (supply, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Target;
    use alloy_primitives::{Address, U256};
    use chrono::Duration;

    fn campaign(supply_cap: Option<u64>, per_user_cap: Option<u64>) -> Campaign {
        Campaign {
            slug: "launch-mint".into(),
            active: true,
            starts_at: None,
            ends_at: None,
            supply_cap,
            per_user_cap,
            reward_token: Address::repeat_byte(1),
            reward_per_unit: U256::from(1),
            target: Target::Mint {
                contract: Address::repeat_byte(2),
                token_id: U256::from(7),
            },
            gate: None,
            share: None,
            claimed_units: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn paused_and_windowed_campaigns_reject() {
        let now = Utc::now();

        let mut paused = campaign(None, None);
        paused.active = false;
        assert!(matches!(
            check_window(&paused, now),
            Err(EngineError::CampaignClosed {
                reason: ClosedReason::Paused,
                ..
            })
        ));

        let mut early = campaign(None, None);
        early.starts_at = Some(now + Duration::hours(1));
        assert!(matches!(
            check_window(&early, now),
            Err(EngineError::CampaignClosed {
                reason: ClosedReason::NotStarted,
                ..
            })
        ));

        let mut over = campaign(None, None);
        over.ends_at = Some(now - Duration::hours(1));
        assert!(matches!(
            check_window(&over, now),
            Err(EngineError::CampaignClosed {
                reason: ClosedReason::Ended,
                ..
            })
        ));

        assert!(check_window(&campaign(None, None), now).is_ok());
    }

    #[test]
    fn supply_cap_counts_all_claimants() {
        let campaign = campaign(Some(10), None);
        let usage = QuotaUsage {
            campaign_consumed: 8,
            user_consumed: 0,
        };

        assert!(check_quota(&campaign, usage, 2).is_ok());
        let err = check_quota(&campaign, usage, 3).expect_err("over the cap");
        assert!(matches!(
            err,
            EngineError::QuotaExceeded {
                scope: QuotaScope::CampaignSupply,
                requested: 3,
                remaining: 2,
            }
        ));
    }

    #[test]
    fn per_user_cap_is_scoped_to_the_claimant() {
        let campaign = campaign(None, Some(5));
        let usage = QuotaUsage {
            campaign_consumed: 100, // other users' consumption is irrelevant
            user_consumed: 3,
        };

        assert!(check_quota(&campaign, usage, 2).is_ok());
        let err = check_quota(&campaign, usage, 3).expect_err("over the cap");
        assert!(matches!(
            err,
            EngineError::QuotaExceeded {
                scope: QuotaScope::PerUser,
                remaining: 2,
                ..
            }
        ));
    }

    #[test]
    fn uncapped_campaign_reports_no_remaining() {
        let (supply, user) = remaining(&campaign(Some(10), None), QuotaUsage::default());
        assert_eq!(supply, Some(10));
        assert_eq!(user, None);
    }
}
