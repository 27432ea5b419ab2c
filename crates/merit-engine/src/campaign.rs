use crate::{EngineError, EngineResult};
use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use merit_entities::campaigns;
use merit_entities::CampaignKind;
use merit_social::Engagement;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// What a campaign rewards, and therefore which verifier runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// On-chain mint of `token_id` on `contract`, proven by a transaction hash.
    Mint { contract: Address, token_id: U256 },
    /// Engagement with a cast, proven by social graph membership.
    Engagement {
        cast_hash: String,
        required: Vec<Engagement>,
    },
}

/// Optional token-holding requirement checked on every submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldingGate {
    pub contract: Address,
    pub token_id: U256,
    pub min_balance: U256,
}

/// Share step between signing and redemption. When `cast_hash` is set the
/// share is verified as a recast of that cast; otherwise confirmation is
/// taken on trust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareGate {
    pub cast_hash: Option<String>,
}

/// A campaign, parsed out of its ledger row into domain types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Campaign {
    pub slug: String,
    pub active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub supply_cap: Option<u64>,
    pub per_user_cap: Option<u64>,
    pub reward_token: Address,
    pub reward_per_unit: U256,
    pub target: Target,
    pub gate: Option<HoldingGate>,
    pub share: Option<ShareGate>,
    /// Denormalized counter carried along for reporting; quota math never
    /// reads it.
    pub claimed_units: i64,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    pub fn kind(&self) -> CampaignKind {
        match self.target {
            Target::Mint { .. } => CampaignKind::TokenMint,
            Target::Engagement { .. } => CampaignKind::Engagement,
        }
    }

    /// Total reward for `quantity` verified units.
    pub fn reward_for(&self, quantity: u64) -> EngineResult<U256> {
        self.reward_per_unit
            .checked_mul(U256::from(quantity))
            .ok_or(EngineError::NumericOverflow)
    }

    pub(crate) fn from_model(model: campaigns::Model) -> EngineResult<Self> {
        let slug = model.slug.clone();
        let corrupt = |detail: String| EngineError::CorruptCampaign(format!("`{slug}`: {detail}"));

        let target = match model.kind {
            CampaignKind::TokenMint => {
                let contract = model
                    .target_contract
                    .as_deref()
                    .ok_or_else(|| corrupt("token_mint campaign without target_contract".into()))?;
                let token_id = model
                    .target_token_id
                    .as_deref()
                    .ok_or_else(|| corrupt("token_mint campaign without target_token_id".into()))?;
                Target::Mint {
                    contract: parse_address(contract).map_err(&corrupt)?,
                    token_id: parse_u256(token_id).map_err(&corrupt)?,
                }
            }
            CampaignKind::Engagement => {
                let cast_hash = model
                    .target_cast_hash
                    .clone()
                    .ok_or_else(|| corrupt("engagement campaign without target_cast_hash".into()))?;
                let raw = model.required_engagements.as_deref().unwrap_or_default();
                let required = parse_engagement_list(raw).map_err(&corrupt)?;
                if required.is_empty() {
                    return Err(corrupt("engagement campaign without required engagements".into()));
                }
                Target::Engagement {
                    cast_hash,
                    required,
                }
            }
        };

        let gate = match (
            model.gate_contract.as_deref(),
            model.gate_token_id.as_deref(),
            model.gate_min_balance.as_deref(),
        ) {
            (None, None, None) => None,
            (Some(contract), Some(token_id), Some(min_balance)) => Some(HoldingGate {
                contract: parse_address(contract).map_err(&corrupt)?,
                token_id: parse_u256(token_id).map_err(&corrupt)?,
                min_balance: parse_u256(min_balance).map_err(&corrupt)?,
            }),
            _ => return Err(corrupt("holding gate is only partially specified".into())),
        };

        let share = model.requires_share.then(|| ShareGate {
            cast_hash: model.share_cast_hash.clone(),
        });

        Ok(Campaign {
            slug: model.slug,
            active: model.active,
            starts_at: model.starts_at,
            ends_at: model.ends_at,
            supply_cap: model.supply_cap.map(|c| c.max(0) as u64),
            per_user_cap: model.per_user_cap.map(|c| c.max(0) as u64),
            reward_token: parse_address(&model.reward_token).map_err(&corrupt)?,
            reward_per_unit: parse_u256(&model.reward_per_unit).map_err(&corrupt)?,
            target,
            gate,
            share,
            claimed_units: model.claimed_units,
            created_at: model.created_at,
        })
    }
}

/// Campaign definition as operators write it (YAML).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
    pub slug: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub supply_cap: Option<u64>,
    #[serde(default)]
    pub per_user_cap: Option<u64>,
    pub reward_token: Address,
    /// Reward per verified unit in the token's smallest denomination,
    /// as a decimal string.
    pub reward_per_unit: String,
    pub target: TargetConfig,
    #[serde(default)]
    pub gate: Option<GateConfig>,
    #[serde(default)]
    pub share: Option<ShareConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetConfig {
    TokenMint {
        contract: Address,
        token_id: String,
    },
    Engagement {
        cast_hash: String,
        required: Vec<Engagement>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub contract: Address,
    pub token_id: String,
    pub min_balance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShareConfig {
    #[serde(default)]
    pub cast_hash: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CampaignConfig {
    pub(crate) fn into_active_model(self, now: DateTime<Utc>) -> EngineResult<campaigns::ActiveModel> {
        let invalid = EngineError::InvalidConfig;

        if self.slug.is_empty() {
            return Err(invalid("slug must not be empty".into()));
        }
        if !self
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid(format!(
                "slug `{}` may only contain lowercase letters, digits and dashes",
                self.slug
            )));
        }
        if let (Some(starts), Some(ends)) = (self.starts_at, self.ends_at) {
            if starts >= ends {
                return Err(invalid("starts_at must be before ends_at".into()));
            }
        }
        let reward_per_unit =
            parse_u256(&self.reward_per_unit).map_err(|e| invalid(format!("reward_per_unit: {e}")))?;
        if reward_per_unit.is_zero() {
            return Err(invalid("reward_per_unit must be positive".into()));
        }

        let (kind, target_contract, target_token_id, target_cast_hash, required_engagements) =
            match &self.target {
                TargetConfig::TokenMint { contract, token_id } => {
                    let token_id =
                        parse_u256(token_id).map_err(|e| invalid(format!("target token_id: {e}")))?;
                    (
                        CampaignKind::TokenMint,
                        Some(format!("{contract:#x}")),
                        Some(token_id.to_string()),
                        None,
                        None,
                    )
                }
                TargetConfig::Engagement {
                    cast_hash,
                    required,
                } => {
                    if cast_hash.is_empty() {
                        return Err(invalid("target cast_hash must not be empty".into()));
                    }
                    if required.is_empty() {
                        return Err(invalid(
                            "engagement campaigns must require at least one engagement".into(),
                        ));
                    }
                    let mut deduped: Vec<Engagement> = Vec::new();
                    for kind in required {
                        if !deduped.contains(kind) {
                            deduped.push(*kind);
                        }
                    }
                    let joined = deduped
                        .iter()
                        .map(Engagement::as_str)
                        .collect::<Vec<_>>()
                        .join(",");
                    (
                        CampaignKind::Engagement,
                        None,
                        None,
                        Some(cast_hash.clone()),
                        Some(joined),
                    )
                }
            };

        let (gate_contract, gate_token_id, gate_min_balance) = match &self.gate {
            None => (None, None, None),
            Some(gate) => {
                let token_id =
                    parse_u256(&gate.token_id).map_err(|e| invalid(format!("gate token_id: {e}")))?;
                let min_balance = parse_u256(&gate.min_balance)
                    .map_err(|e| invalid(format!("gate min_balance: {e}")))?;
                if min_balance.is_zero() {
                    return Err(invalid("gate min_balance must be positive".into()));
                }
                (
                    Some(format!("{:#x}", gate.contract)),
                    Some(token_id.to_string()),
                    Some(min_balance.to_string()),
                )
            }
        };

        Ok(campaigns::ActiveModel {
            slug: Set(self.slug),
            kind: Set(kind),
            active: Set(self.active),
            starts_at: Set(self.starts_at),
            ends_at: Set(self.ends_at),
            supply_cap: Set(self.supply_cap.map(cap_to_i64).transpose()?),
            per_user_cap: Set(self.per_user_cap.map(cap_to_i64).transpose()?),
            reward_token: Set(format!("{:#x}", self.reward_token)),
            reward_per_unit: Set(reward_per_unit.to_string()),
            target_contract: Set(target_contract),
            target_token_id: Set(target_token_id),
            target_cast_hash: Set(target_cast_hash),
            required_engagements: Set(required_engagements),
            gate_contract: Set(gate_contract),
            gate_token_id: Set(gate_token_id),
            gate_min_balance: Set(gate_min_balance),
            requires_share: Set(self.share.is_some()),
            share_cast_hash: Set(self.share.and_then(|s| s.cast_hash)),
            claimed_units: Set(0),
            created_at: Set(now),
        })
    }
}

fn cap_to_i64(cap: u64) -> EngineResult<i64> {
    i64::try_from(cap)
        .map_err(|_| EngineError::InvalidConfig(format!("cap {cap} exceeds the ledger range")))
}

fn parse_address(s: &str) -> Result<Address, String> {
    s.parse::<Address>()
        .map_err(|e| format!("bad address `{s}`: {e}"))
}

fn parse_u256(s: &str) -> Result<U256, String> {
    s.parse::<U256>().map_err(|e| format!("bad uint `{s}`: {e}"))
}

fn parse_engagement_list(raw: &str) -> Result<Vec<Engagement>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<Engagement>().map_err(|e| e.to_string()))
        .collect()
}
