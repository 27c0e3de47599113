//! Upstream JSON shapes and the explicit coercions applied to them.
//!
//! Structs here mirror the gRPC-gateway JSON of the Cosmos SDK modules the
//! exporter reads. Integer fields are kept as raw [`Value`]s because the
//! gateway emits 64-bit integers as strings but some nodes and proxies emit
//! numbers; each one goes through exactly one `parse_*` function below.

use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value;

use super::ClientError;
use crate::types::Amount;

// ---------------------------
// Slashing
// ---------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SigningInfoResponse {
    pub val_signing_info: SigningInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SigningInfo {
    /// Omitted by protobuf JSON when zero.
    #[serde(default)]
    pub missed_blocks_counter: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlashingParamsResponse {
    pub params: SlashingParamsWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SlashingParamsWire {
    pub signed_blocks_window: Value,
    pub min_signed_per_window: Value,
}

// ---------------------------
// Bank / distribution
// ---------------------------

/// `Coin` or `DecCoin`; the amount is parsed later with [`Amount::parse`].
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CoinWire {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BalancesResponse {
    pub balances: Vec<CoinWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommissionResponse {
    pub commission: CommissionWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommissionWire {
    #[serde(default)]
    pub commission: Vec<CoinWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DelegatorReward {
    /// `null` or missing when the delegation has accrued nothing.
    #[serde(default)]
    pub reward: Option<Vec<CoinWire>>,
}

/// The two shapes a delegator rewards response is read as.
///
/// `PerValidator` is tried first; `Totals` is only used when the response
/// has no per-validator array at all.
#[derive(Debug)]
pub(crate) enum RewardsShape {
    PerValidator(Vec<DelegatorReward>),
    Totals(Vec<CoinWire>),
}

impl RewardsShape {
    pub fn decode(body: &Value) -> Result<Self, String> {
        #[derive(Deserialize)]
        struct PerValidator {
            rewards: Vec<DelegatorReward>,
        }
        #[derive(Deserialize)]
        struct Totals {
            total: Vec<CoinWire>,
        }

        let mut errors = Vec::new();

        match PerValidator::deserialize(body) {
            Ok(p) => return Ok(RewardsShape::PerValidator(p.rewards)),
            Err(e) => errors.push(format!("per-validator: {e}")),
        }
        match Totals::deserialize(body) {
            Ok(t) => return Ok(RewardsShape::Totals(t.total)),
            Err(e) => errors.push(format!("totals: {e}")),
        }

        Err(errors.join("; "))
    }

    /// Coins matching `denom`, across whichever shape was decoded.
    pub fn coins_matching<'a>(&'a self, denom: &'a str) -> Box<dyn Iterator<Item = &'a CoinWire> + 'a> {
        match self {
            RewardsShape::PerValidator(entries) => Box::new(
                entries
                    .iter()
                    .filter_map(|e| e.reward.as_deref())
                    .flatten()
                    .filter(move |c| c.denom == denom),
            ),
            RewardsShape::Totals(coins) => Box::new(coins.iter().filter(move |c| c.denom == denom)),
        }
    }
}

// ---------------------------
// Blocks
// ---------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct LatestBlockResponse {
    #[serde(default)]
    pub block: Option<BlockWire>,
    /// Present on SDK 0.47+ next to (or instead of) `block`.
    #[serde(default)]
    pub sdk_block: Option<BlockWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockWire {
    pub header: HeaderWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HeaderWire {
    pub height: Value,
    pub time: String,
}

// ---------------------------
// Staking
// ---------------------------

pub(crate) const BOND_STATUS_BONDED: &str = "BOND_STATUS_BONDED";

#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorResponse {
    pub validator: ValidatorWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorsResponse {
    pub validators: Vec<ValidatorWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ValidatorWire {
    pub operator_address: String,
    #[serde(default)]
    pub jailed: bool,
    pub status: String,
    pub tokens: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StakingParamsResponse {
    pub params: StakingParamsWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StakingParamsWire {
    pub max_validators: Value,
}

// ---------------------------
// Governance
// ---------------------------

/// `cosmos.gov.v1beta1` proposal.
#[derive(Debug, Deserialize)]
pub(crate) struct LegacyProposal {
    pub proposal_id: Value,
    #[serde(default)]
    pub content: Option<Value>,
    pub status: String,
    #[serde(default)]
    pub voting_start_time: Option<String>,
    #[serde(default)]
    pub voting_end_time: Option<String>,
}

/// `cosmos.gov.v1` proposal.
#[derive(Debug, Deserialize)]
pub(crate) struct V1Proposal {
    pub id: Value,
    #[serde(default)]
    pub messages: Vec<Value>,
    pub status: String,
    /// Only populated from SDK 0.47 onwards.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub voting_start_time: Option<String>,
    #[serde(default)]
    pub voting_end_time: Option<String>,
}

/// A proposal list in whichever governance shape answered.
#[derive(Debug)]
pub(crate) enum ProposalList {
    Legacy(Vec<LegacyProposal>),
    Current(Vec<V1Proposal>),
}

impl ProposalList {
    pub fn decode_legacy(body: &Value) -> Result<Self, String> {
        #[derive(Deserialize)]
        struct Resp {
            proposals: Vec<LegacyProposal>,
        }
        Resp::deserialize(body)
            .map(|r| ProposalList::Legacy(r.proposals))
            .map_err(|e| e.to_string())
    }

    pub fn decode_current(body: &Value) -> Result<Self, String> {
        #[derive(Deserialize)]
        struct Resp {
            proposals: Vec<V1Proposal>,
        }
        Resp::deserialize(body)
            .map(|r| ProposalList::Current(r.proposals))
            .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoteResponse {
    pub vote: VoteWire,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoteWire {
    /// Deprecated single option, still sent by v1beta1.
    #[serde(default)]
    pub option: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<WeightedOptionWire>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WeightedOptionWire {
    pub option: String,
    #[serde(default)]
    pub weight: Option<String>,
}

// ---------------------------
// Chain registry
// ---------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RegistryResponse {
    pub chain: RegistryChain,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegistryChain {
    #[serde(default)]
    pub denom: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<Value>,
}

// ---------------------------
// Field coercions
// ---------------------------

/// Unsigned integer sent either as a JSON number or a decimal string.
pub(crate) fn parse_u64_field(field: &'static str, value: &Value) -> Result<u64, ClientError> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ClientError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Finite float sent either as a JSON number or a decimal string.
pub(crate) fn parse_f64_field(field: &'static str, value: &Value) -> Result<f64, ClientError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ClientError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

pub(crate) fn parse_amount_field(field: &'static str, raw: &str) -> Result<Amount, ClientError> {
    Amount::parse(raw).map_err(|source| ClientError::InvalidAmount { field, source })
}

/// RFC 3339 timestamp to epoch milliseconds.
pub(crate) fn parse_timestamp_ms(raw: &str) -> Result<i64, ClientError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.timestamp_millis())
        .map_err(|_| ClientError::InvalidTimestamp(raw.to_string()))
}

/// Like [`parse_timestamp_ms`], but maps missing, unparseable and
/// pre-epoch values (the protobuf zero time `0001-01-01T00:00:00Z`) to
/// `None`.
pub(crate) fn parse_optional_timestamp_ms(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| parse_timestamp_ms(s).ok())
        .filter(|ms| *ms > 0)
}
