//! Chain data client operations.
//!
//! Each method reads one upstream resource and normalizes it into a plain
//! value. Methods never panic on malformed input; they return a
//! [`ClientError`] that names what was wrong.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::wire::{
    self, BalancesResponse, CommissionResponse, LatestBlockResponse, LegacyProposal, ProposalList,
    RewardsShape, SigningInfoResponse, SlashingParamsResponse, StakingParamsResponse,
    V1Proposal, ValidatorResponse, ValidatorsResponse, VoteResponse,
};
use super::{ClientError, RestSource};
use crate::config::ClientConfig;
use crate::types::{
    Amount, GovVersion, LatestBlock, ProposalRecord, ProposalStatus, SlashingParams,
    UNTITLED_PROPOSAL, ValidatorStatus, VoteOption,
};

/// Most recent proposals requested from the governance module.
const PROPOSAL_PAGE_LIMIT: u32 = 200;

/// A denom together with the exponent that converts it to display units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Denomination {
    pub denom: String,
    pub exponent: u32,
}

/// Stateless query layer over a [`RestSource`].
pub struct ChainClient<S> {
    source: S,
    validator_page_limit: u32,
}

impl<S> ChainClient<S>
where
    S: RestSource,
{
    pub fn new(source: S, config: &ClientConfig) -> Self {
        Self {
            source,
            validator_page_limit: config.validator_page_limit,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.source.get_json(path).await?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode {
            url: path.to_string(),
            message: e.to_string(),
        })
    }

    // ---------------------------
    // Slashing
    // ---------------------------

    /// Missed-block counter from the validator's signing info.
    pub async fn missed_blocks(&self, consensus_address: &str) -> Result<u64, ClientError> {
        let path = format!("/cosmos/slashing/v1beta1/signing_infos/{consensus_address}");
        let resp: SigningInfoResponse = self.fetch(&path).await?;
        match resp.val_signing_info.missed_blocks_counter {
            None | Some(Value::Null) => Ok(0),
            Some(counter) => wire::parse_u64_field("missed_blocks_counter", &counter),
        }
    }

    pub async fn slashing_params(&self) -> Result<SlashingParams, ClientError> {
        let resp: SlashingParamsResponse = self.fetch("/cosmos/slashing/v1beta1/params").await?;
        Ok(SlashingParams {
            signed_blocks_window: wire::parse_u64_field(
                "signed_blocks_window",
                &resp.params.signed_blocks_window,
            )?,
            min_signed_per_window: wire::parse_f64_field(
                "min_signed_per_window",
                &resp.params.min_signed_per_window,
            )?,
        })
    }

    // ---------------------------
    // Bank / distribution
    // ---------------------------

    /// Wallet balance of `denom`, scaled to display units.
    ///
    /// Fails with [`ClientError::DenomNotFound`] if the wallet holds none.
    pub async fn balance(
        &self,
        wallet_address: &str,
        denom: &Denomination,
    ) -> Result<u128, ClientError> {
        let path = format!("/cosmos/bank/v1beta1/balances/{wallet_address}");
        let resp: BalancesResponse = self.fetch(&path).await?;
        let coin = resp
            .balances
            .iter()
            .find(|c| c.denom == denom.denom)
            .ok_or_else(|| ClientError::DenomNotFound {
                denom: denom.denom.clone(),
                resource: "bank balances",
            })?;
        scale(&wire::parse_amount_field("balances.amount", &coin.amount)?, denom)
    }

    /// Outstanding validator commission in `denom`, scaled.
    pub async fn commission(
        &self,
        operator_address: &str,
        denom: &Denomination,
    ) -> Result<u128, ClientError> {
        let path = format!("/cosmos/distribution/v1beta1/validators/{operator_address}/commission");
        let resp: CommissionResponse = self.fetch(&path).await?;
        let coin = resp
            .commission
            .commission
            .iter()
            .find(|c| c.denom == denom.denom)
            .ok_or_else(|| ClientError::DenomNotFound {
                denom: denom.denom.clone(),
                resource: "validator commission",
            })?;
        scale(&wire::parse_amount_field("commission.amount", &coin.amount)?, denom)
    }

    /// Sum of all pending delegation rewards in `denom`, scaled.
    ///
    /// Entries without rewards or in other denoms contribute zero.
    pub async fn rewards(
        &self,
        wallet_address: &str,
        denom: &Denomination,
    ) -> Result<u128, ClientError> {
        let path = format!("/cosmos/distribution/v1beta1/delegators/{wallet_address}/rewards");
        let body = self.source.get_json(&path).await?;
        let shape = RewardsShape::decode(&body).map_err(|message| ClientError::Decode {
            url: path.clone(),
            message,
        })?;

        let mut total = Amount::zero();
        for coin in shape.coins_matching(&denom.denom) {
            total = total + wire::parse_amount_field("reward.amount", &coin.amount)?;
        }
        scale(&total, denom)
    }

    // ---------------------------
    // Blocks
    // ---------------------------

    pub async fn latest_block(&self) -> Result<LatestBlock, ClientError> {
        let path = "/cosmos/base/tendermint/v1beta1/blocks/latest";
        let resp: LatestBlockResponse = self.fetch(path).await?;
        let block = resp
            .block
            .or(resp.sdk_block)
            .ok_or_else(|| ClientError::Decode {
                url: path.to_string(),
                message: "response has neither `block` nor `sdk_block`".to_string(),
            })?;

        Ok(LatestBlock {
            height: wire::parse_u64_field("block.header.height", &block.header.height)?,
            time_ms: wire::parse_timestamp_ms(&block.header.time)?,
        })
    }

    /// Latest block time in epoch milliseconds.
    pub async fn latest_block_time(&self) -> Result<i64, ClientError> {
        Ok(self.latest_block().await?.time_ms)
    }

    // ---------------------------
    // Staking
    // ---------------------------

    /// Tokens, bond status and jail status of one validator.
    pub async fn validator(&self, operator_address: &str) -> Result<ValidatorStatus, ClientError> {
        let path = format!("/cosmos/staking/v1beta1/validators/{operator_address}");
        let resp: ValidatorResponse = self.fetch(&path).await?;
        Ok(ValidatorStatus {
            tokens: wire::parse_amount_field("validator.tokens", &resp.validator.tokens)?,
            bonded: resp.validator.status == wire::BOND_STATUS_BONDED,
            jailed: resp.validator.jailed,
        })
    }

    /// Total delegated tokens, scaled by `exponent`.
    pub async fn validator_bond(
        &self,
        operator_address: &str,
        exponent: u32,
    ) -> Result<u128, ClientError> {
        let status = self.validator(operator_address).await?;
        status
            .tokens
            .scaled(exponent)
            .map_err(|source| ClientError::InvalidAmount {
                field: "validator.tokens",
                source,
            })
    }

    pub async fn validator_active(&self, operator_address: &str) -> Result<bool, ClientError> {
        Ok(self.validator(operator_address).await?.bonded)
    }

    pub async fn validator_jailed(&self, operator_address: &str) -> Result<bool, ClientError> {
        Ok(self.validator(operator_address).await?.jailed)
    }

    pub async fn max_validators(&self) -> Result<u64, ClientError> {
        let resp: StakingParamsResponse = self.fetch("/cosmos/staking/v1beta1/params").await?;
        wire::parse_u64_field("max_validators", &resp.params.max_validators)
    }

    /// 1-based position of the validator in the bonded set by tokens, or 0
    /// if it is not bonded. The bonded set is not queried in that case.
    pub async fn validator_rank(&self, operator_address: &str) -> Result<u32, ClientError> {
        if !self.validator_active(operator_address).await? {
            return Ok(0);
        }
        self.bonded_rank(operator_address).await
    }

    /// Rank within the bonded set, without checking the validator's own
    /// status first. Returns 0 if it is not in the fetched page.
    pub async fn bonded_rank(&self, operator_address: &str) -> Result<u32, ClientError> {
        let path = format!(
            "/cosmos/staking/v1beta1/validators?status={}&pagination.limit={}",
            wire::BOND_STATUS_BONDED,
            self.validator_page_limit
        );
        let resp: ValidatorsResponse = self.fetch(&path).await?;

        let set = resp
            .validators
            .into_iter()
            .map(|v| {
                let tokens = wire::parse_amount_field("validators.tokens", &v.tokens)?;
                Ok((v.operator_address, tokens))
            })
            .collect::<Result<Vec<_>, ClientError>>()?;

        Ok(rank_by_tokens(set, operator_address))
    }

    // ---------------------------
    // Governance
    // ---------------------------

    /// Open proposals (deposit or voting period), newest first.
    ///
    /// The `v1beta1` endpoint is tried first; `v1` is used when the legacy
    /// endpoint fails or answers in a shape that does not decode.
    pub async fn active_proposals(&self) -> Result<Vec<ProposalRecord>, ClientError> {
        let legacy = self.proposal_list(GovVersion::V1Beta1).await;
        let list = match legacy {
            Ok(list) => list,
            Err(legacy_err) => {
                debug!(error = %legacy_err, "gov v1beta1 proposals unavailable, trying v1");
                self.proposal_list(GovVersion::V1)
                    .await
                    .map_err(|current_err| ClientError::Governance {
                        legacy: Box::new(legacy_err),
                        current: Box::new(current_err),
                    })?
            }
        };

        Ok(match list {
            ProposalList::Legacy(proposals) => {
                proposals.into_iter().filter_map(legacy_record).collect()
            }
            ProposalList::Current(proposals) => {
                proposals.into_iter().filter_map(current_record).collect()
            }
        })
    }

    async fn proposal_list(&self, version: GovVersion) -> Result<ProposalList, ClientError> {
        let path = format!(
            "/cosmos/gov/{}/proposals?pagination.limit={PROPOSAL_PAGE_LIMIT}&pagination.reverse=true",
            version.path_segment()
        );
        let body = self.source.get_json(&path).await?;
        let decoded = match version {
            GovVersion::V1Beta1 => ProposalList::decode_legacy(&body),
            GovVersion::V1 => ProposalList::decode_current(&body),
        };
        decoded.map_err(|message| ClientError::Decode { url: path, message })
    }

    /// The wallet's vote on one proposal.
    ///
    /// "Not found" answers and undecodable votes become
    /// [`VoteOption::NoVote`]; only transport-level and other server errors
    /// are returned.
    pub async fn vote(
        &self,
        version: GovVersion,
        proposal_id: u64,
        wallet_address: &str,
    ) -> Result<VoteOption, ClientError> {
        let path = format!(
            "/cosmos/gov/{}/proposals/{proposal_id}/votes/{wallet_address}",
            version.path_segment()
        );
        match self.source.get_json(&path).await {
            Ok(body) => Ok(decode_vote(body).unwrap_or(VoteOption::NoVote)),
            Err(e) if e.is_not_found() => Ok(VoteOption::NoVote),
            Err(ClientError::Decode { .. }) => Ok(VoteOption::NoVote),
            Err(e) => Err(e),
        }
    }

    /// Open proposals, with the wallet's vote filled in for every
    /// voting-period proposal.
    ///
    /// A vote lookup that fails outright leaves that record's `vote` unset
    /// instead of failing the listing.
    pub async fn address_votes(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<ProposalRecord>, ClientError> {
        let mut proposals = self.active_proposals().await?;
        for proposal in proposals
            .iter_mut()
            .filter(|p| p.status == ProposalStatus::VotingPeriod)
        {
            match self.vote(proposal.source, proposal.id, wallet_address).await {
                Ok(option) => proposal.vote = Some(option),
                Err(e) => warn!(
                    proposal_id = proposal.id,
                    address = wallet_address,
                    error = %e,
                    "vote lookup failed"
                ),
            }
        }
        Ok(proposals)
    }
}

fn scale(amount: &Amount, denom: &Denomination) -> Result<u128, ClientError> {
    amount
        .scaled(denom.exponent)
        .map_err(|source| ClientError::InvalidAmount {
            field: "exponent",
            source,
        })
}

/// Stable descending sort by tokens, so equal stakes keep upstream order.
pub(crate) fn rank_by_tokens(mut set: Vec<(String, Amount)>, operator_address: &str) -> u32 {
    set.sort_by(|a, b| b.1.cmp(&a.1));
    set.iter()
        .position(|(addr, _)| addr == operator_address)
        .map(|idx| idx as u32 + 1)
        .unwrap_or(0)
}

/// Title from the direct field, else from the messages, else the
/// placeholder.
pub(crate) fn resolve_title(direct: Option<&str>, messages: &[Value]) -> String {
    fn non_empty(s: &str) -> Option<&str> {
        let s = s.trim();
        (!s.is_empty()).then_some(s)
    }

    fn message_title(msg: &Value) -> Option<&str> {
        msg.get("title")
            .and_then(Value::as_str)
            .and_then(non_empty)
            .or_else(|| {
                msg.get("content")
                    .and_then(|c| c.get("title"))
                    .and_then(Value::as_str)
                    .and_then(non_empty)
            })
    }

    direct
        .and_then(non_empty)
        .or_else(|| messages.iter().find_map(message_title))
        .unwrap_or(UNTITLED_PROPOSAL)
        .to_string()
}

fn legacy_record(p: LegacyProposal) -> Option<ProposalRecord> {
    let status = ProposalStatus::from_upstream(&p.status)?;
    let id = proposal_id(&p.proposal_id)?;
    let direct = p
        .content
        .as_ref()
        .and_then(|c| c.get("title"))
        .and_then(Value::as_str);

    Some(ProposalRecord {
        id,
        title: resolve_title(direct, &[]),
        status,
        voting_start_ms: wire::parse_optional_timestamp_ms(p.voting_start_time.as_deref()),
        voting_end_ms: wire::parse_optional_timestamp_ms(p.voting_end_time.as_deref()),
        vote: None,
        source: GovVersion::V1Beta1,
    })
}

fn current_record(p: V1Proposal) -> Option<ProposalRecord> {
    let status = ProposalStatus::from_upstream(&p.status)?;
    let id = proposal_id(&p.id)?;

    Some(ProposalRecord {
        id,
        title: resolve_title(p.title.as_deref(), &p.messages),
        status,
        voting_start_ms: wire::parse_optional_timestamp_ms(p.voting_start_time.as_deref()),
        voting_end_ms: wire::parse_optional_timestamp_ms(p.voting_end_time.as_deref()),
        vote: None,
        source: GovVersion::V1,
    })
}

fn proposal_id(raw: &Value) -> Option<u64> {
    match wire::parse_u64_field("proposal_id", raw) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "skipping proposal with unreadable id");
            None
        }
    }
}

/// Single option, or the heaviest of a weighted vote.
fn decode_vote(body: Value) -> Option<VoteOption> {
    let resp: VoteResponse = serde_json::from_value(body).ok()?;

    let weighted = resp.vote.options.unwrap_or_default();
    if !weighted.is_empty() {
        let heaviest = weighted.iter().max_by(|a, b| {
            let wa = weight(a.weight.as_deref());
            let wb = weight(b.weight.as_deref());
            wa.total_cmp(&wb)
        })?;
        return VoteOption::from_upstream(&heaviest.option);
    }

    resp.vote
        .option
        .as_deref()
        .and_then(VoteOption::from_upstream)
}

fn weight(raw: Option<&str>) -> f64 {
    raw.and_then(|w| w.parse::<f64>().ok())
        .filter(|w| w.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{self, FakeResponse, FakeSource};
    use serde_json::json;

    fn client(source: FakeSource) -> ChainClient<FakeSource> {
        ChainClient::new(source, &ClientConfig::default())
    }

    fn uatom() -> Denomination {
        Denomination {
            denom: "uatom".to_string(),
            exponent: 6,
        }
    }

    #[tokio::test]
    async fn missed_blocks_and_slashing_params_are_coerced() {
        let c = client(testing::healthy_node());

        assert_eq!(c.missed_blocks(testing::CONSENSUS).await.unwrap(), 12);

        let params = c.slashing_params().await.unwrap();
        assert_eq!(params.signed_blocks_window, 10_000);
        assert_eq!(params.min_signed_per_window, 0.05);
    }

    #[tokio::test]
    async fn absent_missed_block_counter_means_zero() {
        let path = format!("/cosmos/slashing/v1beta1/signing_infos/{}", testing::CONSENSUS);
        let source = testing::healthy_node().with_json(
            &path,
            json!({"val_signing_info": {"address": testing::CONSENSUS, "start_height": "0"}}),
        );
        source.set(
            "/cosmos/slashing/v1beta1/signing_infos/cosmosvalcons1garbled",
            FakeResponse::Json(json!({"val_signing_info": {"missed_blocks_counter": "many"}})),
        );
        let c = client(source);

        assert_eq!(c.missed_blocks(testing::CONSENSUS).await.unwrap(), 0);
        assert!(matches!(
            c.missed_blocks("cosmosvalcons1garbled").await,
            Err(ClientError::InvalidNumber { .. })
        ));
    }

    #[tokio::test]
    async fn balance_is_scaled_and_truncated() {
        let c = client(testing::healthy_node());
        // 1_999_999_999 uatom -> 1999 ATOM, not 2000.
        assert_eq!(c.balance(testing::WALLET, &uatom()).await.unwrap(), 1999);
    }

    #[tokio::test]
    async fn balance_without_denom_fails() {
        let c = client(testing::healthy_node());
        let denom = Denomination {
            denom: "uosmo".to_string(),
            exponent: 6,
        };
        let err = c.balance(testing::WALLET, &denom).await.unwrap_err();
        assert!(matches!(err, ClientError::DenomNotFound { .. }), "{err}");
    }

    #[tokio::test]
    async fn commission_matches_denom() {
        let c = client(testing::healthy_node());
        assert_eq!(c.commission(testing::OPERATOR, &uatom()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn rewards_sum_only_matching_denom() {
        let source = FakeSource::new().with_json(
            &format!("/cosmos/distribution/v1beta1/delegators/{}/rewards", testing::WALLET),
            json!({
                "rewards": [
                    {"validator_address": "a", "reward": [{"denom": "x", "amount": "5"}, {"denom": "y", "amount": "3"}]},
                    {"validator_address": "b", "reward": []},
                    {"validator_address": "c", "reward": [{"denom": "y", "amount": "7"}]}
                ],
                "total": []
            }),
        );
        let c = client(source);
        let denom = Denomination {
            denom: "x".to_string(),
            exponent: 0,
        };
        assert_eq!(c.rewards(testing::WALLET, &denom).await.unwrap(), 5);

        let absent = Denomination {
            denom: "z".to_string(),
            exponent: 0,
        };
        assert_eq!(c.rewards(testing::WALLET, &absent).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rewards_sum_fractions_before_scaling() {
        let c = client(testing::healthy_node());
        // 700000.6 + 300000.6 = 1000001.2 uatom -> 1 ATOM.
        assert_eq!(c.rewards(testing::WALLET, &uatom()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn latest_block_time_is_epoch_millis() {
        let c = client(testing::healthy_node());
        let block = c.latest_block().await.unwrap();
        assert_eq!(block.height, 19_000_000);
        assert_eq!(c.latest_block_time().await.unwrap(), 1_714_564_800_500);
    }

    #[tokio::test]
    async fn latest_block_falls_back_to_sdk_block() {
        let source = FakeSource::new().with_json(
            "/cosmos/base/tendermint/v1beta1/blocks/latest",
            json!({"sdk_block": {"header": {"height": "7", "time": "1970-01-01T00:00:02Z"}}}),
        );
        let block = client(source).latest_block().await.unwrap();
        assert_eq!(block, LatestBlock { height: 7, time_ms: 2_000 });
    }

    #[tokio::test]
    async fn validator_fields_are_normalized() {
        let c = client(testing::healthy_node());
        assert_eq!(c.validator_bond(testing::OPERATOR, 6).await.unwrap(), 300);
        assert!(c.validator_active(testing::OPERATOR).await.unwrap());
        assert!(!c.validator_jailed(testing::OPERATOR).await.unwrap());
        assert_eq!(c.max_validators().await.unwrap(), 180);
    }

    #[test]
    fn rank_sorts_descending_by_tokens() {
        let set = vec![
            ("A".to_string(), Amount::from_whole(100)),
            ("B".to_string(), Amount::from_whole(300)),
            ("C".to_string(), Amount::from_whole(200)),
        ];
        assert_eq!(rank_by_tokens(set.clone(), "B"), 1);
        assert_eq!(rank_by_tokens(set.clone(), "C"), 2);
        assert_eq!(rank_by_tokens(set.clone(), "A"), 3);
        assert_eq!(rank_by_tokens(set, "D"), 0);
    }

    #[test]
    fn rank_ties_keep_upstream_order() {
        let set = vec![
            ("first".to_string(), Amount::from_whole(50)),
            ("second".to_string(), Amount::from_whole(50)),
        ];
        assert_eq!(rank_by_tokens(set.clone(), "first"), 1);
        assert_eq!(rank_by_tokens(set, "second"), 2);
    }

    #[tokio::test]
    async fn rank_of_bonded_validator_uses_bonded_set() {
        let c = client(testing::healthy_node());
        assert_eq!(c.validator_rank(testing::OPERATOR).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn inactive_validator_ranks_zero_without_fetching_set() {
        let source = testing::healthy_node();
        source.set(
            &format!("/cosmos/staking/v1beta1/validators/{}", testing::OPERATOR),
            FakeResponse::Json(json!({"validator": {
                "operator_address": testing::OPERATOR,
                "jailed": true,
                "status": "BOND_STATUS_UNBONDING",
                "tokens": "300000000"
            }})),
        );
        let c = client(source);

        assert_eq!(c.validator_rank(testing::OPERATOR).await.unwrap(), 0);
        assert!(
            !c.source()
                .calls()
                .iter()
                .any(|p| p.starts_with("/cosmos/staking/v1beta1/validators?")),
            "bonded set must not be queried"
        );
    }

    #[tokio::test]
    async fn active_proposals_filter_closed_and_default_titles() {
        let c = client(testing::healthy_node());
        let proposals = c.active_proposals().await.unwrap();

        let ids: Vec<u64> = proposals.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![42, 41]);
        assert!(proposals.iter().all(|p| p.source == GovVersion::V1Beta1));

        assert_eq!(proposals[0].title, "Raise max validators");
        assert_eq!(proposals[0].status, ProposalStatus::VotingPeriod);
        assert!(proposals[0].voting_end_ms.is_some());

        assert_eq!(proposals[1].title, UNTITLED_PROPOSAL);
        assert_eq!(proposals[1].status, ProposalStatus::DepositPeriod);
        assert_eq!(proposals[1].voting_start_ms, None);
    }

    #[tokio::test]
    async fn active_proposals_fall_back_to_gov_v1() {
        let source = testing::healthy_node();
        source.set(
            &testing::proposals_path("v1beta1"),
            FakeResponse::Status(500, "can't convert a gov/v1 Proposal to gov/v1beta1".to_string()),
        );
        source.set(
            &testing::proposals_path("v1"),
            FakeResponse::Json(json!({"proposals": [
                {
                    "id": "7",
                    "status": "PROPOSAL_STATUS_VOTING_PERIOD",
                    "title": "",
                    "messages": [{"@type": "/cosmos.gov.v1.MsgExecLegacyContent",
                                  "content": {"title": "Legacy text proposal"}}],
                    "voting_start_time": "2024-05-01T00:00:00Z",
                    "voting_end_time": "2024-05-15T00:00:00Z"
                },
                {"id": "6", "status": "PROPOSAL_STATUS_PASSED", "title": "old", "messages": []}
            ]})),
        );
        let proposals = client(source).active_proposals().await.unwrap();

        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].id, 7);
        assert_eq!(proposals[0].title, "Legacy text proposal");
        assert_eq!(proposals[0].source, GovVersion::V1);
    }

    #[tokio::test]
    async fn active_proposals_fail_only_when_both_shapes_fail() {
        let source = testing::healthy_node();
        source.set(&testing::proposals_path("v1beta1"), FakeResponse::Status(500, String::new()));
        source.set(&testing::proposals_path("v1"), FakeResponse::Json(json!({"nope": []})));

        let err = client(source).active_proposals().await.unwrap_err();
        assert!(matches!(err, ClientError::Governance { .. }), "{err}");
    }

    #[test]
    fn title_resolution_order() {
        let messages = vec![
            json!({"@type": "/cosmos.upgrade.v1beta1.MsgSoftwareUpgrade"}),
            json!({"content": {"title": "Nested"}}),
        ];
        assert_eq!(resolve_title(Some("Direct"), &messages), "Direct");
        assert_eq!(resolve_title(Some("  "), &messages), "Nested");
        assert_eq!(resolve_title(None, &[]), UNTITLED_PROPOSAL);
    }

    #[tokio::test]
    async fn address_votes_annotate_voting_period_only() {
        let c = client(testing::healthy_node());
        let proposals = c.address_votes(testing::WALLET).await.unwrap();

        let voting = proposals.iter().find(|p| p.id == 42).unwrap();
        assert_eq!(voting.vote, Some(VoteOption::Yes));

        let deposit = proposals.iter().find(|p| p.id == 41).unwrap();
        assert_eq!(deposit.vote, None);
        assert!(
            !c.source().calls().iter().any(|p| p.contains("/proposals/41/votes/")),
            "deposit-period proposals have no vote to look up"
        );
    }

    #[tokio::test]
    async fn missing_or_garbled_votes_become_no_vote() {
        let path = format!("/cosmos/gov/v1beta1/proposals/42/votes/{}", testing::WALLET);
        let cases = [
            FakeResponse::Status(404, String::new()),
            FakeResponse::Status(
                500,
                "rpc error: code = NotFound desc = vote not found".to_string(),
            ),
            FakeResponse::Json(json!({"vote": {"option": "VOTE_OPTION_SOMETHING_NEW"}})),
            FakeResponse::Json(json!({"unexpected": 1})),
            FakeResponse::Garbage,
        ];

        for response in cases {
            let source = testing::healthy_node();
            source.set(&path, response);
            let vote = client(source)
                .vote(GovVersion::V1Beta1, 42, testing::WALLET)
                .await
                .unwrap();
            assert_eq!(vote, VoteOption::NoVote);
        }
    }

    #[tokio::test]
    async fn failed_vote_lookup_does_not_fail_listing() {
        let source = testing::healthy_node();
        source.set(
            &format!("/cosmos/gov/v1beta1/proposals/42/votes/{}", testing::WALLET),
            FakeResponse::Transport,
        );
        let proposals = client(source).address_votes(testing::WALLET).await.unwrap();
        assert_eq!(proposals.len(), 2);
        assert!(proposals.iter().all(|p| p.vote.is_none()));
    }

    #[test]
    fn weighted_vote_resolves_to_heaviest_option() {
        let body = json!({"vote": {"options": [
            {"option": "VOTE_OPTION_YES", "weight": "0.300000000000000000"},
            {"option": "VOTE_OPTION_NO", "weight": "0.700000000000000000"}
        ]}});
        assert_eq!(decode_vote(body), Some(VoteOption::No));
    }
}
