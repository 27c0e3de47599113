//! The fixed set of gauges this exporter publishes.

/// Name, help text and variable label names of one gauge family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GaugeDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

/// Identifies one gauge family.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Gauge {
    MissedBlocks,
    SignedBlocksWindow,
    MinSignedPerWindow,
    WalletBalance,
    AvailableCommission,
    AvailableRewards,
    LatestBlockTime,
    LatestBlockHeight,
    BondedTokens,
    MaxValidators,
    ValidatorActive,
    ValidatorJailed,
    ValidatorRank,
    ActiveProposal,
    ProposalVotingStart,
    ProposalVotingEnd,
    GovernanceVote,
}

const PROPOSAL_LABELS: &[&str] = &["proposal_id", "title", "status"];

impl Gauge {
    pub const ALL: [Gauge; 17] = [
        Gauge::MissedBlocks,
        Gauge::SignedBlocksWindow,
        Gauge::MinSignedPerWindow,
        Gauge::WalletBalance,
        Gauge::AvailableCommission,
        Gauge::AvailableRewards,
        Gauge::LatestBlockTime,
        Gauge::LatestBlockHeight,
        Gauge::BondedTokens,
        Gauge::MaxValidators,
        Gauge::ValidatorActive,
        Gauge::ValidatorJailed,
        Gauge::ValidatorRank,
        Gauge::ActiveProposal,
        Gauge::ProposalVotingStart,
        Gauge::ProposalVotingEnd,
        Gauge::GovernanceVote,
    ];

    pub fn descriptor(self) -> GaugeDescriptor {
        let (name, help, labels): (&str, &str, &[&str]) = match self {
            Gauge::MissedBlocks => (
                "validator_missed_blocks_counter",
                "Blocks missed by the validator in the current slashing window",
                &["consensus_address"],
            ),
            Gauge::SignedBlocksWindow => (
                "chain_signed_blocks_window",
                "Slashing parameter: number of blocks in the liveness window",
                &[],
            ),
            Gauge::MinSignedPerWindow => (
                "chain_min_signed_per_window",
                "Slashing parameter: minimum fraction of the window a validator must sign",
                &[],
            ),
            Gauge::WalletBalance => (
                "validator_wallet_balance_filtered",
                "Wallet balance in display units (amount / 10^exponent, truncated)",
                &["wallet_address"],
            ),
            Gauge::AvailableCommission => (
                "validator_available_commission_filtered",
                "Outstanding validator commission in display units",
                &["operator_address"],
            ),
            Gauge::AvailableRewards => (
                "validator_available_rewards_filtered",
                "Pending delegation rewards of the wallet in display units",
                &["wallet_address"],
            ),
            Gauge::LatestBlockTime => (
                "chain_latest_block_time",
                "Time of the latest block, milliseconds since the Unix epoch",
                &[],
            ),
            Gauge::LatestBlockHeight => (
                "chain_latest_block_height",
                "Height of the latest block",
                &[],
            ),
            Gauge::BondedTokens => (
                "validator_bonded_tokens_filtered",
                "Tokens delegated to the validator in display units",
                &["operator_address"],
            ),
            Gauge::MaxValidators => (
                "chain_max_validators",
                "Staking parameter: maximum number of bonded validators",
                &[],
            ),
            Gauge::ValidatorActive => (
                "validator_active",
                "1 if the validator is in the bonded set, 0 otherwise",
                &["operator_address"],
            ),
            Gauge::ValidatorJailed => (
                "validator_jailed",
                "1 if the validator is jailed, 0 otherwise",
                &["operator_address"],
            ),
            Gauge::ValidatorRank => (
                "validator_rank",
                "Position of the validator in the bonded set by tokens (1-based), 0 if not bonded",
                &["operator_address"],
            ),
            Gauge::ActiveProposal => (
                "governance_active_proposal",
                "Open governance proposal (deposit or voting period); always 1",
                PROPOSAL_LABELS,
            ),
            Gauge::ProposalVotingStart => (
                "governance_proposal_voting_start_time",
                "Voting period start of an open proposal, milliseconds since the Unix epoch",
                PROPOSAL_LABELS,
            ),
            Gauge::ProposalVotingEnd => (
                "governance_proposal_voting_end_time",
                "Voting period end of an open proposal, milliseconds since the Unix epoch",
                PROPOSAL_LABELS,
            ),
            Gauge::GovernanceVote => (
                "validator_governance_vote",
                "Vote cast by the wallet: 0 none, 1 yes, 2 abstain, 3 no, 4 no with veto",
                &["proposal_id", "wallet_address", "option"],
            ),
        };
        GaugeDescriptor { name, help, labels }
    }
}
