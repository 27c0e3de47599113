//! Governance proposal and vote types.
//!
//! These are the normalized forms of the two governance module shapes
//! (`cosmos.gov.v1beta1` and `cosmos.gov.v1`). They are rebuilt on every
//! scrape and never stored.

use std::fmt;

/// Placeholder title used when no title can be resolved for a proposal.
pub const UNTITLED_PROPOSAL: &str = "Untitled Vote";

/// Governance module API version a proposal list was read from.
///
/// Votes must be looked up through the same version.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum GovVersion {
    V1Beta1,
    V1,
}

impl GovVersion {
    pub fn path_segment(self) -> &'static str {
        match self {
            GovVersion::V1Beta1 => "v1beta1",
            GovVersion::V1 => "v1",
        }
    }
}

/// Status of a proposal that is still open.
///
/// Passed, rejected and failed proposals have no representation here: they
/// are dropped while parsing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ProposalStatus {
    DepositPeriod,
    VotingPeriod,
}

impl ProposalStatus {
    /// Maps the upstream enum name, returning `None` for closed proposals.
    pub fn from_upstream(raw: &str) -> Option<Self> {
        match raw {
            "PROPOSAL_STATUS_DEPOSIT_PERIOD" => Some(ProposalStatus::DepositPeriod),
            "PROPOSAL_STATUS_VOTING_PERIOD" => Some(ProposalStatus::VotingPeriod),
            _ => None,
        }
    }

    /// Label value used in published metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            ProposalStatus::DepositPeriod => "deposit_period",
            ProposalStatus::VotingPeriod => "voting_period",
        }
    }
}

/// A validator's vote on one proposal.
///
/// The discriminants match the `cosmos.gov.v1.VoteOption` enum; `NoVote`
/// shares 0 with `VOTE_OPTION_UNSPECIFIED`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VoteOption {
    NoVote = 0,
    Yes = 1,
    Abstain = 2,
    No = 3,
    NoWithVeto = 4,
}

impl VoteOption {
    /// Parses an upstream option name such as `VOTE_OPTION_YES`.
    ///
    /// Returns `None` for names this exporter does not know.
    pub fn from_upstream(raw: &str) -> Option<Self> {
        match raw {
            "VOTE_OPTION_UNSPECIFIED" => Some(VoteOption::NoVote),
            "VOTE_OPTION_YES" => Some(VoteOption::Yes),
            "VOTE_OPTION_ABSTAIN" => Some(VoteOption::Abstain),
            "VOTE_OPTION_NO" => Some(VoteOption::No),
            "VOTE_OPTION_NO_WITH_VETO" => Some(VoteOption::NoWithVeto),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn as_label(self) -> &'static str {
        match self {
            VoteOption::NoVote => "no_vote",
            VoteOption::Yes => "yes",
            VoteOption::Abstain => "abstain",
            VoteOption::No => "no",
            VoteOption::NoWithVeto => "no_with_veto",
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// One open proposal, optionally annotated with the wallet's vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalRecord {
    pub id: u64,
    pub title: String,
    pub status: ProposalStatus,
    /// Voting period start, epoch milliseconds. `None` while in deposit.
    pub voting_start_ms: Option<i64>,
    /// Voting period end, epoch milliseconds. `None` while in deposit.
    pub voting_end_ms: Option<i64>,
    /// Set only for voting-period proposals after vote lookup.
    pub vote: Option<VoteOption>,
    /// Governance API version the record was read from.
    pub source: GovVersion,
}
