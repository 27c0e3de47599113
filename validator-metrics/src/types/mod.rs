//! Normalized domain types produced by the chain data client.
//!
//! The upstream REST API is loosely typed (integers as strings, two
//! governance shapes, decimal amounts). Everything in this module is the
//! already-normalized form: plain numbers, enums and owned strings that the
//! refresh orchestrator can turn into gauge samples without further parsing.

/// Exact token amounts and display-unit scaling.
pub mod amount;
/// Governance proposals and votes.
pub mod governance;

pub use amount::{Amount, AmountError, DEC_PRECISION, MAX_EXPONENT};
pub use governance::{GovVersion, ProposalRecord, ProposalStatus, UNTITLED_PROPOSAL, VoteOption};

/// Slashing parameters of the network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlashingParams {
    /// Number of blocks in the liveness window.
    pub signed_blocks_window: u64,
    /// Minimum fraction of the window a validator must sign (0..1).
    pub min_signed_per_window: f64,
}

/// Staking state of one validator, as read from the staking module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorStatus {
    /// Total delegated tokens in the smallest unit.
    pub tokens: Amount,
    /// `true` iff the validator is `BOND_STATUS_BONDED`.
    pub bonded: bool,
    pub jailed: bool,
}

/// Header fields of the most recent block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatestBlock {
    pub height: u64,
    /// Block time, epoch milliseconds.
    pub time_ms: i64,
}
