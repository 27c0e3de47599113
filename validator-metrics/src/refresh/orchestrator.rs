//! Scrape-driven metric refresh.
//!
//! A cycle clears the registry, fetches everything from the chain data
//! client, publishes what succeeded, and takes a snapshot. The whole cycle
//! holds a single mutex, so no scrape can observe or produce a registry
//! mixing two cycles. Scrapes that arrive while a cycle is running wait for
//! that cycle's snapshot instead of queueing a cycle of their own, which
//! keeps every response within one scrape deadline.

use std::future::Future;
use std::sync::{Arc, PoisonError};

use thiserror::Error;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::client::{ChainClient, ClientError, Denomination, RestSource};
use crate::config::{RefreshConfig, Settings};
use crate::metrics::{Gauge, GaugeSample, MetricsRegistry, RegistryError};
use crate::types::{ProposalRecord, ValidatorStatus};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("failed to render metrics: {0}")]
    Render(String),

    #[error("refresh task ended without a result")]
    Aborted,
}

impl From<RegistryError> for ScrapeError {
    fn from(e: RegistryError) -> Self {
        ScrapeError::Render(e.to_string())
    }
}

type CycleResult = Option<Result<String, ScrapeError>>;

/// Clears the in-flight slot when the cycle task ends, even by panic.
struct InFlightGuard<'a>(&'a std::sync::Mutex<Option<watch::Receiver<CycleResult>>>);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Summary of one refresh cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Samples written to the registry.
    pub published: usize,
    /// Metrics skipped because their fetch failed.
    pub failed: Vec<&'static str>,
}

/// Result of one cycle: the exposition text and what went into it.
#[derive(Clone, Debug)]
pub struct Scrape {
    pub body: String,
    pub report: CycleReport,
}

/// Fetch result for one logical metric.
struct Outcome {
    metric: &'static str,
    /// Address the metric was fetched for, for logging.
    subject: Option<String>,
    result: Result<Vec<GaugeSample>, ClientError>,
}

impl Outcome {
    fn new(
        metric: &'static str,
        subject: Option<&str>,
        result: Result<Vec<GaugeSample>, ClientError>,
    ) -> Self {
        Self {
            metric,
            subject: subject.map(str::to_string),
            result,
        }
    }
}

/// Owns the chain client and the registry, and serializes refresh cycles.
pub struct MetricRefresher<S> {
    client: ChainClient<S>,
    registry: MetricsRegistry,
    settings: Settings,
    config: RefreshConfig,
    cycle: Mutex<()>,
    /// Result channel of the cycle currently running, if any.
    in_flight: std::sync::Mutex<Option<watch::Receiver<CycleResult>>>,
}

impl<S> MetricRefresher<S>
where
    S: RestSource + 'static,
{
    pub fn new(
        client: ChainClient<S>,
        registry: MetricsRegistry,
        settings: Settings,
        config: RefreshConfig,
    ) -> Self {
        Self {
            client,
            registry,
            settings,
            config,
            cycle: Mutex::new(()),
            in_flight: std::sync::Mutex::new(None),
        }
    }

    pub fn client(&self) -> &ChainClient<S> {
        &self.client
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// `Content-Type` of the scrape body.
    pub fn content_type(&self) -> String {
        self.registry.content_type()
    }

    /// Returns the exposition text of a complete cycle.
    ///
    /// Starts a cycle unless one is already running, in which case the
    /// caller gets that cycle's snapshot. The cycle runs on its own task: if
    /// every caller is dropped (the HTTP clients went away) it still
    /// completes and leaves the registry consistent.
    pub async fn scrape(self: Arc<Self>) -> Result<String, ScrapeError> {
        let mut rx = self.join_or_start_cycle();
        let result = match rx.wait_for(Option::is_some).await {
            Ok(done) => done.clone(),
            Err(_) => None,
        };
        result.unwrap_or(Err(ScrapeError::Aborted))
    }

    fn join_or_start_cycle(self: &Arc<Self>) -> watch::Receiver<CycleResult> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(rx) = in_flight.as_ref() {
            debug!("joining in-flight refresh cycle");
            return rx.clone();
        }

        let (tx, rx) = watch::channel(None);
        *in_flight = Some(rx.clone());

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let result = {
                let _slot = InFlightGuard(&this.in_flight);
                this.refresh_and_snapshot()
                    .await
                    .map(|scrape| scrape.body)
                    .map_err(ScrapeError::from)
            };
            let _ = tx.send(Some(result));
        });
        rx
    }

    /// Clear, fetch, publish and snapshot under the cycle lock.
    pub async fn refresh_and_snapshot(&self) -> Result<Scrape, RegistryError> {
        let _cycle = self.cycle.lock().await;
        let started = Instant::now();

        self.registry.clear();
        let outcomes = self.fetch_all().await;
        let report = self.publish(outcomes);
        let body = self.registry.snapshot()?;

        debug!(
            published = report.published,
            failed = report.failed.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "refresh cycle complete"
        );
        Ok(Scrape { body, report })
    }

    async fn fetch_all(&self) -> Vec<Outcome> {
        let deadline = Instant::now() + self.config.scrape_deadline;

        let (missed, slashing, balance, commission, rewards, block, max_validators, validator, governance) = tokio::join!(
            self.missed_blocks(deadline),
            self.slashing_params(deadline),
            self.balance(deadline),
            self.commission(deadline),
            self.rewards(deadline),
            self.latest_block(deadline),
            self.max_validators(deadline),
            self.validator_group(deadline),
            self.governance_group(deadline),
        );

        let mut outcomes = vec![missed, balance, commission, rewards, max_validators];
        outcomes.extend(slashing);
        outcomes.extend(block);
        outcomes.extend(validator);
        outcomes.extend(governance);
        outcomes
    }

    fn publish(&self, outcomes: Vec<Outcome>) -> CycleReport {
        let mut report = CycleReport::default();

        for outcome in outcomes {
            match outcome.result {
                Ok(samples) => {
                    for sample in samples {
                        match self.registry.set(&sample) {
                            Ok(()) => report.published += 1,
                            Err(e) => error!(
                                metric = outcome.metric,
                                error = %e,
                                "registry rejected sample"
                            ),
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        metric = outcome.metric,
                        address = outcome.subject.as_deref().unwrap_or("-"),
                        error = %e,
                        "skipping metric this cycle"
                    );
                    report.failed.push(outcome.metric);
                }
            }
        }

        report
    }

    // ---------------------------
    // Independent metrics
    // ---------------------------

    async fn missed_blocks(&self, deadline: Instant) -> Outcome {
        let address = self.settings.consensus_address.as_deref();
        let result: Result<Vec<GaugeSample>, ClientError> = async {
            let address = required(address, "consensus_address")?;
            let missed = bounded(deadline, self.client.missed_blocks(address)).await?;
            Ok(vec![GaugeSample::new(
                Gauge::MissedBlocks,
                [address],
                missed as f64,
            )])
        }
        .await;
        Outcome::new("missed_blocks", address, result)
    }

    async fn slashing_params(&self, deadline: Instant) -> Vec<Outcome> {
        match bounded(deadline, self.client.slashing_params()).await {
            Ok(params) => vec![
                Outcome::new(
                    "signed_blocks_window",
                    None,
                    Ok(vec![GaugeSample::unlabeled(
                        Gauge::SignedBlocksWindow,
                        params.signed_blocks_window as f64,
                    )]),
                ),
                Outcome::new(
                    "min_signed_per_window",
                    None,
                    Ok(vec![GaugeSample::unlabeled(
                        Gauge::MinSignedPerWindow,
                        params.min_signed_per_window,
                    )]),
                ),
            ],
            Err(e) => vec![
                Outcome::new("signed_blocks_window", None, Err(e.clone())),
                Outcome::new("min_signed_per_window", None, Err(e)),
            ],
        }
    }

    async fn balance(&self, deadline: Instant) -> Outcome {
        let address = self.settings.wallet_address.as_deref();
        let result: Result<Vec<GaugeSample>, ClientError> = async {
            let address = required(address, "wallet_address")?;
            let denom = self.denomination()?;
            let amount = bounded(deadline, self.client.balance(address, &denom)).await?;
            Ok(vec![GaugeSample::new(
                Gauge::WalletBalance,
                [address],
                amount as f64,
            )])
        }
        .await;
        Outcome::new("wallet_balance", address, result)
    }

    async fn commission(&self, deadline: Instant) -> Outcome {
        let address = self.settings.operator_address.as_deref();
        let result: Result<Vec<GaugeSample>, ClientError> = async {
            let address = required(address, "operator_address")?;
            let denom = self.denomination()?;
            let amount = bounded(deadline, self.client.commission(address, &denom)).await?;
            Ok(vec![GaugeSample::new(
                Gauge::AvailableCommission,
                [address],
                amount as f64,
            )])
        }
        .await;
        Outcome::new("available_commission", address, result)
    }

    async fn rewards(&self, deadline: Instant) -> Outcome {
        let address = self.settings.wallet_address.as_deref();
        let result: Result<Vec<GaugeSample>, ClientError> = async {
            let address = required(address, "wallet_address")?;
            let denom = self.denomination()?;
            let amount = bounded(deadline, self.client.rewards(address, &denom)).await?;
            Ok(vec![GaugeSample::new(
                Gauge::AvailableRewards,
                [address],
                amount as f64,
            )])
        }
        .await;
        Outcome::new("available_rewards", address, result)
    }

    async fn latest_block(&self, deadline: Instant) -> Vec<Outcome> {
        match bounded(deadline, self.client.latest_block()).await {
            Ok(block) => vec![
                Outcome::new(
                    "latest_block_time",
                    None,
                    Ok(vec![GaugeSample::unlabeled(
                        Gauge::LatestBlockTime,
                        block.time_ms as f64,
                    )]),
                ),
                Outcome::new(
                    "latest_block_height",
                    None,
                    Ok(vec![GaugeSample::unlabeled(
                        Gauge::LatestBlockHeight,
                        block.height as f64,
                    )]),
                ),
            ],
            Err(e) => vec![
                Outcome::new("latest_block_time", None, Err(e.clone())),
                Outcome::new("latest_block_height", None, Err(e)),
            ],
        }
    }

    async fn max_validators(&self, deadline: Instant) -> Outcome {
        let result = bounded(deadline, self.client.max_validators())
            .await
            .map(|max| vec![GaugeSample::unlabeled(Gauge::MaxValidators, max as f64)]);
        Outcome::new("max_validators", None, result)
    }

    // ---------------------------
    // Dependent groups
    // ---------------------------

    /// Bond, active and jailed come from one validator query; rank needs the
    /// bonded set only when the validator is bonded.
    async fn validator_group(&self, deadline: Instant) -> Vec<Outcome> {
        const METRICS: [&str; 4] = [
            "bonded_tokens",
            "validator_active",
            "validator_jailed",
            "validator_rank",
        ];

        let address = self.settings.operator_address.as_deref();
        let fetched: Result<(&str, ValidatorStatus), ClientError> = async {
            let address = required(address, "operator_address")?;
            let status = bounded(deadline, self.client.validator(address)).await?;
            Ok((address, status))
        }
        .await;

        let (address, status) = match fetched {
            Ok(found) => found,
            Err(e) => {
                return METRICS
                    .iter()
                    .map(|&metric| Outcome::new(metric, address, Err(e.clone())))
                    .collect();
            }
        };

        let bonded_tokens = status
            .tokens
            .scaled(self.settings.exponent())
            .map(|tokens| vec![GaugeSample::new(Gauge::BondedTokens, [address], tokens as f64)])
            .map_err(|source| ClientError::InvalidAmount {
                field: "validator.tokens",
                source,
            });

        let rank = if status.bonded {
            bounded(deadline, self.client.bonded_rank(address)).await
        } else {
            Ok(0)
        };

        vec![
            Outcome::new(METRICS[0], Some(address), bonded_tokens),
            Outcome::new(
                METRICS[1],
                Some(address),
                Ok(vec![GaugeSample::new(
                    Gauge::ValidatorActive,
                    [address],
                    flag(status.bonded),
                )]),
            ),
            Outcome::new(
                METRICS[2],
                Some(address),
                Ok(vec![GaugeSample::new(
                    Gauge::ValidatorJailed,
                    [address],
                    flag(status.jailed),
                )]),
            ),
            Outcome::new(
                METRICS[3],
                Some(address),
                rank.map(|r| vec![GaugeSample::new(Gauge::ValidatorRank, [address], r as f64)]),
            ),
        ]
    }

    /// Proposals are listed first; votes are looked up per voting-period
    /// proposal once the list is known. Without a wallet address the
    /// proposals are still published.
    async fn governance_group(&self, deadline: Instant) -> Vec<Outcome> {
        let wallet = self.settings.wallet_address.as_deref();

        let (listing, vote_error) = match required(wallet, "wallet_address") {
            Ok(wallet) => (bounded(deadline, self.client.address_votes(wallet)).await, None),
            Err(e) => (bounded(deadline, self.client.active_proposals()).await, Some(e)),
        };

        let proposals = match listing {
            Ok(proposals) => proposals,
            Err(e) => {
                return vec![
                    Outcome::new("governance_proposals", None, Err(e.clone())),
                    Outcome::new("governance_votes", wallet, Err(e)),
                ];
            }
        };

        let votes = match (vote_error, wallet) {
            (None, Some(wallet)) => Ok(vote_samples(&proposals, wallet)),
            (Some(e), _) => Err(e),
            (None, None) => Err(ClientError::MissingSetting("wallet_address")),
        };

        vec![
            Outcome::new("governance_proposals", None, Ok(proposal_samples(&proposals))),
            Outcome::new("governance_votes", wallet, votes),
        ]
    }

    fn denomination(&self) -> Result<Denomination, ClientError> {
        let denom = required(self.settings.denom.as_deref(), "denom")?;
        Ok(Denomination {
            denom: denom.to_string(),
            exponent: self.settings.exponent(),
        })
    }
}

fn required<'a>(value: Option<&'a str>, setting: &'static str) -> Result<&'a str, ClientError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ClientError::MissingSetting(setting))
}

/// Runs `fut` unless the scrape deadline passes first.
async fn bounded<T, F>(deadline: Instant, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::time::timeout_at(deadline, fut)
        .await
        .unwrap_or(Err(ClientError::DeadlineExceeded))
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

fn proposal_samples(proposals: &[ProposalRecord]) -> Vec<GaugeSample> {
    let mut samples = Vec::with_capacity(proposals.len() * 3);
    for p in proposals {
        let labels = [p.id.to_string(), p.title.clone(), p.status.as_label().to_string()];
        samples.push(GaugeSample::new(Gauge::ActiveProposal, labels.clone(), 1.0));
        if let Some(start) = p.voting_start_ms {
            samples.push(GaugeSample::new(
                Gauge::ProposalVotingStart,
                labels.clone(),
                start as f64,
            ));
        }
        if let Some(end) = p.voting_end_ms {
            samples.push(GaugeSample::new(Gauge::ProposalVotingEnd, labels, end as f64));
        }
    }
    samples
}

fn vote_samples(proposals: &[ProposalRecord], wallet: &str) -> Vec<GaugeSample> {
    proposals
        .iter()
        .filter_map(|p| {
            let vote = p.vote?;
            Some(GaugeSample::new(
                Gauge::GovernanceVote,
                [p.id.to_string(), wallet.to_string(), vote.as_label().to_string()],
                vote.code() as f64,
            ))
        })
        .collect()
}
