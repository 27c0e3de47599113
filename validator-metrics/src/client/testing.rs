//! In-memory [`RestSource`] for tests.
//!
//! Serves canned responses per exact path (query string included), records
//! every requested path, and can delay every answer to widen race windows.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{ClientError, RestSource};

pub(crate) const WALLET: &str = "cosmos1wallet";
pub(crate) const OPERATOR: &str = "cosmosvaloper1operator";
pub(crate) const CONSENSUS: &str = "cosmosvalcons1consensus";

#[derive(Clone, Debug)]
pub(crate) enum FakeResponse {
    Json(Value),
    Status(u16, String),
    Transport,
    /// A 200 whose body is not JSON.
    Garbage,
}

#[derive(Default)]
pub(crate) struct FakeSource {
    routes: Mutex<HashMap<String, FakeResponse>>,
    calls: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, path: &str, body: Value) -> Self {
        self.set(path, FakeResponse::Json(body));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set(&self, path: &str, response: FakeResponse) {
        self.routes
            .lock()
            .expect("routes lock")
            .insert(path.to_string(), response);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl RestSource for FakeSource {
    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        self.calls.lock().expect("calls lock").push(path.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.routes.lock().expect("routes lock").get(path).cloned();
        let url = format!("fake://{path}");
        match response {
            Some(FakeResponse::Json(body)) => Ok(body),
            Some(FakeResponse::Status(status, body)) => Err(ClientError::Status { url, status, body }),
            Some(FakeResponse::Transport) => Err(ClientError::Transport {
                url,
                message: "connection reset".to_string(),
            }),
            Some(FakeResponse::Garbage) => Err(ClientError::Decode {
                url,
                message: "expected value at line 1 column 1".to_string(),
            }),
            None => Err(ClientError::Status {
                url,
                status: 501,
                body: "Not Implemented".to_string(),
            }),
        }
    }
}

pub(crate) fn proposals_path(version: &str) -> String {
    format!("/cosmos/gov/{version}/proposals?pagination.limit=200&pagination.reverse=true")
}

pub(crate) fn bonded_set_path() -> String {
    "/cosmos/staking/v1beta1/validators?status=BOND_STATUS_BONDED&pagination.limit=400".to_string()
}

/// A node where every query the exporter makes succeeds.
pub(crate) fn healthy_node() -> FakeSource {
    FakeSource::new()
        .with_json(
            &format!("/cosmos/slashing/v1beta1/signing_infos/{CONSENSUS}"),
            json!({"val_signing_info": {
                "address": CONSENSUS,
                "start_height": "0",
                "missed_blocks_counter": "12"
            }}),
        )
        .with_json(
            "/cosmos/slashing/v1beta1/params",
            json!({"params": {
                "signed_blocks_window": "10000",
                "min_signed_per_window": "0.050000000000000000",
                "downtime_jail_duration": "600s"
            }}),
        )
        .with_json(
            &format!("/cosmos/bank/v1beta1/balances/{WALLET}"),
            json!({"balances": [
                {"denom": "ibc/27394FB0", "amount": "5"},
                {"denom": "uatom", "amount": "1999999999"}
            ], "pagination": {"next_key": null, "total": "2"}}),
        )
        .with_json(
            &format!("/cosmos/distribution/v1beta1/validators/{OPERATOR}/commission"),
            json!({"commission": {"commission": [
                {"denom": "uatom", "amount": "3500000.250000000000000000"}
            ]}}),
        )
        .with_json(
            &format!("/cosmos/distribution/v1beta1/delegators/{WALLET}/rewards"),
            json!({
                "rewards": [
                    {"validator_address": OPERATOR, "reward": [
                        {"denom": "uatom", "amount": "700000.600000000000000000"}
                    ]},
                    {"validator_address": "cosmosvaloper1other", "reward": [
                        {"denom": "uatom", "amount": "300000.600000000000000000"},
                        {"denom": "uosmo", "amount": "5.000000000000000000"}
                    ]}
                ],
                "total": [{"denom": "uatom", "amount": "1000001.200000000000000000"}]
            }),
        )
        .with_json(
            "/cosmos/base/tendermint/v1beta1/blocks/latest",
            json!({"block": {"header": {
                "chain_id": "cosmoshub-4",
                "height": "19000000",
                "time": "2024-05-01T12:00:00.5Z"
            }}}),
        )
        .with_json(
            &format!("/cosmos/staking/v1beta1/validators/{OPERATOR}"),
            json!({"validator": {
                "operator_address": OPERATOR,
                "jailed": false,
                "status": "BOND_STATUS_BONDED",
                "tokens": "300000000"
            }}),
        )
        .with_json(
            "/cosmos/staking/v1beta1/params",
            json!({"params": {"max_validators": 180, "bond_denom": "uatom"}}),
        )
        .with_json(
            &bonded_set_path(),
            json!({"validators": [
                {"operator_address": "cosmosvaloper1small", "jailed": false,
                 "status": "BOND_STATUS_BONDED", "tokens": "100000000"},
                {"operator_address": OPERATOR, "jailed": false,
                 "status": "BOND_STATUS_BONDED", "tokens": "300000000"},
                {"operator_address": "cosmosvaloper1mid", "jailed": false,
                 "status": "BOND_STATUS_BONDED", "tokens": "200000000"}
            ]}),
        )
        .with_json(
            &proposals_path("v1beta1"),
            json!({"proposals": [
                {
                    "proposal_id": "42",
                    "content": {"@type": "/cosmos.gov.v1beta1.TextProposal",
                                "title": "Raise max validators"},
                    "status": "PROPOSAL_STATUS_VOTING_PERIOD",
                    "voting_start_time": "2024-05-01T00:00:00Z",
                    "voting_end_time": "2024-05-15T00:00:00Z"
                },
                {
                    "proposal_id": "41",
                    "content": {"@type": "/cosmos.params.v1beta1.ParameterChangeProposal"},
                    "status": "PROPOSAL_STATUS_DEPOSIT_PERIOD",
                    "voting_start_time": "0001-01-01T00:00:00Z",
                    "voting_end_time": "0001-01-01T00:00:00Z"
                },
                {
                    "proposal_id": "40",
                    "content": {"title": "Already decided"},
                    "status": "PROPOSAL_STATUS_PASSED",
                    "voting_start_time": "2024-04-01T00:00:00Z",
                    "voting_end_time": "2024-04-15T00:00:00Z"
                }
            ]}),
        )
        .with_json(
            &format!("/cosmos/gov/v1beta1/proposals/42/votes/{WALLET}"),
            json!({"vote": {
                "proposal_id": "42",
                "voter": WALLET,
                "option": "VOTE_OPTION_YES",
                "options": [{"option": "VOTE_OPTION_YES", "weight": "1.000000000000000000"}]
            }}),
        )
}
