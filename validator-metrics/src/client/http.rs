//! HTTP-based REST source.
//!
//! [`HttpSource`] talks to a Cosmos SDK node's gRPC-gateway REST API (or to
//! a chain registry, which serves plain JSON documents the same way). It
//! only knows how to `GET` a path and hand back the decoded JSON body; all
//! interpretation happens in [`crate::client::ChainClient`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{ClientError, RestSource};

/// Longest error body kept in [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// HTTP REST source backed by `reqwest`.
///
/// The client is `Send + Sync`, pools connections, and applies the
/// configured per-request timeout to every call.
#[derive(Clone, Debug)]
pub struct HttpSource {
    base_url: String,
    client: Client,
}

impl HttpSource {
    /// Constructs a source rooted at `base_url`, e.g.
    /// `"https://rest.cosmos.directory/cosmoshub"`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                url: base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        // Avoid accidental double slashes.
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl RestSource for HttpSource {
    async fn get_json(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.endpoint(path);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                ClientError::Decode {
                    url: url.clone(),
                    message: e.to_string(),
                }
            } else {
                ClientError::Transport {
                    url: url.clone(),
                    message: e.to_string(),
                }
            }
        })
    }
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}
