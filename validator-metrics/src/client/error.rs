use thiserror::Error;

use crate::types::AmountError;

/// Errors returned by chain data client operations.
///
/// Every variant is local to one query: the refresh orchestrator skips the
/// affected metric for the cycle and keeps going.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// A setting the query needs (address, denom) was never configured.
    #[error("required setting `{0}` is not configured")]
    MissingSetting(&'static str),

    /// Connection, TLS or timeout failure before a response was received.
    #[error("HTTP GET {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The API answered with a non-success status.
    #[error("HTTP GET {url} returned status {status}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The body was not JSON or did not match the expected shape.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("field `{field}` is not a valid number: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid amount in `{field}`: {source}")]
    InvalidAmount {
        field: &'static str,
        #[source]
        source: AmountError,
    },

    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("denom {denom:?} not found in {resource}")]
    DenomNotFound {
        denom: String,
        resource: &'static str,
    },

    /// Neither governance API shape could be read.
    #[error("governance proposals unavailable (v1beta1: {legacy}; v1: {current})")]
    Governance {
        legacy: Box<ClientError>,
        current: Box<ClientError>,
    },

    #[error("scrape deadline exceeded")]
    DeadlineExceeded,
}

impl ClientError {
    /// `true` if the API should be considered unusable rather than merely
    /// erroring on one endpoint: the host is unreachable, rejects our
    /// credentials, or reports itself unavailable.
    pub fn is_unrecoverable(&self) -> bool {
        match self {
            ClientError::Transport { .. } => true,
            ClientError::Status { status, .. } => {
                matches!(status, 401 | 403 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// `true` for "no such record" answers.
    ///
    /// Older SDK versions report missing records as a 400/500 with a gRPC
    /// `NotFound` message in the body instead of a 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::Status { status: 404, .. } => true,
            ClientError::Status { body, .. } => body.to_ascii_lowercase().contains("not found"),
            _ => false,
        }
    }
}
