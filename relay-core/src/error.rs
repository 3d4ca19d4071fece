//! Delivery error type.

use std::time::Duration;

use thiserror::Error;

/// Why a single delivery attempt (or an enqueue) did not go through.
///
/// Every variant except [`DeliveryError::Closed`] is retryable from the
/// queue's point of view.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request to {target} failed: {source}")]
    Request {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{target} answered with status {status}")]
    Status { target: String, status: u16 },
    #[error("no answer from {target} within {timeout:?}")]
    Timeout { target: String, timeout: Duration },
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("delivery queue for {0} is closed")]
    Closed(String),
}
