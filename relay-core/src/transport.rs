//! Request/response transport used by delivery workers.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

use crate::error::DeliveryError;
use crate::model::EXCHANGE_PATH;

/// One request/response exchange against a peer.
///
/// Implementations make exactly one attempt per call. Retrying, backoff and
/// the per-attempt timeout belong to the [`DeliveryWorker`](crate::DeliveryWorker).
#[async_trait]
pub trait DeliveryTransport<P: Sync>: Send + Sync {
    async fn deliver(&self, target: &str, payload: &P) -> Result<(), DeliveryError>;
}

/// POSTs the payload as JSON to `http://{target}{path}`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    path: String,
}

impl HttpTransport {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            path: path.into(),
        }
    }

    fn url(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            format!("{}{}", target.trim_end_matches('/'), self.path)
        } else {
            format!("http://{}{}", target, self.path)
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(EXCHANGE_PATH)
    }
}

#[async_trait]
impl<P> DeliveryTransport<P> for HttpTransport
where
    P: Serialize + Sync,
{
    async fn deliver(&self, target: &str, payload: &P) -> Result<(), DeliveryError> {
        let body = serde_json::to_vec(payload)?;
        let resp = self
            .client
            .post(self.url(target))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|source| DeliveryError::Request {
                target: target.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DeliveryError::Status {
                target: target.to_string(),
                status: status.as_u16(),
            });
        }

        let text = resp.text().await.unwrap_or_default();
        debug!(peer = target, response = %text, "peer acknowledged payload");
        Ok(())
    }
}
