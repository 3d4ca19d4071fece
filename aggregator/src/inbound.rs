//! Inbound detection queue and its persistence worker.
//!
//! Request handlers only ever touch the [`InboundQueue`] handle; a single
//! worker task drains it in arrival order so database latency never holds up
//! an HTTP response beyond the channel's capacity.

use std::sync::Arc;

use relay_core::DetectionEvent;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::store::PersistenceClient;

/// Default channel capacity between request handlers and the worker.
pub const DEFAULT_INBOUND_CAPACITY: usize = 5;

#[derive(Clone)]
pub struct InboundQueue {
    tx: mpsc::Sender<DetectionEvent>,
}

impl InboundQueue {
    /// Start the persistence worker and return the handle feeding it.
    pub fn spawn(store: Arc<dyn PersistenceClient>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(persist(rx, store));
        Self { tx }
    }

    /// Queue an event for persistence. Suspends while the channel is full.
    pub async fn submit(&self, event: DetectionEvent) -> Result<(), SubmitError> {
        self.tx.send(event).await.map_err(|_| SubmitError)
    }
}

/// The persistence worker has stopped.
#[derive(Debug, thiserror::Error)]
#[error("persistence worker is no longer running")]
pub struct SubmitError;

async fn persist(mut rx: mpsc::Receiver<DetectionEvent>, store: Arc<dyn PersistenceClient>) {
    while let Some(event) = rx.recv().await {
        match store.insert(&event).await {
            Ok(id) => debug!(
                detection_id = id,
                device_id = event.device_id,
                species = event.species,
                "detection stored"
            ),
            Err(e) => warn!(
                error = %e,
                device_id = event.device_id,
                species = event.species,
                "failed to store detection, dropping it"
            ),
        }
    }
    info!("inbound queue closed, persistence worker exiting");
}
