//! Tracked-species filter applied before events enter the upstream queue.
//!
//! The list lives behind a `watch` channel: the config receiver replaces it
//! wholesale, the ingress path reads the latest snapshot. Readers may see
//! the previous list while a replacement is in progress.

use std::sync::Arc;

use relay_core::{DetectionEvent, TrackedSpecies};
use tokio::sync::watch;
use tracing::info;

/// Read side, used by the ingress path.
#[derive(Debug, Clone)]
pub struct EdgeFilter {
    tracked: watch::Receiver<TrackedSpecies>,
}

/// Write side, used by the config receiver.
#[derive(Debug, Clone)]
pub struct SpeciesUpdater {
    tracked: Arc<watch::Sender<TrackedSpecies>>,
}

impl EdgeFilter {
    pub fn new(initial: TrackedSpecies) -> (Self, SpeciesUpdater) {
        let (tx, rx) = watch::channel(initial);
        (
            Self { tracked: rx },
            SpeciesUpdater {
                tracked: Arc::new(tx),
            },
        )
    }

    /// `true` if the event's species is matched by the current list.
    pub fn admits(&self, event: &DetectionEvent) -> bool {
        self.tracked.borrow().matches(&event.species)
    }

    pub fn snapshot(&self) -> TrackedSpecies {
        self.tracked.borrow().clone()
    }
}

impl SpeciesUpdater {
    /// Replace the whole list; nothing is merged.
    pub fn replace(&self, list: TrackedSpecies) {
        info!(species = ?list.names(), "tracked species replaced");
        self.tracked.send_replace(list);
    }
}
