//! Camera frame → upstream queue pipeline.

use relay_core::{DeliveryError, DeliveryQueue, DetectionEvent};
use tracing::{debug, warn};

use crate::codec;
use crate::filter::EdgeFilter;

/// What happened to one camera frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Forwarded,
    /// Species not tracked; discarded without touching the queue.
    Filtered,
    /// Undecodable frame; logged and dropped.
    Malformed,
}

/// Decodes frames, stamps the relay's device id, filters by species and
/// feeds the upstream delivery queue.
#[derive(Clone)]
pub struct EdgeRelay {
    device_id: i64,
    filter: EdgeFilter,
    upstream: DeliveryQueue<DetectionEvent>,
}

impl EdgeRelay {
    pub fn new(device_id: i64, filter: EdgeFilter, upstream: DeliveryQueue<DetectionEvent>) -> Self {
        Self {
            device_id,
            filter,
            upstream,
        }
    }

    /// Push one frame through the pipeline. Suspends only when the upstream
    /// intake is saturated; fails only when the upstream worker is gone.
    pub async fn handle_frame(&self, bytes: &[u8]) -> Result<FrameOutcome, DeliveryError> {
        let event = match codec::decode(bytes) {
            Ok(event) => event.stamped(self.device_id),
            Err(e) => {
                warn!(error = %e, "dropping undecodable camera frame");
                return Ok(FrameOutcome::Malformed);
            }
        };

        if !self.filter.admits(&event) {
            debug!(species = %event.species, "species not tracked, frame discarded");
            return Ok(FrameOutcome::Filtered);
        }

        debug!(species = %event.species, upstream = self.upstream.target(), "forwarding detection");
        self.upstream.enqueue(event).await?;
        Ok(FrameOutcome::Forwarded)
    }
}
