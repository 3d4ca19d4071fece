//! Store-and-forward delivery queue.
//!
//! A [`DeliveryQueue`] is the producer-side handle: a clone-able sender into
//! a bounded intake channel. Its [`DeliveryWorker`] owns the working buffer
//! and the failure counter, and is the only place a delivery attempt is ever
//! made, so at most one request per peer is in flight.
//!
//! ```text
//! enqueue ──► intake (25) ──► PendingBuffer (N+1, drop-oldest) ──► transport
//!                                  ▲                                   │
//!                                  └──── head kept, backoff sleep ◄────┘ on failure
//! ```

mod backoff;
mod buffer;
mod worker;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::error::DeliveryError;
use crate::transport::DeliveryTransport;

pub use backoff::{BackoffSchedule, ScheduleError, MIN_STEPS};
pub use buffer::PendingBuffer;
pub use worker::{Attempt, DeliveryWorker};

/// Default number of payloads kept pending besides the head.
pub const DEFAULT_MAX_PENDING: usize = 10;
/// Default capacity of the intake channel in front of the working buffer.
pub const DEFAULT_INTAKE_CAPACITY: usize = 25;
/// Default upper bound for a single delivery attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Tuning for one delivery queue.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// `N`: the working buffer holds `N + 1` payloads.
    pub max_pending: usize,
    pub intake_capacity: usize,
    pub attempt_timeout: Duration,
    pub backoff: BackoffSchedule,
}

impl DeliveryConfig {
    /// Edge → aggregator defaults.
    pub fn upstream() -> Self {
        Self {
            backoff: BackoffSchedule::upstream(),
            ..Self::base()
        }
    }

    /// Aggregator → edge defaults.
    pub fn downstream() -> Self {
        Self {
            backoff: BackoffSchedule::downstream(),
            ..Self::base()
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffSchedule) -> Self {
        self.backoff = backoff;
        self
    }

    fn base() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backoff: BackoffSchedule::default(),
        }
    }

    pub fn buffer_capacity(&self) -> usize {
        self.max_pending + 1
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self::upstream()
    }
}

/// Producer handle of a per-peer delivery queue.
pub struct DeliveryQueue<P> {
    target: Arc<str>,
    intake: mpsc::Sender<P>,
}

impl<P> Clone for DeliveryQueue<P> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
            intake: self.intake.clone(),
        }
    }
}

impl<P> DeliveryQueue<P>
where
    P: Send + Sync + 'static,
{
    /// Create the handle and the raw intake receiver without starting a
    /// worker.
    pub fn channel(target: impl Into<Arc<str>>, intake_capacity: usize) -> (Self, mpsc::Receiver<P>) {
        let (intake, rx) = mpsc::channel(intake_capacity);
        (
            Self {
                target: target.into(),
                intake,
            },
            rx,
        )
    }

    /// Create the handle together with its (not yet running) worker.
    pub fn new<T>(
        target: impl Into<Arc<str>>,
        transport: Arc<T>,
        config: DeliveryConfig,
    ) -> (Self, DeliveryWorker<P, T>)
    where
        T: DeliveryTransport<P> + ?Sized + 'static,
    {
        let (queue, rx) = Self::channel(target, config.intake_capacity);
        let worker = DeliveryWorker::new(rx, Arc::clone(&queue.target), transport, config);
        (queue, worker)
    }

    /// Create the queue and run its worker on the current runtime.
    pub fn spawn<T>(target: impl Into<Arc<str>>, transport: Arc<T>, config: DeliveryConfig) -> Self
    where
        T: DeliveryTransport<P> + ?Sized + 'static,
    {
        let (queue, worker) = Self::new(target, transport, config);
        tokio::spawn(worker.run());
        queue
    }

    /// Hand a payload to the worker. Suspends only while the intake channel
    /// is full.
    pub async fn enqueue(&self, payload: P) -> Result<(), DeliveryError> {
        self.intake
            .send(payload)
            .await
            .map_err(|_| DeliveryError::Closed(self.target.to_string()))
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}
