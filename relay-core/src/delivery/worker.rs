//! The single-flight delivery loop behind a [`DeliveryQueue`](super::DeliveryQueue).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{BackoffSchedule, DeliveryConfig, PendingBuffer};
use crate::error::DeliveryError;
use crate::transport::DeliveryTransport;

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Delivered,
    /// The head stays in place; `failures` is the counter after this
    /// failure and `delay` the backoff that was slept.
    Failed { failures: usize, delay: Duration },
}

pub struct DeliveryWorker<P, T: ?Sized> {
    intake: mpsc::Receiver<P>,
    target: Arc<str>,
    transport: Arc<T>,
    buffer: PendingBuffer<P>,
    failures: usize,
    attempt_timeout: Duration,
    backoff: BackoffSchedule,
}

impl<P, T> DeliveryWorker<P, T>
where
    P: Send + Sync + 'static,
    T: DeliveryTransport<P> + ?Sized + 'static,
{
    pub fn new(
        intake: mpsc::Receiver<P>,
        target: Arc<str>,
        transport: Arc<T>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            intake,
            target,
            transport,
            buffer: PendingBuffer::with_capacity(config.buffer_capacity()),
            failures: 0,
            attempt_timeout: config.attempt_timeout,
            backoff: config.backoff,
        }
    }

    /// Deliver for as long as any producer handle is alive. The binaries keep
    /// their handles for the process lifetime, so in practice this runs
    /// indefinitely; returning once every handle is dropped and the buffer
    /// is empty lets tests await a drained worker.
    pub async fn run(mut self) {
        info!(peer = %self.target, capacity = self.buffer.capacity(), "delivery worker started");
        while self.step().await.is_some() {}
        info!(peer = %self.target, "intake closed, delivery worker stopped");
    }

    /// Fill the buffer, attempt the head once and sleep out the backoff on
    /// failure. Returns `None` once there is nothing left to deliver.
    pub async fn step(&mut self) -> Option<Attempt> {
        if !self.fill().await {
            return None;
        }
        let attempt = self.attempt_head().await?;
        if let Attempt::Failed { delay, .. } = attempt {
            tokio::time::sleep(delay).await;
        }
        Some(attempt)
    }

    /// Payloads waiting for delivery, head first.
    pub fn pending(&self) -> impl Iterator<Item = &P> {
        self.buffer.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    async fn fill(&mut self) -> bool {
        if self.buffer.is_empty() {
            match self.intake.recv().await {
                Some(payload) => self.admit(payload),
                None => return false,
            }
        } else {
            // Never blocks: whatever arrives after this sees the next iteration.
            while let Ok(payload) = self.intake.try_recv() {
                self.admit(payload);
            }
        }
        true
    }

    fn admit(&mut self, payload: P) {
        if self.buffer.push(payload).is_some() {
            warn!(
                peer = %self.target,
                capacity = self.buffer.capacity(),
                "buffer full, dropped oldest pending payload"
            );
        }
    }

    async fn attempt_head(&mut self) -> Option<Attempt> {
        let head = self.buffer.head()?;
        let result = tokio::time::timeout(
            self.attempt_timeout,
            self.transport.deliver(&self.target, head),
        )
        .await
        .unwrap_or_else(|_| {
            Err(DeliveryError::Timeout {
                target: self.target.to_string(),
                timeout: self.attempt_timeout,
            })
        });

        match result {
            Ok(()) => {
                self.failures = 0;
                self.buffer.pop();
                debug!(peer = %self.target, remaining = self.buffer.len(), "payload delivered");
                Some(Attempt::Delivered)
            }
            Err(e) => {
                let delay = self.backoff.delay(self.failures);
                self.failures = self.backoff.advance(self.failures);
                warn!(
                    peer = %self.target,
                    error = %e,
                    failures = self.failures,
                    retry_in_ms = delay.as_millis() as u64,
                    "delivery failed, head kept for retry"
                );
                Some(Attempt::Failed {
                    failures: self.failures,
                    delay,
                })
            }
        }
    }
}
