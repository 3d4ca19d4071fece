//! Fixed backoff schedule indexed by a saturating failure counter.

use std::time::Duration;

use thiserror::Error;

/// Fewest steps a schedule may have.
pub const MIN_STEPS: usize = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("backoff schedule needs at least 7 delays, got {0}")]
    TooShort(usize),
    #[error("backoff delays must strictly increase")]
    NotIncreasing,
}

/// Ordered list of retry delays.
///
/// The delay after the `n`-th consecutive failure is `delays[n]`, and the
/// counter never moves past the last index, so the cadence plateaus at the
/// largest delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffSchedule {
    delays: Vec<Duration>,
}

impl BackoffSchedule {
    pub fn new(delays: Vec<Duration>) -> Result<Self, ScheduleError> {
        if delays.len() < MIN_STEPS {
            return Err(ScheduleError::TooShort(delays.len()));
        }
        if delays.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ScheduleError::NotIncreasing);
        }
        Ok(Self { delays })
    }

    fn from_millis(ms: &[u64]) -> Self {
        Self {
            delays: ms.iter().copied().map(Duration::from_millis).collect(),
        }
    }

    /// 50 ms … 7 s, used by the edge for its upstream queue.
    pub fn upstream() -> Self {
        Self::from_millis(&[50, 250, 500, 1_000, 1_500, 4_000, 7_000])
    }

    /// 500 ms … 12 s, used by the aggregator for each edge queue.
    pub fn downstream() -> Self {
        Self::from_millis(&[500, 1_000, 1_500, 4_000, 7_000, 10_000, 12_000])
    }

    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    /// Highest valid failure index.
    pub fn last_index(&self) -> usize {
        self.delays.len() - 1
    }

    /// Delay to wait after `failures` consecutive failures.
    pub fn delay(&self, failures: usize) -> Duration {
        self.delays[failures.min(self.last_index())]
    }

    /// Counter value after one more failure.
    pub fn advance(&self, failures: usize) -> usize {
        (failures + 1).min(self.last_index())
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::upstream()
    }
}
