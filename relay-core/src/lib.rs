//! Shared building blocks for the WildFog edge relay and aggregator.
//!
//! Both binaries exchange two kinds of payloads over HTTP:
//! detection events travelling upstream (edge → aggregator) and
//! tracked-species lists travelling downstream (aggregator → every edge).
//! Each direction is carried by one [`DeliveryQueue`] per peer: a bounded,
//! drop-oldest, single-flight store-and-forward queue with a fixed backoff
//! schedule.

pub mod delivery;
pub mod env;
pub mod error;
pub mod model;
pub mod transport;

pub use delivery::{BackoffSchedule, DeliveryConfig, DeliveryQueue, DeliveryWorker};
pub use error::DeliveryError;
pub use model::{DetectionEvent, TrackedSpecies};
pub use transport::{DeliveryTransport, HttpTransport};
