//! Aggregator: receives detections from edge relays, persists them, and
//! pushes the tracked-species list back out to every edge.

pub mod inbound;
pub mod routes;
pub mod settings;
pub mod store;
pub mod watcher;
