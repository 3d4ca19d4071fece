//! Edge relay: camera-adjacent process that filters detections and forwards
//! them to the aggregator, and accepts tracked-species updates in return.

pub mod authorizer;
pub mod codec;
pub mod filter;
pub mod ingress;
pub mod relay;
pub mod routes;
pub mod settings;
