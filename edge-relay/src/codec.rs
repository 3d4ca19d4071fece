//! Camera frame codec.
//!
//! Decodes JSON-encoded detection frames sent by the camera over UDP.

use relay_core::DetectionEvent;
use thiserror::Error;

/// Largest datagram the ingress reads; matches a typical Ethernet MTU.
pub const MAX_FRAME_SIZE: usize = 1500;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("detected_object is empty")]
    EmptySpecies,
    #[error("temperature is not a finite number")]
    InvalidTemperature,
}

/// Decode a UDP payload into a [`DetectionEvent`].
///
/// Camera frames carry no identifiers; `detection_id` and `device_uuid`
/// default to zero and are overwritten later.
pub fn decode(bytes: &[u8]) -> Result<DetectionEvent, DecodeError> {
    let event: DetectionEvent = serde_json::from_slice(bytes)?;

    if event.species.trim().is_empty() {
        return Err(DecodeError::EmptySpecies);
    }
    if !event.temperature.is_finite() {
        return Err(DecodeError::InvalidTemperature);
    }

    Ok(event)
}
