//! Wire model shared by the edge relay and the aggregator.

use serde::{Deserialize, Serialize};

/// Path that receives detection events on the aggregator and species lists
/// on every edge.
pub const EXCHANGE_PATH: &str = "/a";

/// One observation of an animal.
///
/// `detection_id` is assigned by the persistence layer; whatever value a
/// producer puts here is ignored at insert time. `device_id` is stamped by
/// the edge relay right before the event enters its upstream queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    #[serde(default)]
    pub detection_id: i64,
    /// Canonical name is `device_uuid`; `camera_uuid` is accepted on input.
    #[serde(rename = "device_uuid", alias = "camera_uuid", default)]
    pub device_id: i64,
    #[serde(rename = "detection_time")]
    pub detected_at: String,
    #[serde(rename = "detected_object", alias = "Detected_object")]
    pub species: String,
    pub temperature: f64,
}

impl DetectionEvent {
    /// Overwrite the device identifier with the relay's own.
    pub fn stamped(mut self, device_id: i64) -> Self {
        self.device_id = device_id;
        self
    }
}

/// Ordered list of species names the edges forward.
///
/// Serialised as a bare JSON array. Equality is order-sensitive, so a
/// reordering of the same names counts as a change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackedSpecies(Vec<String>);

impl TrackedSpecies {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// `true` when `species` contains any tracked name as a substring, so
    /// `"Brown Bear"` is matched by `"Bear"`.
    pub fn matches(&self, species: &str) -> bool {
        self.0.iter().any(|name| species.contains(name.as_str()))
    }
}

impl<S: Into<String>> FromIterator<S> for TrackedSpecies {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camera_frame_without_ids() {
        let event: DetectionEvent = serde_json::from_value(serde_json::json!({
            "detection_time": "2022-06-01 10:00:00.123456",
            "detected_object": "brown bear",
            "temperature": 22.5
        }))
        .unwrap();
        assert_eq!(event.detection_id, 0);
        assert_eq!(event.device_id, 0);
        assert_eq!(event.species, "brown bear");
    }

    #[test]
    fn accepts_camera_uuid_alias() {
        let event: DetectionEvent = serde_json::from_value(serde_json::json!({
            "detection_id": 7,
            "camera_uuid": 352,
            "detection_time": "t",
            "detected_object": "Fox",
            "temperature": 1.0
        }))
        .unwrap();
        assert_eq!(event.device_id, 352);
    }

    #[test]
    fn serialises_canonical_field_names() {
        let event = DetectionEvent {
            detection_id: 0,
            device_id: 9,
            detected_at: "t".into(),
            species: "Fox".into(),
            temperature: 2.0,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["device_uuid"], 9);
        assert_eq!(value["detected_object"], "Fox");
        assert!(value.get("camera_uuid").is_none());
    }

    #[test]
    fn stamping_overrides_frame_device() {
        let event = DetectionEvent {
            detection_id: 0,
            device_id: 1,
            detected_at: "t".into(),
            species: "Fox".into(),
            temperature: 2.0,
        };
        assert_eq!(event.stamped(352).device_id, 352);
    }

    #[test]
    fn species_list_is_a_bare_json_array() {
        let list: TrackedSpecies = ["Bear", "Fox"].into_iter().collect();
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["Bear","Fox"]"#);
    }

    #[test]
    fn substring_matching() {
        let list: TrackedSpecies = ["Bear", "Fox"].into_iter().collect();
        assert!(list.matches("Brown Bear"));
        assert!(!list.matches("Antelope"));
        assert!(!TrackedSpecies::default().matches("Bear"));
    }

    #[test]
    fn reorder_is_not_equal() {
        let a: TrackedSpecies = ["Bear", "Fox"].into_iter().collect();
        let b: TrackedSpecies = ["Fox", "Bear"].into_iter().collect();
        assert_ne!(a, b);
    }
}
