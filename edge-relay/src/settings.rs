//! Edge relay settings, resolved from the environment.
//!
//! | Var                      | Default                        |
//! |--------------------------|--------------------------------|
//! | `EDGE_CAMERA_ADDR`       | `127.0.0.1:3333`               |
//! | `EDGE_AGGREGATOR_ADDR`   | `localhost:3444`               |
//! | `EDGE_DEVICE_ID`         | required                       |
//! | `EDGE_TRACKED_SPECIES`   | `["Bear","Racoon","Gazelle"]`  |
//! | `EDGE_CONFIG_ADDR`       | `0.0.0.0:3555`                 |
//! | `EDGE_APPROVED_CAMERAS`  | `["localhost","127.0.0.1"]`    |
//! | `EDGE_BACKOFF_MS`        | `50,250,500,1000,1500,4000,7000` |

use relay_core::env::{self, SettingsError};
use relay_core::{BackoffSchedule, TrackedSpecies};

#[derive(Debug, Clone)]
pub struct Settings {
    pub camera_addr: String,
    pub aggregator_addr: String,
    pub device_id: i64,
    pub tracked_species: TrackedSpecies,
    pub config_addr: String,
    pub approved_cameras: Vec<String>,
    pub backoff: BackoffSchedule,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let device_id = env::parse("EDGE_DEVICE_ID", &env::required(&lookup, "EDGE_DEVICE_ID")?)?;

        let tracked_species = env::string_list(
            "EDGE_TRACKED_SPECIES",
            &env::or_default(&lookup, "EDGE_TRACKED_SPECIES", r#"["Bear","Racoon","Gazelle"]"#),
        )?;

        let approved_cameras = env::string_list(
            "EDGE_APPROVED_CAMERAS",
            &env::or_default(&lookup, "EDGE_APPROVED_CAMERAS", r#"["localhost","127.0.0.1"]"#),
        )?;

        let backoff = match lookup("EDGE_BACKOFF_MS") {
            Some(raw) if !raw.trim().is_empty() => env::backoff_ms("EDGE_BACKOFF_MS", &raw)?,
            _ => BackoffSchedule::upstream(),
        };

        Ok(Self {
            camera_addr: env::or_default(&lookup, "EDGE_CAMERA_ADDR", "127.0.0.1:3333"),
            aggregator_addr: env::or_default(&lookup, "EDGE_AGGREGATOR_ADDR", "localhost:3444"),
            device_id,
            tracked_species: TrackedSpecies::new(tracked_species),
            config_addr: env::or_default(&lookup, "EDGE_CONFIG_ADDR", "0.0.0.0:3555"),
            approved_cameras,
            backoff,
        })
    }
}
