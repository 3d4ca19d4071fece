//! Aggregator settings, resolved from the environment.
//!
//! | Var                           | Default                                   |
//! |-------------------------------|-------------------------------------------|
//! | `AGGREGATOR_ADDR`             | `0.0.0.0:3444`                            |
//! | `DATABASE_URL`                | required                                  |
//! | `AGGREGATOR_SPECIES_FILE`     | `config.txt`                              |
//! | `AGGREGATOR_EDGES`            | required, JSON array of edge addresses    |
//! | `AGGREGATOR_POLL_SECS`        | `10`                                      |
//! | `AGGREGATOR_INBOUND_CAPACITY` | `5`                                       |
//! | `AGGREGATOR_BACKOFF_MS`       | `500,1000,1500,4000,7000,10000,12000`     |

use std::path::PathBuf;
use std::time::Duration;

use relay_core::env::{self, SettingsError};
use relay_core::BackoffSchedule;

#[derive(Debug, Clone)]
pub struct Settings {
    pub listen_addr: String,
    pub database_url: String,
    pub species_file: PathBuf,
    pub edges: Vec<String>,
    pub poll_interval: Duration,
    pub inbound_capacity: usize,
    pub backoff: BackoffSchedule,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let database_url = env::required(&lookup, "DATABASE_URL")?;

        let edges = env::string_list("AGGREGATOR_EDGES", &env::required(&lookup, "AGGREGATOR_EDGES")?)?;
        if edges.is_empty() {
            return Err(SettingsError::Invalid {
                var: "AGGREGATOR_EDGES",
                reason: "at least one edge relay must be registered".into(),
            });
        }

        let poll_secs: u64 = env::parse(
            "AGGREGATOR_POLL_SECS",
            &env::or_default(&lookup, "AGGREGATOR_POLL_SECS", "10"),
        )?;
        if poll_secs == 0 {
            return Err(SettingsError::Invalid {
                var: "AGGREGATOR_POLL_SECS",
                reason: "must be at least 1".into(),
            });
        }

        let inbound_capacity: usize = env::parse(
            "AGGREGATOR_INBOUND_CAPACITY",
            &env::or_default(&lookup, "AGGREGATOR_INBOUND_CAPACITY", "5"),
        )?;
        if inbound_capacity == 0 {
            return Err(SettingsError::Invalid {
                var: "AGGREGATOR_INBOUND_CAPACITY",
                reason: "must be at least 1".into(),
            });
        }

        let backoff = match lookup("AGGREGATOR_BACKOFF_MS") {
            Some(raw) if !raw.trim().is_empty() => env::backoff_ms("AGGREGATOR_BACKOFF_MS", &raw)?,
            _ => BackoffSchedule::downstream(),
        };

        Ok(Self {
            listen_addr: env::or_default(&lookup, "AGGREGATOR_ADDR", "0.0.0.0:3444"),
            database_url,
            species_file: env::or_default(&lookup, "AGGREGATOR_SPECIES_FILE", "config.txt").into(),
            edges,
            poll_interval: Duration::from_secs(poll_secs),
            inbound_capacity,
            backoff,
        })
    }
}
