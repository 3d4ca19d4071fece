//! Environment parsing helpers shared by both binaries.
//!
//! Settings are resolved through a lookup closure rather than straight from
//! `std::env`, so tests can feed values without touching the process
//! environment.

use std::time::Duration;

use thiserror::Error;

use crate::delivery::BackoffSchedule;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Resolve `var`, falling back to `default` when unset or blank.
pub fn or_default(lookup: &impl Fn(&str) -> Option<String>, var: &str, default: &str) -> String {
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Resolve a variable that has no default.
pub fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, SettingsError> {
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or(SettingsError::Missing(var))
}

/// Parse a value with [`std::str::FromStr`], naming the variable on failure.
pub fn parse<T>(var: &'static str, raw: &str) -> Result<T, SettingsError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| SettingsError::Invalid {
        var,
        reason: e.to_string(),
    })
}

/// Parse a JSON array of strings, e.g. `["localhost:3555","10.0.0.4:3555"]`.
pub fn string_list(var: &'static str, raw: &str) -> Result<Vec<String>, SettingsError> {
    serde_json::from_str(raw).map_err(|e| SettingsError::Invalid {
        var,
        reason: e.to_string(),
    })
}

/// Parse a comma-separated list of milliseconds into a backoff schedule,
/// e.g. `50,250,500,1000,1500,4000,7000`.
pub fn backoff_ms(var: &'static str, raw: &str) -> Result<BackoffSchedule, SettingsError> {
    let delays = raw
        .split(',')
        .map(|part| parse::<u64>(var, part).map(Duration::from_millis))
        .collect::<Result<Vec<_>, _>>()?;
    BackoffSchedule::new(delays).map_err(|reason| SettingsError::Invalid {
        var,
        reason: reason.to_string(),
    })
}
