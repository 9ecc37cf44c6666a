//! Environment variable helpers

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Failure to interpret an environment variable
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {key}: {value:?} ({reason})")]
pub struct EnvError {
    pub key: String,
    pub value: String,
    pub reason: String,
}

/// Read a variable, treating blank values as unset
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read and parse a variable; `Ok(None)` when it is unset
pub fn env_parse<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(key, env_var(key))
}

fn parse_value<T>(key: &str, raw: Option<String>) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|e| EnvError {
            key: key.to_string(),
            value: value.clone(),
            reason: e.to_string(),
        })
    })
    .transpose()
}
