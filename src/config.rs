//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

use crate::error::{ConfigError, Result};

pub const ENV_NAME: &str = "CACHE_NAME";
pub const ENV_COST_LIMIT: &str = "CACHE_COST_LIMIT";
pub const ENV_COUNT_LIMIT: &str = "CACHE_COUNT_LIMIT";
pub const ENV_EVICTS_DISCARDED_CONTENT: &str = "CACHE_EVICTS_DISCARDED_CONTENT";

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults. A limit of 0 means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cosmetic cache name, shown in log records
    pub name: String,
    /// Soft ceiling on the aggregate cost of resident entries
    pub cost_limit: usize,
    /// Soft ceiling on the number of resident entries
    pub count_limit: usize,
    /// Pass-through flag for discardable-content payloads
    pub evicts_objects_with_discarded_content: bool,
}

impl CacheConfig {
    /// Loads the configuration strictly from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAME` - Cache name (default: "")
    /// - `CACHE_COST_LIMIT` - Aggregate cost limit (default: 0)
    /// - `CACHE_COUNT_LIMIT` - Entry count limit (default: 0)
    /// - `CACHE_EVICTS_DISCARDED_CONTENT` - true/false (default: true)
    ///
    /// Unset variables take their default; malformed ones are an error.
    pub fn try_from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Loads the configuration from environment variables, falling back to
    /// defaults (with a warning) if any value is malformed.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_else(|err| {
            warn!("Ignoring cache configuration from environment: {}", err);
            Self::default()
        })
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            name: lookup(ENV_NAME).unwrap_or(defaults.name),
            cost_limit: parse_var(&lookup, ENV_COST_LIMIT)?.unwrap_or(defaults.cost_limit),
            count_limit: parse_var(&lookup, ENV_COUNT_LIMIT)?.unwrap_or(defaults.count_limit),
            evicts_objects_with_discarded_content: parse_var(
                &lookup,
                ENV_EVICTS_DISCARDED_CONTENT,
            )?
            .unwrap_or(defaults.evicts_objects_with_discarded_content),
        })
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err: T::Err| ConfigError::InvalidValue {
                var,
                value: raw.clone(),
                reason: err.to_string(),
            }),
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            cost_limit: 0,
            count_limit: 0,
            evicts_objects_with_discarded_content: true,
        }
    }
}
