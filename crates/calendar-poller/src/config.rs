use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

const DEFAULT_REDIS_PORT: u16 = 6379;
const DEFAULT_CREDENTIALS_PATH: &str = "/opt/service/secret/calendar.json";
const DEFAULT_TOKEN_CACHE_PATH: &str = "/opt/service/token.json";

/// Upper bound for RANGE: 30 days. Redis rejects a zero expiry, so 0 is out too.
const MAX_RANGE_SECS: u64 = 30 * 24 * 60 * 60;
/// Upper bound for SLEEP: one day
const MAX_SLEEP_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Base URL of the chore API
    pub chore_api: String,
    /// Calendar name (summary) to watch
    pub calendar_name: String,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_prefix: String,
    /// Seconds ahead to look for events; also the dedup window
    pub range_secs: u64,
    /// Seconds to sleep between polls
    pub sleep_secs: u64,
    /// Google OAuth client secret JSON
    pub credentials_path: String,
    /// Where the OAuth token is persisted
    pub token_cache_path: String,
}

impl PollerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            chore_api: required(&lookup, "CHORE_API")?,
            calendar_name: required(&lookup, "GOOGLE_CALENDAR")?,
            redis_host: required(&lookup, "REDIS_HOST")?,
            redis_port: match lookup("REDIS_PORT") {
                Some(port) => parse("REDIS_PORT", &port)?,
                None => DEFAULT_REDIS_PORT,
            },
            redis_prefix: required(&lookup, "REDIS_PREFIX")?,
            range_secs: bounded("RANGE", &required(&lookup, "RANGE")?, MAX_RANGE_SECS)?,
            sleep_secs: bounded("SLEEP", &required(&lookup, "SLEEP")?, MAX_SLEEP_SECS)?,
            credentials_path: lookup("GOOGLE_CREDENTIALS")
                .unwrap_or_else(|| DEFAULT_CREDENTIALS_PATH.to_string()),
            token_cache_path: lookup("GOOGLE_TOKEN_CACHE")
                .unwrap_or_else(|| DEFAULT_TOKEN_CACHE_PATH.to_string()),
        })
    }

    /// Prefix for shared cache keys, `{REDIS_PREFIX}/event`
    pub fn key_prefix(&self) -> String {
        format!("{}/event", self.redis_prefix)
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name).with_context(|| format!("{} must be set", name))
}

fn parse<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a valid number", name))
}

/// Parse a number of seconds in `1..=max`
fn bounded(name: &str, value: &str, max: u64) -> Result<u64> {
    let secs: u64 = parse(name, value)?;
    if !(1..=max).contains(&secs) {
        anyhow::bail!("{} must be between 1 and {} seconds, got {}", name, max, secs);
    }
    Ok(secs)
}
