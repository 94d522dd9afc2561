use std::{env, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

use crate::{
    feed,
    stations::{self, Thresholds},
};

pub const DEFAULT_FEED_URL: &str = "https://api.jcdecaux.com/vls/v1/stations?contract=nancy";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("{key} has an invalid value: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} must be between 0 and 1, got {value}")]
    ThresholdOutOfRange { key: &'static str, value: f64 },
    #[error("Graph entry {0} is not of the form mode=path")]
    InvalidGraphEntry(String),
}

/// Runtime settings of the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub feed_url: String,
    pub api_key: Option<String>,
    pub feed_timeout: Duration,
    pub cache_ttl: Duration,
    pub thresholds: Thresholds,
    /// Travel mode name and the graph source backing it.
    pub graphs: Vec<(String, PathBuf)>,
    pub bind: String,
    /// Bearer token required on the API, open when unset.
    pub access_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.into(),
            api_key: None,
            feed_timeout: feed::DEFAULT_TIMEOUT,
            cache_ttl: stations::DEFAULT_TTL,
            thresholds: Thresholds::default(),
            graphs: vec![
                ("cycle".into(), PathBuf::from("data/cycle")),
                ("vehicle".into(), PathBuf::from("data/vehicle")),
            ],
            bind: DEFAULT_BIND.into(),
            access_token: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, self::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Overlays the `VELONET_*` variables returned by `lookup` on the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, self::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get("VELONET_FEED_URL") {
            config.feed_url = url;
        }
        if let Some(key) = get("VELONET_API_KEY") {
            config.api_key = Some(key);
        }
        if let Some(value) = get("VELONET_FEED_TIMEOUT_SECS") {
            config.feed_timeout = Duration::from_secs(parse("VELONET_FEED_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = get("VELONET_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(parse("VELONET_CACHE_TTL_SECS", &value)?);
        }
        if let Some(value) = get("VELONET_OVERLOAD_THRESHOLD") {
            config.thresholds.overload = parse_ratio("VELONET_OVERLOAD_THRESHOLD", &value)?;
        }
        if let Some(value) = get("VELONET_UNDERSUPPLY_THRESHOLD") {
            config.thresholds.undersupply = parse_ratio("VELONET_UNDERSUPPLY_THRESHOLD", &value)?;
        }
        if let Some(value) = get("VELONET_GRAPHS") {
            config.graphs = parse_graphs(&value)?;
        }
        if let Some(bind) = get("VELONET_BIND") {
            config.bind = bind;
        }
        if let Some(token) = get("VELONET_ACCESS_TOKEN") {
            config.access_token = Some(token);
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, self::Error> {
    value
        .trim()
        .parse()
        .map_err(|_| self::Error::InvalidValue {
            key,
            value: value.to_string(),
        })
}

fn parse_ratio(key: &'static str, value: &str) -> Result<f64, self::Error> {
    let ratio: f64 = parse(key, value)?;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(self::Error::ThresholdOutOfRange { key, value: ratio });
    }
    Ok(ratio)
}

/// Parses `cycle=/srv/cycle,vehicle=/srv/vehicle.zip`.
fn parse_graphs(value: &str) -> Result<Vec<(String, PathBuf)>, self::Error> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((mode, path)) if !mode.trim().is_empty() && !path.trim().is_empty() => {
                Ok((mode.trim().to_string(), PathBuf::from(path.trim())))
            }
            _ => Err(self::Error::InvalidGraphEntry(entry.to_string())),
        })
        .collect()
}
