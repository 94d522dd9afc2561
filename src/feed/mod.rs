use std::{future::Future, time::Duration};

use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

mod models;
pub use models::*;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum Error {
    #[error("Feed request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Feed did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Feed answered with status {0}")]
    Status(StatusCode),
    #[error("Feed payload is malformed: {0}")]
    Payload(String),
    #[error("Feed url is invalid: {0}")]
    InvalidUrl(String),
}

/// A source of station occupancy snapshots.
///
/// Every call is a single attempt; retrying is up to the caller.
pub trait StationFeed: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Station>, self::Error>> + Send;
}

/// JCDecaux-style HTTP feed.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn transport_error(&self, err: reqwest::Error) -> self::Error {
        if err.is_timeout() {
            self::Error::Timeout(self.timeout)
        } else {
            self::Error::Transport(err)
        }
    }
}

impl StationFeed for HttpFeed {
    async fn fetch(&self) -> Result<Vec<Station>, self::Error> {
        let mut url =
            reqwest::Url::parse(&self.url).map_err(|err| self::Error::InvalidUrl(err.to_string()))?;
        if let Some(api_key) = &self.api_key {
            url.query_pairs_mut().append_pair("apiKey", api_key);
        }
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        if !response.status().is_success() {
            return Err(self::Error::Status(response.status()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;
        let stations: Vec<JcdStation> = serde_json::from_slice(&body)
            .map_err(|err| self::Error::Payload(err.to_string()))?;
        debug!("Feed returned {} stations", stations.len());
        Ok(stations.into_iter().map(Station::from).collect())
    }
}
