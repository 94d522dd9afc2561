use std::{sync::Arc, time::Duration};

use chrono::Utc;
use thiserror::Error;
use tokio::{
    sync::{Mutex, watch},
    time::Instant,
};
use tracing::{info, warn};

use crate::{
    feed::StationFeed,
    stations::{Snapshot, Thresholds},
};

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No station data available yet: {0}")]
    NoDataAvailable(String),
}

type Outcome = Result<Arc<Snapshot>, self::Error>;

#[derive(Default)]
struct State {
    snapshot: Option<Arc<Snapshot>>,
    last_fetch: Option<Instant>,
    // Set while a fetch is running, every caller that finds the
    // snapshot expired waits on this instead of fetching again
    in_flight: Option<watch::Receiver<Option<Outcome>>>,
}

impl State {
    fn fresh(&self, now: Instant, ttl: Duration) -> Option<Arc<Snapshot>> {
        let last_fetch = self.last_fetch?;
        if now.saturating_duration_since(last_fetch) < ttl {
            self.snapshot.clone()
        } else {
            None
        }
    }

    fn fallback(&self, reason: impl ToString) -> Outcome {
        self.snapshot
            .clone()
            .ok_or_else(|| self::Error::NoDataAvailable(reason.to_string()))
    }
}

struct Inner<F> {
    feed: F,
    state: Mutex<State>,
}

/// Time-bounded cache of the classified station snapshot.
///
/// At most one fetch is in flight at any time. When the feed fails the
/// previous snapshot keeps being served and the fetch time is left alone,
/// so the next caller tries again right away.
pub struct StationCache<F> {
    inner: Arc<Inner<F>>,
    ttl: Duration,
    thresholds: Thresholds,
}

impl<F> Clone for StationCache<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            ttl: self.ttl,
            thresholds: self.thresholds,
        }
    }
}

impl<F: StationFeed> StationCache<F> {
    pub fn new(feed: F) -> Self {
        Self {
            inner: Arc::new(Inner {
                feed,
                state: Mutex::new(State::default()),
            }),
            ttl: DEFAULT_TTL,
            thresholds: Thresholds::default(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn feed(&self) -> &F {
        &self.inner.feed
    }

    /// Time of the last successful fetch.
    pub async fn last_fetch(&self) -> Option<Instant> {
        self.inner.state.lock().await.last_fetch
    }

    /// Returns the current snapshot, fetching a new one first if it expired.
    pub async fn get_or_refresh(&self) -> Result<Arc<Snapshot>, self::Error> {
        let mut receiver = {
            let mut state = self.inner.state.lock().await;
            if let Some(snapshot) = state.fresh(Instant::now(), self.ttl) {
                return Ok(snapshot);
            }
            // A closed channel means the fetching task died, start over
            let pending = state
                .in_flight
                .as_ref()
                .filter(|receiver| receiver.has_changed().is_ok())
                .cloned();
            match pending {
                Some(receiver) => receiver,
                None => {
                    let (sender, receiver) = watch::channel(None);
                    state.in_flight = Some(receiver.clone());
                    // Spawned so a caller that goes away cannot strand the waiters
                    tokio::spawn(self.inner.clone().refresh(self.thresholds, sender));
                    receiver
                }
            }
        };

        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        match outcome {
            Some(outcome) => outcome,
            None => {
                warn!("Station refresh ended without a result");
                self.inner
                    .state
                    .lock()
                    .await
                    .fallback("station refresh was aborted")
            }
        }
    }
}

impl<F: StationFeed> Inner<F> {
    async fn refresh(
        self: Arc<Self>,
        thresholds: Thresholds,
        sender: watch::Sender<Option<Outcome>>,
    ) {
        let result = self.feed.fetch().await;

        let mut state = self.state.lock().await;
        state.in_flight = None;
        let outcome = match result {
            Ok(stations) => {
                let snapshot = Snapshot::classify(stations, &thresholds, Utc::now());
                info!(
                    "Fetched {} stations: {} overloaded, {} underloaded, {} normal",
                    snapshot.len(),
                    snapshot.overloaded.len(),
                    snapshot.underloaded.len(),
                    snapshot.normal.len()
                );
                let snapshot = Arc::new(snapshot);
                state.snapshot = Some(snapshot.clone());
                state.last_fetch = Some(Instant::now());
                Ok(snapshot)
            }
            Err(err) => {
                warn!("Failed to fetch stations: {err}");
                state.fallback(err)
            }
        };
        // Nobody waiting is fine
        let _ = sender.send(Some(outcome));
    }
}
