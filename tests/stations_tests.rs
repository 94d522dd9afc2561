use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::Utc;
use velonet::{
    feed::{self, Station, StationFeed},
    shared::geo::Coordinate,
    stations::{self, Classification, Snapshot, StationCache, Thresholds},
};

fn station(id: u64, bikes: u32, stands: u32, total: u32) -> Station {
    Station {
        id,
        name: format!("Station {id}"),
        coordinate: Coordinate::from((48.69, 6.18)),
        available_bikes: bikes,
        available_stands: stands,
        total_stands: total,
    }
}

#[test]
fn classify_test() {
    let thresholds = Thresholds::default();
    assert_eq!(thresholds.classify(&station(1, 0, 0, 0)), Classification::Normal);
    assert_eq!(thresholds.classify(&station(2, 9, 1, 10)), Classification::Overloaded);
    assert_eq!(thresholds.classify(&station(3, 2, 8, 10)), Classification::Underloaded);
    assert_eq!(thresholds.classify(&station(4, 5, 5, 10)), Classification::Normal);
}

#[test]
fn overload_wins_over_undersupply_test() {
    // Few bikes and few stands, broken docks in between
    let thresholds = Thresholds::default();
    assert_eq!(thresholds.classify(&station(1, 1, 1, 10)), Classification::Overloaded);
}

#[test]
fn thresholds_are_strict_test() {
    let thresholds = Thresholds {
        overload: 0.5,
        undersupply: 0.5,
    };
    assert_eq!(thresholds.classify(&station(1, 5, 5, 10)), Classification::Normal);
    assert_eq!(thresholds.classify(&station(2, 6, 4, 10)), Classification::Overloaded);
    assert_eq!(thresholds.classify(&station(3, 4, 6, 10)), Classification::Underloaded);
}

#[test]
fn snapshot_keeps_feed_order_test() {
    let stations = vec![
        station(5, 2, 8, 10),
        station(1, 9, 1, 10),
        station(3, 5, 5, 10),
        station(2, 1, 9, 10),
        station(4, 10, 0, 10),
    ];
    let snapshot = Snapshot::classify(stations, &Thresholds::default(), Utc::now());
    let ids = |stations: &[Station]| stations.iter().map(|s| s.id).collect::<Vec<_>>();
    assert_eq!(ids(&snapshot.overloaded), vec![1, 4]);
    assert_eq!(ids(&snapshot.underloaded), vec![5, 2]);
    assert_eq!(ids(&snapshot.normal), vec![3]);
    assert_eq!(snapshot.len(), 5);
}

#[test]
fn empty_snapshot_test() {
    let snapshot = Snapshot::classify(Vec::new(), &Thresholds::default(), Utc::now());
    assert!(snapshot.is_empty());
}

/// Feed answering from a script, `None` entries fail.
struct ScriptedFeed {
    responses: Mutex<VecDeque<Option<Vec<Station>>>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl ScriptedFeed {
    fn new(responses: Vec<Option<Vec<Station>>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StationFeed for ScriptedFeed {
    async fn fetch(&self) -> Result<Vec<Station>, feed::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front().flatten();
        next.ok_or_else(|| feed::Error::Payload("scripted failure".into()))
    }
}

#[tokio::test(start_paused = true)]
async fn cached_within_ttl_test() {
    let feed = ScriptedFeed::new(vec![Some(vec![station(1, 5, 5, 10)])]);
    let cache = StationCache::new(feed).with_ttl(Duration::from_secs(30));

    let first = cache.get_or_refresh().await.unwrap();
    tokio::time::advance(Duration::from_secs(29)).await;
    let second = cache.get_or_refresh().await.unwrap();

    assert_eq!(cache.feed().calls(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.normal.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn refetch_after_ttl_test() {
    let feed = ScriptedFeed::new(vec![
        Some(vec![station(1, 5, 5, 10)]),
        Some(vec![station(1, 9, 1, 10)]),
    ]);
    let cache = StationCache::new(feed).with_ttl(Duration::from_secs(30));

    let first = cache.get_or_refresh().await.unwrap();
    let first_fetch = cache.last_fetch().await.unwrap();
    tokio::time::advance(Duration::from_secs(31)).await;
    let second = cache.get_or_refresh().await.unwrap();

    assert_eq!(cache.feed().calls(), 2);
    assert_eq!(first.normal.len(), 1);
    assert_eq!(second.overloaded.len(), 1);
    assert!(cache.last_fetch().await.unwrap() > first_fetch);
}

#[tokio::test(start_paused = true)]
async fn stale_snapshot_served_on_failure_test() {
    let feed = ScriptedFeed::new(vec![
        Some(vec![station(1, 5, 5, 10)]),
        None,
        None,
        Some(vec![station(2, 2, 8, 10)]),
    ]);
    let cache = StationCache::new(feed).with_ttl(Duration::from_secs(30));

    let first = cache.get_or_refresh().await.unwrap();
    let first_fetch = cache.last_fetch().await;
    tokio::time::advance(Duration::from_secs(31)).await;

    let stale = cache.get_or_refresh().await.unwrap();
    assert!(Arc::ptr_eq(&first, &stale));
    assert_eq!(cache.last_fetch().await, first_fetch);

    // The failed attempt did not reset the clock, the next call retries
    let stale = cache.get_or_refresh().await.unwrap();
    assert!(Arc::ptr_eq(&first, &stale));
    assert_eq!(cache.feed().calls(), 3);

    let fresh = cache.get_or_refresh().await.unwrap();
    assert_eq!(cache.feed().calls(), 4);
    assert_eq!(fresh.underloaded[0].id, 2);
    assert!(cache.last_fetch().await > first_fetch);
}

#[tokio::test(start_paused = true)]
async fn no_data_before_first_success_test() {
    let feed = ScriptedFeed::new(vec![None, Some(vec![station(1, 5, 5, 10)])]);
    let cache = StationCache::new(feed);

    let result = cache.get_or_refresh().await;
    assert!(matches!(result, Err(stations::Error::NoDataAvailable(_))));
    assert_eq!(cache.last_fetch().await, None);

    let snapshot = cache.get_or_refresh().await.unwrap();
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_fetch_test() {
    let feed = ScriptedFeed::new(vec![Some(vec![station(1, 5, 5, 10)])])
        .with_delay(Duration::from_millis(200));
    let cache = StationCache::new(feed);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_refresh().await })
        })
        .collect();
    let mut snapshots = Vec::new();
    for handle in handles {
        snapshots.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(cache.feed().calls(), 1);
    assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_failure_test() {
    let feed = ScriptedFeed::new(vec![None]).with_delay(Duration::from_millis(200));
    let cache = StationCache::new(feed);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_refresh().await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().is_err());
    }
    assert_eq!(cache.feed().calls(), 1);
}

async fn refresh_concurrently(
    cache: &StationCache<ScriptedFeed>,
    callers: usize,
) -> Vec<Result<Arc<Snapshot>, stations::Error>> {
    let handles: Vec<_> = (0..callers)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_or_refresh().await })
        })
        .collect();
    let mut results = Vec::with_capacity(callers);
    for handle in handles {
        results.push(handle.await.unwrap());
    }
    results
}

#[tokio::test(start_paused = true)]
async fn expired_snapshot_refreshed_once_for_all_callers_test() {
    let feed = ScriptedFeed::new(vec![
        Some(vec![station(1, 5, 5, 10)]),
        Some(vec![station(1, 9, 1, 10)]),
    ])
    .with_delay(Duration::from_millis(200));
    let cache = StationCache::new(feed);

    let first = cache.get_or_refresh().await.unwrap();
    tokio::time::advance(stations::DEFAULT_TTL + Duration::from_secs(1)).await;

    let snapshots: Vec<_> = refresh_concurrently(&cache, 20)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();
    assert_eq!(cache.feed().calls(), 2);
    assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
    assert!(!Arc::ptr_eq(&first, &snapshots[0]));
    assert_eq!(snapshots[0].overloaded.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn expired_snapshot_served_stale_to_all_callers_test() {
    let feed = ScriptedFeed::new(vec![Some(vec![station(1, 5, 5, 10)]), None])
        .with_delay(Duration::from_millis(200));
    let cache = StationCache::new(feed);

    let first = cache.get_or_refresh().await.unwrap();
    let first_fetch = cache.last_fetch().await;
    tokio::time::advance(stations::DEFAULT_TTL + Duration::from_secs(1)).await;

    let results = refresh_concurrently(&cache, 20).await;
    assert_eq!(cache.feed().calls(), 2);
    for result in results {
        assert!(Arc::ptr_eq(&result.unwrap(), &first));
    }
    assert_eq!(cache.last_fetch().await, first_fetch);
}

#[tokio::test(start_paused = true)]
async fn custom_thresholds_test() {
    let feed = ScriptedFeed::new(vec![Some(vec![station(1, 5, 5, 10)])]);
    let thresholds = Thresholds {
        overload: 0.6,
        undersupply: 0.35,
    };
    let cache = StationCache::new(feed).with_thresholds(thresholds);
    assert_eq!(cache.thresholds(), &thresholds);

    let snapshot = cache.get_or_refresh().await.unwrap();
    assert_eq!(snapshot.overloaded.len(), 1);
}
