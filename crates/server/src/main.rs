mod api;
mod auth;
mod dto;
mod error;
mod state;

use crate::state::AppState;
use std::{process, sync::Arc, time::Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use velonet::{config::Config, feed::HttpFeed, stations::StationCache, store::GraphStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting server...");
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {err}");
            process::exit(1);
        }
    };

    info!("Loading graphs...");
    let now = Instant::now();
    let store = config
        .graphs
        .iter()
        .fold(GraphStore::new(), |store, (mode, path)| {
            store.with_source(mode.as_str(), path)
        });
    let (store, report) = match tokio::task::spawn_blocking(move || {
        let report = store.load_all();
        (store, report)
    })
    .await
    {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("Graph loading task failed: {err}");
            process::exit(1);
        }
    };
    let loaded = report.iter().filter(|(_, result)| result.is_ok()).count();
    if loaded < report.len() {
        warn!("{} of {} modes failed to load", report.len() - loaded, report.len());
    }
    info!("Loading graphs took {:?}", now.elapsed());

    let feed = HttpFeed::new(config.feed_url.as_str())
        .with_api_key(config.api_key.clone())
        .with_timeout(config.feed_timeout);
    let stations = StationCache::new(feed)
        .with_ttl(config.cache_ttl)
        .with_thresholds(config.thresholds);
    let state = AppState::new(store, stations).with_access_token(config.access_token.clone());
    if state.access_token.is_none() {
        warn!("No access token configured, the API is open");
    }

    let app = api::router(Arc::new(state));
    let listener = match tokio::net::TcpListener::bind(&config.bind).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {}: {err}", config.bind);
            process::exit(1);
        }
    };
    info!("Listening on {}", config.bind);
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server stopped: {err}");
        process::exit(1);
    }
}
