use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
    time::Instant,
};

use rayon::prelude::*;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    graph::{self, Graph, NodeId},
    router::{self, PathResult, Router},
    shared::geo::Coordinate,
    source::{self, GraphSource},
    spatial::SpatialIndex,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown travel mode: {0}")]
    UnknownMode(String),
    #[error("Travel mode {0} is configured but its graph is not loaded")]
    Unavailable(String),
    #[error("Coordinate {0} is not a valid position")]
    InvalidCoordinate(Coordinate),
    #[error(transparent)]
    Routing(#[from] router::Error),
    #[error("Failed to load graph for mode {mode}: {source}")]
    Load {
        mode: String,
        #[source]
        source: graph::Error,
    },
}

/// A loaded graph together with its spatial index.
/// Both are immutable, a reload replaces the whole pair.
#[derive(Debug)]
pub struct Network {
    pub mode: Arc<str>,
    pub graph: Graph,
    pub index: SpatialIndex,
}

impl Network {
    pub fn new(mode: impl Into<Arc<str>>, graph: Graph) -> Self {
        let index = SpatialIndex::new(&graph);
        Self {
            mode: mode.into(),
            graph,
            index,
        }
    }

    pub fn nearest(&self, coordinate: &Coordinate) -> Option<NodeId> {
        self.index.nearest(coordinate)
    }

    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<PathResult, router::Error> {
        Router::new(&self.graph, from, to).solve()
    }

    /// Snaps both coordinates to their nearest nodes and routes between them.
    pub fn route(&self, from: &Coordinate, to: &Coordinate) -> Result<Route, self::Error> {
        let from_node = self
            .nearest(from)
            .ok_or(self::Error::InvalidCoordinate(*from))?;
        let to_node = self
            .nearest(to)
            .ok_or(self::Error::InvalidCoordinate(*to))?;
        let path = self.shortest_path(from_node, to_node)?;
        Ok(Route {
            mode: self.mode.clone(),
            from: from_node,
            to: to_node,
            path,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub mode: Arc<str>,
    pub from: NodeId,
    pub to: NodeId,
    pub path: PathResult,
}

/// Mode-indexed set of networks.
///
/// Readers grab an `Arc<Network>` and drop the lock straight away, so an
/// in-flight query keeps the version it started with while a reload
/// publishes its replacement.
#[derive(Default)]
pub struct GraphStore {
    networks: RwLock<HashMap<Arc<str>, Arc<Network>>>,
    sources: HashMap<Arc<str>, PathBuf>,
}

impl GraphStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers where a mode's graph is read from.
    pub fn with_source(mut self, mode: impl Into<Arc<str>>, path: impl Into<PathBuf>) -> Self {
        self.sources.insert(mode.into(), path.into());
        self
    }

    /// Loads every registered mode in parallel.
    /// A mode that fails to load stays unavailable, the others are published.
    pub fn load_all(&self) -> Vec<(Arc<str>, Result<(), graph::Error>)> {
        let now = Instant::now();
        let results: Vec<_> = self
            .sources
            .par_iter()
            .map(|(mode, path)| (mode.clone(), load_network(mode, path)))
            .collect();

        let mut report = Vec::with_capacity(results.len());
        for (mode, result) in results {
            match result {
                Ok(network) => {
                    self.publish(network);
                    report.push((mode, Ok(())));
                }
                Err(err) => {
                    error!("Mode {mode} is unavailable: {err}");
                    report.push((mode, Err(err)));
                }
            }
        }
        info!("Loading graphs took {:?}", now.elapsed());
        report
    }

    /// Rebuilds a mode from its source and swaps it in.
    /// On failure the previous network stays in place.
    pub fn reload(&self, mode: &str) -> Result<Arc<Network>, self::Error> {
        let (mode, path) = self
            .sources
            .get_key_value(mode)
            .ok_or_else(|| self::Error::UnknownMode(mode.to_string()))?;
        let network = load_network(mode, path).map_err(|source| self::Error::Load {
            mode: mode.to_string(),
            source,
        })?;
        Ok(self.publish(network))
    }

    /// Publishes an already built graph under `mode`.
    pub fn insert(&self, mode: impl Into<Arc<str>>, graph: Graph) -> Arc<Network> {
        self.publish(Network::new(mode, graph))
    }

    /// A mode with a registered source that failed to load is unavailable
    /// rather than unknown, a reload can still bring it up.
    pub fn network(&self, mode: &str) -> Result<Arc<Network>, self::Error> {
        let network = self
            .networks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(mode)
            .cloned();
        match network {
            Some(network) => Ok(network),
            None if self.sources.contains_key(mode) => {
                Err(self::Error::Unavailable(mode.to_string()))
            }
            None => Err(self::Error::UnknownMode(mode.to_string())),
        }
    }

    /// Loaded networks sorted by mode name.
    pub fn networks(&self) -> Vec<Arc<Network>> {
        let mut networks: Vec<_> = self
            .networks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        networks.sort_by(|a, b| a.mode.cmp(&b.mode));
        networks
    }

    pub fn route(&self, mode: &str, from: &Coordinate, to: &Coordinate) -> Result<Route, self::Error> {
        self.network(mode)?.route(from, to)
    }

    fn publish(&self, network: Network) -> Arc<Network> {
        let network = Arc::new(network);
        self.networks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(network.mode.clone(), network.clone());
        network
    }
}

fn load_network(mode: &Arc<str>, path: &Path) -> Result<Network, graph::Error> {
    info!("Loading {mode} graph from {}", path.display());
    let graph = GraphSource::new(source::Config::default())
        .from_path(path)
        .load()?;
    Ok(Network::new(mode.clone(), graph))
}
