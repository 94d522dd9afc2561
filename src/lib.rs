//! Bike-share station monitoring and shortest-path routing.
//!
//! The crate has two halves. The station side polls an occupancy feed
//! through a time-bounded cache and classifies each station as overloaded,
//! underloaded or normal. The routing side keeps one immutable graph per
//! travel mode, snaps coordinates to their nearest node and runs Dijkstra
//! between them.

pub mod config;
pub mod feed;
pub mod graph;
pub mod router;
pub mod shared;
pub mod source;
pub mod spatial;
pub mod stations;
pub mod store;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::feed::{HttpFeed, Station, StationFeed};
    pub use crate::graph::{EdgeRecord, Graph, Node, NodeId, NodeRecord};
    pub use crate::router::{PathResult, Router, shortest_path};
    pub use crate::shared::geo::{Coordinate, Distance};
    pub use crate::source::GraphSource;
    pub use crate::spatial::SpatialIndex;
    pub use crate::stations::{Classification, Snapshot, StationCache, Thresholds};
    pub use crate::store::{GraphStore, Network, Route};
}
