use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::shared::geo::{Coordinate, Distance};

/// Identifier of a node, unique within one graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A node as handed over by a graph source, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub coordinate: Coordinate,
}

impl NodeRecord {
    pub fn new(id: impl Into<NodeId>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            coordinate: Coordinate {
                latitude,
                longitude,
            },
        }
    }
}

/// An edge as handed over by a graph source, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRecord {
    pub from: NodeId,
    pub to: NodeId,
    pub length: Distance,
}

impl EdgeRecord {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, length: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            length: Distance::from_meters(length),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Node {
    pub index: u32,
    pub id: NodeId,
    pub coordinate: Coordinate,
}

/// Outgoing half of an edge, stored in the adjacency of its tail node.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub to_idx: u32,
    pub length: Distance,
}
