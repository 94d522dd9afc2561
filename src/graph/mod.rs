use std::{collections::HashMap, io};

use thiserror::Error;
use tracing::debug;

mod models;
pub use models::*;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Could not find file with name: {0}")]
    FileNotFound(String),
    #[error("Graph has no nodes")]
    Empty,
    #[error("Node {0} is defined more than once")]
    DuplicateNode(NodeId),
    #[error("Node {0} has an invalid coordinate")]
    InvalidCoordinate(NodeId),
    #[error("Edge {from} -> {to} references a node that does not exist")]
    DanglingEdge { from: NodeId, to: NodeId },
    #[error("Edge {0} -> {0} is a self loop")]
    SelfLoop(NodeId),
    #[error("Edge {from} -> {to} has invalid length {length}")]
    InvalidWeight { from: NodeId, to: NodeId, length: f64 },
}

type IdToIndex = HashMap<NodeId, usize>;

/// Immutable weighted graph of one travel mode.
///
/// Adjacency is stored compressed: the outgoing edges of node `i`
/// live in `edges[offsets[i]..offsets[i + 1]]`, in the order the
/// records were supplied.
#[derive(Debug, Clone)]
pub struct Graph {
    pub nodes: Box<[Node]>,
    edges: Box<[Edge]>,
    offsets: Box<[usize]>,
    edge_count: usize,
    directed: bool,
    node_lookup: IdToIndex,
}

impl Graph {
    /// Validates the records and builds the graph.
    /// Undirected graphs store every edge in both directions.
    pub fn from_records<N, E>(nodes: N, edges: E, directed: bool) -> Result<Self, self::Error>
    where
        N: IntoIterator<Item = NodeRecord>,
        E: IntoIterator<Item = EdgeRecord>,
    {
        let mut node_lookup: IdToIndex = HashMap::new();
        let mut graph_nodes: Vec<Node> = Vec::new();
        for (i, record) in nodes.into_iter().enumerate() {
            if !record.coordinate.is_valid() {
                return Err(self::Error::InvalidCoordinate(record.id));
            }
            if node_lookup.insert(record.id, i).is_some() {
                return Err(self::Error::DuplicateNode(record.id));
            }
            graph_nodes.push(Node {
                index: i as u32,
                id: record.id,
                coordinate: record.coordinate,
            });
        }
        if graph_nodes.is_empty() {
            return Err(self::Error::Empty);
        }

        let mut arcs: Vec<(usize, Edge)> = Vec::new();
        let mut edge_count = 0;
        for record in edges {
            let (Some(&from_idx), Some(&to_idx)) =
                (node_lookup.get(&record.from), node_lookup.get(&record.to))
            else {
                return Err(self::Error::DanglingEdge {
                    from: record.from,
                    to: record.to,
                });
            };
            if from_idx == to_idx {
                return Err(self::Error::SelfLoop(record.from));
            }
            let length = record.length.as_meters();
            if !length.is_finite() || length <= 0.0 {
                return Err(self::Error::InvalidWeight {
                    from: record.from,
                    to: record.to,
                    length,
                });
            }

            arcs.push((
                from_idx,
                Edge {
                    to_idx: to_idx as u32,
                    length: record.length,
                },
            ));
            if !directed {
                arcs.push((
                    to_idx,
                    Edge {
                        to_idx: from_idx as u32,
                        length: record.length,
                    },
                ));
            }
            edge_count += 1;
        }

        // Counting sort keeps the supplied order inside each adjacency list
        let mut offsets = vec![0usize; graph_nodes.len() + 1];
        arcs.iter().for_each(|(from_idx, _)| offsets[from_idx + 1] += 1);
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }
        let mut cursor = offsets.clone();
        let mut graph_edges = vec![
            Edge {
                to_idx: 0,
                length: Default::default(),
            };
            arcs.len()
        ];
        arcs.into_iter().for_each(|(from_idx, edge)| {
            graph_edges[cursor[from_idx]] = edge;
            cursor[from_idx] += 1;
        });

        debug!(
            "Built graph with {} nodes and {} edges",
            graph_nodes.len(),
            edge_count
        );
        Ok(Self {
            nodes: graph_nodes.into(),
            edges: graph_edges.into(),
            offsets: offsets.into(),
            edge_count,
            directed,
            node_lookup,
        })
    }

    /// Get a node with the given id.
    /// If no node is found with the given id None is returned.
    pub fn node_by_id(&self, id: NodeId) -> Option<&Node> {
        let index = self.node_lookup.get(&id)?;
        Some(&self.nodes[*index])
    }

    pub fn index_of(&self, id: NodeId) -> Option<u32> {
        self.node_lookup.get(&id).map(|index| *index as u32)
    }

    /// Outgoing edges of the node at `index`.
    pub fn edges_from(&self, index: u32) -> &[Edge] {
        let index = index as usize;
        &self.edges[self.offsets[index]..self.offsets[index + 1]]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edge records the graph was built from.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }
}
