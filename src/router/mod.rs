mod path;
pub use path::*;

use std::{cmp, collections::BinaryHeap};

use thiserror::Error;
use tracing::debug;

use crate::{
    graph::{Graph, NodeId},
    shared::geo::Distance,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Node {0} does not exist in the graph")]
    InvalidNode(NodeId),
    #[error("No path from node {from} to node {to}")]
    NoPath { from: NodeId, to: NodeId },
}

#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: Distance,
    node_idx: u32,
}

impl Eq for Frontier {}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == cmp::Ordering::Equal
    }
}

// Reversed so the max-heap pops the cheapest entry, lowest index first on ties
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node_idx.cmp(&self.node_idx))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra search between two nodes of one graph.
pub struct Router<'a> {
    graph: &'a Graph,
    from: NodeId,
    to: NodeId,
}

impl<'a> Router<'a> {
    pub fn new(graph: &'a Graph, from: NodeId, to: NodeId) -> Self {
        Self { graph, from, to }
    }

    pub fn solve(self) -> Result<PathResult, self::Error> {
        let source = self
            .graph
            .index_of(self.from)
            .ok_or(self::Error::InvalidNode(self.from))?;
        let target = self
            .graph
            .index_of(self.to)
            .ok_or(self::Error::InvalidNode(self.to))?;

        let node_count = self.graph.node_count();
        // Best known cost per node
        let mut best: Vec<Option<Distance>> = vec![None; node_count];
        // Allows us to backtrack and get the full path
        let mut parents: Vec<Option<u32>> = vec![None; node_count];
        let mut settled: Vec<bool> = vec![false; node_count];
        let mut heap: BinaryHeap<Frontier> = BinaryHeap::new();

        best[source as usize] = Some(Distance::ZERO);
        heap.push(Frontier {
            cost: Distance::ZERO,
            node_idx: source,
        });

        let mut popped = 0usize;
        while let Some(Frontier { cost, node_idx }) = heap.pop() {
            if settled[node_idx as usize] {
                continue;
            }
            settled[node_idx as usize] = true;
            popped += 1;

            if node_idx == target {
                debug!("Settled {popped} nodes before reaching the target");
                return Ok(self.backtrack(&parents, target, cost));
            }

            for edge in self.graph.edges_from(node_idx) {
                let to_idx = edge.to_idx as usize;
                if settled[to_idx] {
                    continue;
                }
                let candidate = cost + edge.length;
                // Strict improvement only, the first discovered path wins ties
                let improves = best[to_idx].is_none_or(|known| candidate < known);
                if improves {
                    best[to_idx] = Some(candidate);
                    parents[to_idx] = Some(node_idx);
                    heap.push(Frontier {
                        cost: candidate,
                        node_idx: edge.to_idx,
                    });
                }
            }
        }

        debug!("Exhausted {popped} nodes without reaching the target");
        Err(self::Error::NoPath {
            from: self.from,
            to: self.to,
        })
    }

    fn backtrack(&self, parents: &[Option<u32>], target: u32, distance: Distance) -> PathResult {
        let mut path = vec![self.graph.nodes[target as usize]];
        let mut current = target;
        while let Some(parent) = parents[current as usize] {
            path.push(self.graph.nodes[parent as usize]);
            current = parent;
        }
        path.reverse();
        PathResult::new(path, distance)
    }
}

/// Minimum-weight path between two nodes of `graph`.
pub fn shortest_path(graph: &Graph, from: NodeId, to: NodeId) -> Result<PathResult, Error> {
    Router::new(graph, from, to).solve()
}
