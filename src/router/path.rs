use serde::Serialize;

use crate::{
    graph::{Node, NodeId},
    shared::geo::{Coordinate, Distance},
};

#[derive(Clone, Debug, Serialize)]
pub struct Instruction {
    pub node: NodeId,
    pub text: String,
}

impl Instruction {
    pub fn continue_via(node: NodeId) -> Self {
        Self {
            node,
            text: format!("Continue via node {node}"),
        }
    }
}

/// Shortest path from source to destination, both inclusive.
#[derive(Clone, Debug)]
pub struct PathResult {
    pub nodes: Vec<Node>,
    pub distance: Distance,
    pub instructions: Vec<Instruction>,
}

impl PathResult {
    pub(crate) fn new(nodes: Vec<Node>, distance: Distance) -> Self {
        let instructions = nodes
            .iter()
            .map(|node| Instruction::continue_via(node.id))
            .collect();
        Self {
            nodes,
            distance,
            instructions,
        }
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|node| node.id).collect()
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.nodes.iter().map(|node| node.coordinate).collect()
    }
}
