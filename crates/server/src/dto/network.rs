use serde::{Deserialize, Serialize};
use velonet::store::Network;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDto {
    pub mode: String,
    pub nodes: usize,
    pub edges: usize,
    pub directed: bool,
}

impl NetworkDto {
    pub fn from(network: &Network) -> Self {
        Self {
            mode: network.mode.to_string(),
            nodes: network.graph.node_count(),
            edges: network.graph.edge_count(),
            directed: network.graph.is_directed(),
        }
    }
}
